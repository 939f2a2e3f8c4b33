//! Declarative story index definition.
//!
//! Describes what the story search index contains independent of the engine
//! serving it. The Tantivy schema in this crate is built from it, and it can
//! be exported as JSON for an external indexing daemon.

use serde::Serialize;

/// Weight given to fields without an explicit entry.
pub const DEFAULT_FIELD_WEIGHT: u16 = 1;

/// A full-text field and the model attribute it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexedField {
    /// Name in the index.
    pub name: &'static str,
    /// Attribute path on the story (`user.username` for denormalized data).
    pub source: &'static str,
}

/// Storage type of a non-text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Timestamp,
    Float,
    Boolean,
    Bigint,
}

/// A filterable or sortable attribute stored alongside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Name in the index.
    pub name: &'static str,
    /// Storage type.
    pub kind: AttributeKind,
    /// Whether results may be ordered by this attribute.
    pub sortable: bool,
    /// SQL expression computing the value, when it is not a plain column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<&'static str>,
}

/// Relevance multiplier for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldWeight {
    /// Field name.
    pub field: &'static str,
    /// Multiplier applied to matches in the field.
    pub weight: u16,
}

/// Full definition of a search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexDefinition {
    /// Index name.
    pub name: &'static str,
    /// Full-text fields.
    pub fields: &'static [IndexedField],
    /// Non-text attributes.
    pub attributes: &'static [Attribute],
    /// Explicit relevance weights.
    pub field_weights: &'static [FieldWeight],
    /// SQL predicate a record must satisfy to be indexed.
    pub filter: &'static str,
}

/// The story index.
pub const STORY_INDEX: IndexDefinition = IndexDefinition {
    name: "story",
    fields: &[
        IndexedField {
            name: "description",
            source: "description",
        },
        IndexedField {
            name: "short_id",
            source: "short_id",
        },
        IndexedField {
            name: "tags",
            source: "tags.tag",
        },
        IndexedField {
            name: "title",
            source: "title",
        },
        IndexedField {
            name: "url",
            source: "url",
        },
        IndexedField {
            name: "author",
            source: "user.username",
        },
    ],
    attributes: &[
        Attribute {
            name: "created_at",
            kind: AttributeKind::Timestamp,
            sortable: true,
            expression: None,
        },
        Attribute {
            name: "hotness",
            kind: AttributeKind::Float,
            sortable: true,
            expression: None,
        },
        Attribute {
            name: "is_expired",
            kind: AttributeKind::Boolean,
            sortable: true,
            expression: None,
        },
        Attribute {
            name: "score",
            kind: AttributeKind::Bigint,
            sortable: true,
            expression: Some("(cast(upvotes as integer) - cast(downvotes as integer))"),
        },
    ],
    field_weights: &[
        FieldWeight {
            field: "upvotes",
            weight: 15,
        },
        FieldWeight {
            field: "title",
            weight: 10,
        },
        FieldWeight {
            field: "tags",
            weight: 5,
        },
    ],
    filter: "is_expired = false",
};

impl IndexDefinition {
    /// Relevance weight of `field`, [`DEFAULT_FIELD_WEIGHT`] when unlisted.
    #[must_use]
    pub fn weight(&self, field: &str) -> u16 {
        self.field_weights
            .iter()
            .find(|w| w.field == field)
            .map_or(DEFAULT_FIELD_WEIGHT, |w| w.weight)
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Render the definition as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
