//! Full-text story search using Tantivy.
//!
//! The index layout follows [`STORY_INDEX`]: text fields weighted per the
//! definition plus sortable numeric attributes. Only non-expired stories are
//! indexed.
//!
//! The index starts empty. [`rebuild`] loads it from the database and swaps
//! it in atomically when ready.

pub mod definition;
mod indexer;

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, NumericOptions, STORED, STRING, Schema, TextFieldIndexing,
    TextOptions, Value,
};
use tantivy::tokenizer::{
    LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer, TokenStream,
};
use tantivy::{DocAddress, Index, IndexReader, Order, ReloadPolicy, Term};
use tracing::instrument;

pub use definition::{IndexDefinition, STORY_INDEX};
pub use indexer::{build_index, rebuild};

/// Name under which the story tokenizer is registered.
pub(crate) const STORY_TOKENIZER: &str = "story_text";

/// A story matching a search.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryHit {
    pub short_id: String,
    pub title: String,
    pub url: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub hotness: f64,
    pub score: i64,
    /// Text relevance; zero when results are ordered by an attribute.
    pub relevance: f32,
}

/// Schema field handles for the story index.
#[derive(Clone)]
pub struct StoryFields {
    // Text fields (weighted)
    pub description: Field,
    pub short_id: Field,
    pub tags: Field,
    pub title: Field,
    pub url: Field,
    pub author: Field,
    // Sortable attributes
    pub created_at: Field,
    pub hotness: Field,
    pub is_expired: Field,
    pub score: Field,
}

impl StoryFields {
    /// Tokenized text fields paired with their definition names.
    fn weighted_text_fields(&self) -> [(&'static str, Field); 5] {
        [
            ("description", self.description),
            ("tags", self.tags),
            ("title", self.title),
            ("url", self.url),
            ("author", self.author),
        ]
    }
}

/// Search result ordering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StorySort {
    #[default]
    Relevance,
    /// Most recent first.
    Newest,
    /// Lowest hotness first.
    Hottest,
    /// Highest net score first.
    Score,
}

impl StorySort {
    /// Parse from a user-supplied value, falling back to relevance.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "newest" => Self::Newest,
            "hottest" => Self::Hottest,
            "score" | "points" => Self::Score,
            _ => Self::Relevance,
        }
    }

    /// Convert to its canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Newest => "newest",
            Self::Hottest => "hottest",
            Self::Score => "score",
        }
    }
}

/// Inner index state (once built).
struct ReadyIndex {
    reader: IndexReader,
    fields: StoryFields,
}

/// The story search index.
///
/// Starts empty and is populated by [`rebuild`] or [`StoryIndex::load`].
#[derive(Clone)]
pub struct StoryIndex {
    inner: Arc<RwLock<Option<ReadyIndex>>>,
}

impl Default for StoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryIndex {
    /// Create a new empty story index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Check if the index is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Build an index from `stories` and swap it in, returning the number of
    /// documents indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be built or the lock is poisoned.
    pub fn load(&self, stories: &[crate::models::StoryDocument]) -> Result<u64, SearchError> {
        let (index, fields) = build_index(stories)?;
        self.set_ready(&index, fields)?;
        Ok(self.num_docs())
    }

    /// Set the built index.
    pub(crate) fn set_ready(&self, index: &Index, fields: StoryFields) -> Result<(), SearchError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Index(format!("Failed to create reader: {e}")))?;

        let ready = ReadyIndex { reader, fields };

        *self
            .inner
            .write()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))? = Some(ready);

        Ok(())
    }

    /// Build the schema for the story index from [`STORY_INDEX`].
    pub(crate) fn build_schema() -> (Schema, StoryFields) {
        let mut schema_builder = Schema::builder();

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(STORY_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let stored_text = TextOptions::default()
            .set_indexing_options(text_indexing.clone())
            .set_stored();
        let unstored_text = TextOptions::default().set_indexing_options(text_indexing);

        // Short ids match exactly, so they are not tokenized
        let short_id = schema_builder.add_text_field("short_id", STRING | STORED);
        let description = schema_builder.add_text_field("description", unstored_text);
        let tags = schema_builder.add_text_field("tags", stored_text.clone());
        let title = schema_builder.add_text_field("title", stored_text.clone());
        let url = schema_builder.add_text_field("url", stored_text.clone());
        let author = schema_builder.add_text_field("author", stored_text);

        let attribute = NumericOptions::default()
            .set_stored()
            .set_indexed()
            .set_fast();
        let created_at = schema_builder.add_i64_field("created_at", attribute.clone());
        let hotness = schema_builder.add_f64_field("hotness", attribute.clone());
        let is_expired = schema_builder.add_u64_field("is_expired", attribute.clone());
        let score = schema_builder.add_i64_field("score", attribute);

        let schema = schema_builder.build();
        let fields = StoryFields {
            description,
            short_id,
            tags,
            title,
            url,
            author,
            created_at,
            hotness,
            is_expired,
            score,
        };

        (schema, fields)
    }

    /// Search stories matching `query_str`.
    ///
    /// Each query term is matched against every text field, scaled by the
    /// field's weight. Returns empty results for a blank query or when the
    /// index isn't ready yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the index lock is poisoned or the search query fails.
    #[instrument(skip(self))]
    // The read guard must outlive `ready`, which borrows from it.
    #[allow(clippy::significant_drop_tightening)]
    pub fn search(
        &self,
        query_str: &str,
        sort: StorySort,
        limit: usize,
    ) -> Result<Vec<StoryHit>, SearchError> {
        let query_str = query_str.trim();
        if query_str.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let guard = self
            .inner
            .read()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))?;

        let Some(ready) = guard.as_ref() else {
            return Ok(Vec::new());
        };

        let Some(query) = Self::build_query(&ready.fields, query_str) else {
            return Ok(Vec::new());
        };

        let searcher = ready.reader.searcher();
        let top_docs = TopDocs::with_limit(limit);
        let doc_addresses = match sort {
            StorySort::Relevance => searcher.search(&query, &top_docs).map_err(query_failed)?,
            StorySort::Newest => unscored(
                searcher
                    .search(
                        &query,
                        &top_docs.order_by_fast_field::<i64>("created_at", Order::Desc),
                    )
                    .map_err(query_failed)?,
            ),
            StorySort::Hottest => unscored(
                searcher
                    .search(
                        &query,
                        &top_docs.order_by_fast_field::<f64>("hotness", Order::Asc),
                    )
                    .map_err(query_failed)?,
            ),
            StorySort::Score => unscored(
                searcher
                    .search(&query, &top_docs.order_by_fast_field::<i64>("score", Order::Desc))
                    .map_err(query_failed)?,
            ),
        };

        let mut hits = Vec::with_capacity(doc_addresses.len());
        for (relevance, doc_address) in doc_addresses {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            hits.push(Self::doc_to_hit(&ready.fields, &doc, relevance));
        }

        Ok(hits)
    }

    /// Build a weighted disjunction over every text field.
    ///
    /// Returns `None` when the query yields no terms.
    fn build_query(fields: &StoryFields, query_str: &str) -> Option<Box<dyn Query>> {
        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for term in query_terms(query_str) {
            for (name, field) in fields.weighted_text_fields() {
                let term_query = TermQuery::new(
                    Term::from_field_text(field, &term),
                    IndexRecordOption::WithFreqs,
                );
                subqueries.push((Occur::Should, weighted(name, Box::new(term_query))));
            }
        }

        // Short ids are looked up verbatim
        for word in query_str.split_whitespace() {
            let term_query = TermQuery::new(
                Term::from_field_text(fields.short_id, word),
                IndexRecordOption::Basic,
            );
            subqueries.push((Occur::Should, weighted("short_id", Box::new(term_query))));
        }

        if subqueries.is_empty() {
            return None;
        }
        Some(Box::new(BooleanQuery::new(subqueries)))
    }

    /// Convert a Tantivy document to a search hit.
    fn doc_to_hit(fields: &StoryFields, doc: &tantivy::TantivyDocument, relevance: f32) -> StoryHit {
        let get_text = |field: Field| -> String {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        let url = get_text(fields.url);
        let created_at = doc
            .get_first(fields.created_at)
            .and_then(|v| v.as_i64())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        StoryHit {
            short_id: get_text(fields.short_id),
            title: get_text(fields.title),
            url: if url.is_empty() { None } else { Some(url) },
            author: get_text(fields.author),
            tags: get_text(fields.tags)
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
            created_at,
            hotness: doc
                .get_first(fields.hotness)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            score: doc
                .get_first(fields.score)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
            relevance,
        }
    }

    /// Get the number of documents in the index, or 0 if not ready.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|r| r.reader.searcher().num_docs()))
            .unwrap_or(0)
    }
}

/// Analyzer shared by indexing and querying: split on non-alphanumerics,
/// drop very long tokens, lowercase.
pub(crate) fn story_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .build()
}

/// Tokenize a query the same way documents were tokenized, without duplicates.
fn query_terms(query_str: &str) -> Vec<String> {
    let mut analyzer = story_analyzer();
    let mut stream = analyzer.token_stream(query_str);
    let mut terms: Vec<String> = Vec::new();
    while stream.advance() {
        let text = &stream.token().text;
        if !terms.contains(text) {
            terms.push(text.clone());
        }
    }
    terms
}

/// Drop attribute sort keys, keeping the collector's order.
fn unscored<T>(docs: Vec<(T, DocAddress)>) -> Vec<(f32, DocAddress)> {
    docs.into_iter().map(|(_, address)| (0.0, address)).collect()
}

/// Wrap a collector failure.
#[allow(clippy::needless_pass_by_value)]
fn query_failed(e: tantivy::TantivyError) -> SearchError {
    SearchError::Query(format!("Search failed: {e}"))
}

/// Scale `query` by the definition weight of `field`.
fn weighted(field: &str, query: Box<dyn Query>) -> Box<dyn Query> {
    let weight = STORY_INDEX.weight(field);
    if weight == definition::DEFAULT_FIELD_WEIGHT {
        return query;
    }
    Box::new(BoostQuery::new(query, f32::from(weight)))
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Build error: {0}")]
    Build(String),
}
