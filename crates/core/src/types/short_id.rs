//! Public short identifier type.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters used when generating a fresh short id.
const GENERATED_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Errors that can occur when parsing a [`ShortId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortIdError {
    /// The input string is empty.
    #[error("is too short (minimum is 1 character)")]
    Empty,
    /// The input string is too long.
    #[error("is too long (maximum is {max} characters)")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9]`.
    #[error("is invalid")]
    InvalidCharacter(char),
}

/// A compact public identifier for a story or comment.
///
/// ## Constraints
///
/// - Length: 1-10 characters
/// - Characters: ASCII letters and digits only
///
/// ## Examples
///
/// ```
/// use lobsters_core::ShortId;
///
/// assert!(ShortId::parse("a1b2c3").is_ok());
/// assert!(ShortId::parse("0123456789").is_ok());
///
/// assert!(ShortId::parse("").is_err());            // empty
/// assert!(ShortId::parse("01234567890").is_err()); // 11 characters
/// assert!(ShortId::parse("abc-def").is_err());     // punctuation
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShortId(String);

impl ShortId {
    /// Maximum length of a short id.
    pub const MAX_LENGTH: usize = 10;

    /// Length of ids produced by [`ShortId::generate`].
    pub const GENERATED_LENGTH: usize = 6;

    /// Parse a `ShortId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 10 characters,
    /// or contains anything other than ASCII letters and digits.
    pub fn parse(s: &str) -> Result<Self, ShortIdError> {
        if s.is_empty() {
            return Err(ShortIdError::Empty);
        }

        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(ShortIdError::InvalidCharacter(c));
        }

        // Only ASCII remains, so byte length equals character count.
        if s.len() > Self::MAX_LENGTH {
            return Err(ShortIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Generate a random short id of [`ShortId::GENERATED_LENGTH`] lowercase
    /// letters and digits.
    ///
    /// Uniqueness is not checked here; callers persisting the id must retry
    /// on a collision.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..Self::GENERATED_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..GENERATED_ALPHABET.len());
                char::from(GENERATED_ALPHABET.get(idx).copied().unwrap_or(b'0'))
            })
            .collect();
        Self(id)
    }

    /// Returns the short id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShortId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShortId {
    type Err = ShortIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShortId {
    type Error = ShortIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShortId> for String {
    fn from(id: ShortId) -> Self {
        id.0
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShortId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShortId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShortId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
