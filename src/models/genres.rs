use serde::{Deserialize, Serialize};

/// Separator used when genres are persisted as a single text column.
pub const GENRE_SEPARATOR: char = ',';

/// Ordered set of genre names.
///
/// Stored as delimited text, but always handled as a list in memory: empty
/// entries are dropped and repeated names keep their first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genres(Vec<String>);

impl Genres {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut genres: Vec<String> = Vec::new();
        for value in values {
            let value = value.into().trim().to_string();
            if !value.is_empty() && !genres.contains(&value) {
                genres.push(value);
            }
        }
        Genres(genres)
    }

    /// Parse the column representation.
    pub fn from_stored(stored: &str) -> Self {
        Self::new(stored.split(GENRE_SEPARATOR))
    }

    /// Column representation, e.g. `Jazz,Blues`.
    pub fn to_stored(&self) -> String {
        self.0.join(&GENRE_SEPARATOR.to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Lets sqlx decode the TEXT column straight into `Genres`
impl From<String> for Genres {
    fn from(stored: String) -> Self {
        Genres::from_stored(&stored)
    }
}
