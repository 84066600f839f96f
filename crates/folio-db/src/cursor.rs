use bson::Document;
use folio_query::{Hint, ReadPreference};

/// Result documents of one query, with the options it ran under.
///
/// Owns its rows, so it stays valid after the collection changes.
#[derive(Debug, Clone)]
pub struct Cursor {
    rows: std::vec::IntoIter<Document>,
    read_preference: ReadPreference,
    skip: Option<usize>,
    limit: Option<usize>,
    hint: Option<Hint>,
}

impl Cursor {
    pub(crate) fn new(
        rows: Vec<Document>,
        read_preference: ReadPreference,
        skip: Option<usize>,
        limit: Option<usize>,
        hint: Option<Hint>,
    ) -> Self {
        Self {
            rows: rows.into_iter(),
            read_preference,
            skip,
            limit,
            hint,
        }
    }

    pub fn read_preference(&self) -> ReadPreference {
        self.read_preference
    }

    pub fn skip(&self) -> Option<usize> {
        self.skip
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }
}

impl Iterator for Cursor {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}
