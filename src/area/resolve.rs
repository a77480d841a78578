//! Forward references between areas and the pages that define their ids.

use serde::{Deserialize, Serialize};

use super::PageKey;

/// A page that defines an id, as seen by whoever cites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub key: PageKey,
    /// Formatted page number.
    pub number: String,
}

impl PageRef {
    pub fn new(key: PageKey, number: &str) -> Self {
        Self {
            key,
            number: number.to_string(),
        }
    }
}

/// Anything whose final form depends on where an id lands.
///
/// `resolve_id_ref` is called once per id: with the defining pages when the
/// id turns up, or with `None` at the end of the document when it never did.
pub trait Resolvable {
    fn is_resolved(&self) -> bool;

    /// Ids still waited on.
    fn id_refs(&self) -> Vec<String>;

    fn resolve_id_ref(&mut self, id: &str, pages: Option<&[PageRef]>);
}
