//! In-memory reference store.

use crate::reference::Reference;

/// Ordered collection of references.
///
/// Insertion order is significant: it is the row order of the editable
/// table and the numbering basis for IEEE citations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceStore {
    references: Vec<Reference>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one reference to the end.
    pub fn append(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    /// Adds a batch of references to the end, keeping their order.
    pub fn extend(&mut self, references: impl IntoIterator<Item = Reference>) {
        self.references.extend(references);
    }

    /// Overwrites the whole sequence with `references`.
    ///
    /// The new length is whatever the caller hands in; rows added or removed
    /// in the table editor show up here.
    pub fn replace_all(&mut self, references: Vec<Reference>) {
        self.references = references;
    }

    /// Borrows the current contents.
    pub fn snapshot(&self) -> &[Reference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
