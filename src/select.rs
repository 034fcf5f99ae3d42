//! Part selection over the MIME tree

use crate::types::{MediaType, MimePart};

/// Depth-first, pre-order iterator over a MIME tree
pub struct Parts<'a> {
    stack: Vec<&'a MimePart>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a MimePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.children.iter().rev());
        Some(part)
    }
}

impl MimePart {
    /// Iterate this part and all descendants, parents before children,
    /// siblings left to right
    #[must_use]
    pub fn parts(&self) -> Parts<'_> {
        Parts { stack: vec![self] }
    }
}

/// Find the first leaf, in document order, whose type is exactly `wanted`.
///
/// Multipart nodes are never returned. When several parts match the first
/// one wins; `multipart/alternative` ordering is not taken into account.
#[must_use]
pub fn select<'a>(tree: &'a MimePart, wanted: &MediaType) -> Option<&'a MimePart> {
    tree.parts()
        .find(|part| part.is_leaf() && !part.media().is_multipart() && part.media() == wanted)
}
