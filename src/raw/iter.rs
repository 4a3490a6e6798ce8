use std::iter::FusedIterator;

use super::{check_framing, RawDocument, RawElement};
use crate::error::Error;

/// An iterator over the elements of a [`RawDocument`].
///
/// Iteration stops at the document's terminating null byte, or at the first element that cannot
/// be read within the bounds of the document. In the latter case the reason is available from
/// [`RawIter::error`]. A document whose outer framing is invalid yields no elements.
pub struct RawIter<'a> {
    doc: &'a RawDocument,
    offset: usize,

    /// Whether the underlying doc is assumed to be valid or if an error has been encountered.
    /// After an error, all subsequent iterations will return None.
    valid: bool,

    error: Option<Error>,
}

impl<'a> RawIter<'a> {
    pub(crate) fn new(doc: &'a RawDocument) -> Self {
        let (valid, error) = match check_framing(doc.as_bytes()) {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e)),
        };
        Self {
            doc,
            offset: 4,
            valid,
            error,
        }
    }

    /// The error that ended iteration early, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Takes the error that ended iteration early, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }
}

impl<'a> Iterator for RawIter<'a> {
    type Item = RawElement<'a>;

    fn next(&mut self) -> Option<RawElement<'a>> {
        if !self.valid {
            return None;
        }

        match RawElement::read_at(self.doc.as_bytes(), self.offset) {
            Ok(Some(element)) => {
                self.offset = element.next_offset();
                Some(element)
            }
            Ok(None) => {
                self.valid = false;
                None
            }
            Err(e) => {
                tracing::trace!(
                    offset = self.offset,
                    error = %e,
                    "stopping iteration at malformed element"
                );
                self.valid = false;
                self.error = Some(e);
                None
            }
        }
    }
}

impl FusedIterator for RawIter<'_> {}
