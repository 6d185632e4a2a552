//! Column extraction over a filled record buffer.
//!
//! Extraction never copies: each `ColumnView` borrows its window straight
//! out of the record buffer. Because the view borrows the buffer, it cannot
//! be held across the next `LineSource::next_into` call, which needs the
//! buffer mutably. That borrow is what keeps a view scoped to one line.

use std::iter::FusedIterator;

use crate::error::{ParseError, Result};
use crate::schema::Schema;

/// A non-owning window onto one column of the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnView<'a> {
    index: usize,
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> ColumnView<'a> {
    pub fn new(index: usize, offset: usize, bytes: &'a [u8]) -> Self {
        Self {
            index,
            offset,
            bytes,
        }
    }

    /// Position of this column in the schema.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start offset within the record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

/// Lazily yields one `ColumnView` per schema entry, in schema order.
#[derive(Debug, Clone)]
pub struct Columns<'a> {
    buffer: &'a [u8],
    widths: &'a [usize],
    index: usize,
    offset: usize,
}

impl<'a> Iterator for Columns<'a> {
    type Item = ColumnView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let width = *self.widths.get(self.index)?;
        let end = self.offset + width;
        // extract() checked buffer.len() >= total width
        let view = ColumnView::new(self.index, self.offset, &self.buffer[self.offset..end]);
        self.index += 1;
        self.offset = end;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.widths.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Columns<'_> {}

impl FusedIterator for Columns<'_> {}

/// Split `buffer` into the columns described by `schema`.
///
/// Bytes past `schema.total_width()` are ignored. Fails with
/// `BufferTooSmall` if the buffer cannot hold a whole record.
pub fn extract<'a>(buffer: &'a [u8], schema: &'a Schema) -> Result<Columns<'a>> {
    if buffer.len() < schema.total_width() {
        return Err(ParseError::buffer_too_small(
            schema.total_width(),
            buffer.len(),
        ));
    }
    Ok(Columns {
        buffer,
        widths: schema.widths(),
        index: 0,
        offset: 0,
    })
}
