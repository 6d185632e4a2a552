//! Integer decoding straight from column windows.
//!
//! Three strategies share one contract and must agree on every value and
//! every error:
//! - `Borrowed` reads the view in place.
//! - `Scratch` copies the view into a buffer sized once from the schema,
//!   then reads the copy.
//! - `Owned` materializes a `String` per column and hands it to
//!   `str::parse`, the allocating baseline the other two are measured
//!   against.

use std::num::IntErrorKind;

use thiserror::Error;

use crate::extract::ColumnView;
use crate::schema::Schema;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("column {column} is empty")]
    EmptyColumn { column: usize },

    #[error("column {column}: invalid digit '{}' at offset {offset}", .byte.escape_ascii())]
    InvalidDigit {
        column: usize,
        offset: usize,
        byte: u8,
    },

    #[error("column {column}: value does not fit in i64")]
    Overflow { column: usize },

    #[error("column {column}: width {width} exceeds scratch capacity {capacity}")]
    ColumnTooWide {
        column: usize,
        width: usize,
        capacity: usize,
    },
}

/// Decode an optionally signed decimal integer from raw bytes.
///
/// Digits accumulate as `value * 10 + digit`, left to right. A leading `-`
/// makes the result negative. Each byte is validated before it is folded in,
/// so the first problem in reading order is the one reported.
pub fn decode_bytes(column: usize, bytes: &[u8]) -> Result<i64, DecodeError> {
    let (negative, start) = match bytes.first() {
        None => return Err(DecodeError::EmptyColumn { column }),
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        Some(_) => (false, 0),
    };
    if start == bytes.len() {
        return Err(DecodeError::InvalidDigit {
            column,
            offset: 0,
            byte: bytes[0],
        });
    }

    let mut value: i64 = 0;
    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        let digit = byte.wrapping_sub(b'0');
        if digit > 9 {
            return Err(DecodeError::InvalidDigit {
                column,
                offset,
                byte,
            });
        }
        // Negative values accumulate downwards so i64::MIN is reachable.
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(i64::from(digit))
            } else {
                v.checked_add(i64::from(digit))
            }
        });
        value = next.ok_or(DecodeError::Overflow { column })?;
    }
    Ok(value)
}

/// Locate the first byte `decode_bytes` would reject.
fn first_invalid(bytes: &[u8]) -> Option<(usize, u8)> {
    let start = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    if start == bytes.len() {
        return bytes.first().map(|&b| (0, b));
    }
    bytes
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, b)| !b.is_ascii_digit())
        .map(|(i, &b)| (i, b))
}

/// Turns one column view into an integer.
pub trait ColumnDecoder {
    fn decode(&mut self, view: &ColumnView<'_>) -> Result<i64, DecodeError>;

    /// The display name of this strategy.
    fn name(&self) -> &str;
}

/// Decodes directly from the borrowed record window.
pub struct BorrowedDecoder;

impl ColumnDecoder for BorrowedDecoder {
    fn decode(&mut self, view: &ColumnView<'_>) -> Result<i64, DecodeError> {
        decode_bytes(view.index(), view.as_bytes())
    }

    fn name(&self) -> &str {
        "borrowed"
    }
}

/// Copies each column into a reusable, pre-sized scratch buffer first.
pub struct ScratchDecoder {
    scratch: Box<[u8]>,
}

impl ScratchDecoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            scratch: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }
}

impl ColumnDecoder for ScratchDecoder {
    fn decode(&mut self, view: &ColumnView<'_>) -> Result<i64, DecodeError> {
        let capacity = self.scratch.len();
        let dst = self
            .scratch
            .get_mut(..view.len())
            .ok_or(DecodeError::ColumnTooWide {
                column: view.index(),
                width: view.len(),
                capacity,
            })?;
        dst.copy_from_slice(view.as_bytes());
        decode_bytes(view.index(), dst)
    }

    fn name(&self) -> &str {
        "scratch"
    }
}

/// Allocates a `String` per column and parses it with `str::parse`.
pub struct OwnedDecoder;

impl ColumnDecoder for OwnedDecoder {
    fn decode(&mut self, view: &ColumnView<'_>) -> Result<i64, DecodeError> {
        let column = view.index();
        let Ok(text) = String::from_utf8(view.as_bytes().to_vec()) else {
            // Not text at all; report what the in-place reader sees.
            return decode_bytes(column, view.as_bytes());
        };

        text.parse::<i64>().map_err(|e| match e.kind() {
            IntErrorKind::Empty => DecodeError::EmptyColumn { column },
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                DecodeError::Overflow { column }
            }
            _ => match first_invalid(text.as_bytes()) {
                Some((offset, byte)) => DecodeError::InvalidDigit {
                    column,
                    offset,
                    byte,
                },
                None => DecodeError::Overflow { column },
            },
        })
    }

    fn name(&self) -> &str {
        "owned"
    }
}

/// Selects a `ColumnDecoder` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodeStrategy {
    #[default]
    Borrowed,
    Scratch,
    Owned,
}

impl DecodeStrategy {
    pub const ALL: [DecodeStrategy; 3] = [Self::Borrowed, Self::Scratch, Self::Owned];

    /// Build a decoder sized for `schema`.
    pub fn decoder(self, schema: &Schema) -> Box<dyn ColumnDecoder> {
        match self {
            Self::Borrowed => Box::new(BorrowedDecoder),
            Self::Scratch => Box::new(ScratchDecoder::new(schema.max_width())),
            Self::Owned => Box::new(OwnedDecoder),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Borrowed => "borrowed",
            Self::Scratch => "scratch",
            Self::Owned => "owned",
        }
    }
}
