//! Column layout of a fixed-width record.

use std::str::FromStr;

use crate::error::{ParseError, Result};

/// Ordered column widths, fixed for the lifetime of a parse.
///
/// Widths are byte counts. The record width is their sum and excludes the
/// line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    widths: Vec<usize>,
    total: usize,
    max: usize,
}

impl Schema {
    /// Build a schema from an ordered list of widths.
    ///
    /// Fails with `InvalidSchema` if the list is empty or any width is zero.
    pub fn new(widths: impl Into<Vec<usize>>) -> Result<Self> {
        let widths = widths.into();
        if widths.is_empty() {
            return Err(ParseError::invalid_schema("schema has no columns"));
        }
        if let Some(index) = widths.iter().position(|&w| w == 0) {
            return Err(ParseError::invalid_schema(format!(
                "column {index} has width 0"
            )));
        }

        let total = widths
            .iter()
            .try_fold(0usize, |acc, &w| acc.checked_add(w))
            .ok_or_else(|| ParseError::invalid_schema("total width overflows usize"))?;
        let max = widths.iter().copied().max().unwrap_or(0);

        Ok(Self { widths, total, max })
    }

    /// The reference layout: widths 1 through 10, repeated three times.
    pub fn benchmark() -> Self {
        let widths: Vec<usize> = (0..3).flat_map(|_| 1..=10).collect();
        Self {
            widths,
            total: 165,
            max: 10,
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn width(&self, index: usize) -> Option<usize> {
        self.widths.get(index).copied()
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Sum of all widths.
    pub fn total_width(&self) -> usize {
        self.total
    }

    /// Width of the widest column.
    pub fn max_width(&self) -> usize {
        self.max
    }

    /// Start offset of column `index` within a record.
    pub fn offset(&self, index: usize) -> Option<usize> {
        if index >= self.widths.len() {
            return None;
        }
        Some(self.widths[..index].iter().sum())
    }
}

/// Parses a comma-separated width list such as `"1,2,3"`.
impl FromStr for Schema {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        let widths = s
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, part)| {
                part.parse::<usize>().map_err(|_| {
                    ParseError::invalid_schema(format!(
                        "column {index}: '{part}' is not a positive width"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(widths)
    }
}
