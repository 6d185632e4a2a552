//! Running total of every decoded value.

use crate::error::{ParseError, Result};

/// 64-bit running sum used as the end-to-end correctness check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    total: i64,
    count: u64,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value. Returns `None` and leaves the total untouched if the
    /// sum would overflow.
    pub fn add(&mut self, value: i64) -> Option<i64> {
        self.total = self.total.checked_add(value)?;
        self.count += 1;
        Some(self.total)
    }

    /// Add all values of one record, or none of them.
    pub fn add_record(&mut self, values: &[i64]) -> Option<i64> {
        let total = values
            .iter()
            .try_fold(self.total, |acc, &v| acc.checked_add(v))?;
        self.total = total;
        self.count += values.len() as u64;
        Some(total)
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Number of values added so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Compare the total with a known-correct value.
    pub fn verify(&self, expected: i64) -> Result<()> {
        if self.total != expected {
            return Err(ParseError::ChecksumMismatch {
                expected,
                actual: self.total,
            });
        }
        Ok(())
    }
}
