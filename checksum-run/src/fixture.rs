//! Deterministic input files: every line is one digit repeated across the
//! whole record.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use fixedwidth_rs::{Schema, Terminator};
use tracing::info;

/// Write `lines` records of `digit` repeated `width` times.
pub fn write_fixture(
    path: &Path,
    width: usize,
    lines: u64,
    digit: u8,
    terminator: Terminator,
) -> io::Result<()> {
    let mut record = vec![digit; width];
    record.extend_from_slice(terminator.as_bytes());

    let mut out = BufWriter::new(File::create(path)?);
    for _ in 0..lines {
        out.write_all(&record)?;
    }
    out.flush()
}

/// Write the fixture unless `path` already exists. Returns whether a file
/// was written.
pub fn ensure_fixture(
    path: &Path,
    width: usize,
    lines: u64,
    digit: u8,
    terminator: Terminator,
) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_fixture(path, width, lines, digit, terminator)?;
    info!(path = %path.display(), lines, width, "generated fixture");
    Ok(true)
}

/// Expected checksum of a fixture written by `write_fixture`.
///
/// A column of width `w` holds `digit` repeated `w` times. Returns `None` if
/// `digit` is not a decimal digit or the total does not fit in `i64`.
pub fn expected_repeated_digit_total(schema: &Schema, digit: u8, lines: u64) -> Option<i64> {
    if !digit.is_ascii_digit() {
        return None;
    }
    let d = i64::from(digit - b'0');

    let mut per_line: i64 = 0;
    for &width in schema.widths() {
        let mut value: i64 = 0;
        for _ in 0..width {
            value = value.checked_mul(10)?.checked_add(d)?;
        }
        per_line = per_line.checked_add(value)?;
    }
    per_line.checked_mul(i64::try_from(lines).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expected_total_benchmark_layout() {
        let schema = Schema::benchmark();
        assert_eq!(
            expected_repeated_digit_total(&schema, b'1', 1),
            Some(3_703_703_700)
        );
        assert_eq!(
            expected_repeated_digit_total(&schema, b'1', 100_000),
            Some(370_370_370_000_000)
        );
    }

    #[test]
    fn test_expected_total_other_digits() {
        let schema = Schema::new(vec![1, 2, 3]).unwrap();
        assert_eq!(expected_repeated_digit_total(&schema, b'0', 5), Some(0));
        assert_eq!(
            expected_repeated_digit_total(&schema, b'2', 2),
            Some(2 * (2 + 22 + 222))
        );
        assert_eq!(expected_repeated_digit_total(&schema, b'a', 1), None);
    }

    #[test]
    fn test_expected_total_overflow() {
        let schema = Schema::new(vec![20]).unwrap();
        assert_eq!(expected_repeated_digit_total(&schema, b'9', 1), None);
    }

    #[test]
    fn test_write_fixture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        write_fixture(&path, 4, 3, b'7', Terminator::CrLf).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"7777\r\n7777\r\n7777\r\n");
    }

    #[test]
    fn test_ensure_fixture_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        assert!(ensure_fixture(&path, 2, 1, b'1', Terminator::Lf).unwrap());
        fs::write(&path, "99\n").unwrap();
        assert!(!ensure_fixture(&path, 2, 1, b'1', Terminator::Lf).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "99\n");
    }
}
