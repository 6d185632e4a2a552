//! Line source: fills a caller-owned record buffer one line at a time.
//!
//! Two delivery modes satisfy the same contract:
//! - `ReadMode::Lines` scans the `BufRead` window for `\n` and copies the
//!   line's bytes straight into the record buffer. A trailing `\r` is
//!   dropped.
//! - `ReadMode::Blocks` reads exactly `width` bytes, then the configured
//!   terminator, and checks both.
//!
//! Neither mode allocates per line. A final line without a terminator is
//! accepted by both.

use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use memchr::memchr;
use tracing::{debug, warn};

use crate::error::{ParseError, Result};

/// How lines are pulled from the underlying reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReadMode {
    #[default]
    Lines,
    Blocks,
}

impl ReadMode {
    pub const ALL: [ReadMode; 2] = [Self::Lines, Self::Blocks];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Blocks => "blocks",
        }
    }
}

/// Line terminator expected by `ReadMode::Blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Terminator {
    #[default]
    Lf,
    CrLf,
}

impl Terminator {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }

    /// Terminator length in bytes.
    pub fn width(self) -> usize {
        self.as_bytes().len()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Lf => "LF",
            Self::CrLf => "CRLF",
        }
    }
}

/// What to do with a line whose length differs from the record width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthPolicy {
    /// Reject with `MalformedRecord`.
    #[default]
    Strict,
    /// Right-pad short lines with `pad`, truncate long ones.
    Lenient { pad: u8 },
}

impl LengthPolicy {
    /// Lenient handling padding with `'0'`.
    pub fn lenient() -> Self {
        Self::Lenient { pad: b'0' }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    pub width: usize,
    pub read_mode: ReadMode,
    pub terminator: Terminator,
    pub length_policy: LengthPolicy,
}

impl SourceOptions {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            read_mode: ReadMode::default(),
            terminator: Terminator::default(),
            length_policy: LengthPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(ParseError::invalid_config("record width must be positive"));
        }
        if self.read_mode == ReadMode::Blocks && self.length_policy != LengthPolicy::Strict {
            return Err(ParseError::invalid_config(
                "block reads cannot resynchronise; use strict length handling",
            ));
        }
        Ok(())
    }
}

/// Produces fixed-width records from a byte stream.
pub struct LineSource<R> {
    reader: BufReader<R>,
    options: SourceOptions,
    line: u64,
}

impl LineSource<File> {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>, options: SourceOptions) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;
        let file = File::open(path).map_err(|source| ParseError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            width = options.width,
            mode = options.read_mode.name(),
            "opened line source"
        );
        Self::new(file, options)
    }
}

impl<R: Read> LineSource<R> {
    pub fn new(reader: R, options: SourceOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            reader: BufReader::new(reader),
            options,
            line: 0,
        })
    }

    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Number of the last line read, starting at 1.
    pub fn line_number(&self) -> u64 {
        self.line
    }

    /// Fill `buffer` with the next record.
    ///
    /// Only the first `width` bytes of `buffer` are written. Returns
    /// `Ok(false)` at end of stream.
    pub fn next_into(&mut self, buffer: &mut [u8]) -> Result<bool> {
        let width = self.options.width;
        let available = buffer.len();
        let record = buffer
            .get_mut(..width)
            .ok_or(ParseError::buffer_too_small(width, available))?;

        match self.options.read_mode {
            ReadMode::Lines => self.read_line_into(record),
            ReadMode::Blocks => self.read_block_into(record),
        }
    }

    fn read_line_into(&mut self, record: &mut [u8]) -> Result<bool> {
        let width = record.len();
        let scanned = self.scan_line(|offset, bytes| {
            if offset < width {
                let n = bytes.len().min(width - offset);
                record[offset..offset + n].copy_from_slice(&bytes[..n]);
            }
        })?;
        let Some(found) = scanned else {
            return Ok(false);
        };
        self.line += 1;

        if found == width {
            return Ok(true);
        }
        match self.options.length_policy {
            LengthPolicy::Strict => Err(ParseError::malformed(self.line, width, found)),
            LengthPolicy::Lenient { pad } => {
                if found < width {
                    warn!(line = self.line, found, width, "padding short record");
                    record[found..].fill(pad);
                } else {
                    warn!(line = self.line, found, width, "truncating long record");
                }
                Ok(true)
            }
        }
    }

    fn read_block_into(&mut self, record: &mut [u8]) -> Result<bool> {
        let width = record.len();
        let read = read_full(&mut self.reader, record).map_err(|e| self.io_error(e))?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;

        // A newline inside the window means the line ended early.
        if let Some(pos) = memchr(b'\n', &record[..read]) {
            return Err(ParseError::malformed(
                self.line,
                width,
                strip_cr(&record[..pos]).len(),
            ));
        }
        if read < width {
            return Err(ParseError::malformed(
                self.line,
                width,
                strip_cr(&record[..read]).len(),
            ));
        }

        let terminator = self.options.terminator;
        let mut tail = [0u8; 2];
        let tail = &mut tail[..terminator.width()];
        let got = read_full(&mut self.reader, tail).map_err(|e| self.io_error(e))?;
        if got == 0 || &tail[..got] == terminator.as_bytes() {
            return Ok(true);
        }

        // "\r" closing the window and "\n" after it: CRLF line one byte short.
        if tail[0] == b'\n' && record.last() == Some(&b'\r') {
            return Err(ParseError::malformed(self.line, width, width - 1));
        }

        let overrun = self.measure_overrun(&tail[..got])?;
        if overrun == 0 {
            return Err(ParseError::TerminatorMismatch {
                line: self.line,
                expected: terminator.name(),
            });
        }
        Err(ParseError::malformed(self.line, width, width + overrun))
    }

    /// Length of the rest of the current line, given bytes already pulled
    /// past the record window.
    fn measure_overrun(&mut self, tail: &[u8]) -> Result<usize> {
        if let Some(pos) = memchr(b'\n', tail) {
            return Ok(strip_cr(&tail[..pos]).len());
        }
        let rest = self.scan_line(|_, _| {})?.unwrap_or(0);
        if tail.last() == Some(&b'\r') && rest == 0 {
            return Ok(tail.len() - 1);
        }
        Ok(tail.len() + rest)
    }

    /// Consume bytes up to and including the next `\n`, passing each
    /// contiguous run of line bytes to `sink` with its offset in the line.
    ///
    /// Returns the line length without terminator, or `None` if the stream
    /// was already exhausted.
    fn scan_line(&mut self, mut sink: impl FnMut(usize, &[u8])) -> Result<Option<usize>> {
        let mut len = 0usize;
        let mut last = None;
        let mut saw_any = false;

        loop {
            let (consumed, done) = {
                let chunk = match self.reader.fill_buf() {
                    Ok(chunk) => chunk,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(source) => {
                        return Err(ParseError::Io {
                            line: self.line,
                            source,
                        });
                    }
                };
                if chunk.is_empty() {
                    break;
                }
                saw_any = true;

                let (body, done) = match memchr(b'\n', chunk) {
                    Some(i) => (&chunk[..i], true),
                    None => (chunk, false),
                };
                sink(len, body);
                len += body.len();
                if let Some(&b) = body.last() {
                    last = Some(b);
                }
                (body.len() + usize::from(done), done)
            };
            self.reader.consume(consumed);
            if done {
                break;
            }
        }

        if !saw_any {
            return Ok(None);
        }
        Ok(Some(if last == Some(b'\r') { len - 1 } else { len }))
    }

    fn io_error(&self, source: io::Error) -> ParseError {
        ParseError::Io {
            line: self.line,
            source,
        }
    }
}

fn strip_cr(bytes: &[u8]) -> &[u8] {
    bytes.strip_suffix(b"\r").unwrap_or(bytes)
}

/// Read until `dst` is full or the reader is exhausted.
fn read_full(reader: &mut impl Read, dst: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < dst.len() {
        match reader.read(&mut dst[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(input: &str, width: usize, mode: ReadMode) -> LineSource<Cursor<Vec<u8>>> {
        let options = SourceOptions {
            read_mode: mode,
            ..SourceOptions::new(width)
        };
        LineSource::new(Cursor::new(input.as_bytes().to_vec()), options).unwrap()
    }

    fn drain(mut src: LineSource<Cursor<Vec<u8>>>) -> Result<Vec<String>> {
        let mut buf = vec![0u8; src.options().width];
        let mut lines = Vec::new();
        while src.next_into(&mut buf)? {
            lines.push(String::from_utf8(buf.clone()).unwrap());
        }
        Ok(lines)
    }

    #[test]
    fn test_lines_mode_reads_records() {
        let lines = drain(source("123\n456\n", 3, ReadMode::Lines)).unwrap();
        assert_eq!(lines, vec!["123", "456"]);
    }

    #[test]
    fn test_blocks_mode_reads_records() {
        let lines = drain(source("123\n456\n", 3, ReadMode::Blocks)).unwrap();
        assert_eq!(lines, vec!["123", "456"]);
    }

    #[test]
    fn test_final_line_without_terminator() {
        for mode in ReadMode::ALL {
            let lines = drain(source("123\n456", 3, mode)).unwrap();
            assert_eq!(lines, vec!["123", "456"], "{}", mode.name());
        }
    }

    #[test]
    fn test_empty_input() {
        for mode in ReadMode::ALL {
            assert!(drain(source("", 3, mode)).unwrap().is_empty());
        }
    }

    #[test]
    fn test_lines_mode_strips_cr() {
        let lines = drain(source("123\r\n456\r\n", 3, ReadMode::Lines)).unwrap();
        assert_eq!(lines, vec!["123", "456"]);
    }

    #[test]
    fn test_blocks_mode_crlf() {
        let options = SourceOptions {
            read_mode: ReadMode::Blocks,
            terminator: Terminator::CrLf,
            ..SourceOptions::new(3)
        };
        let src = LineSource::new(Cursor::new(b"123\r\n456\r\n".to_vec()), options).unwrap();
        assert_eq!(drain(src).unwrap(), vec!["123", "456"]);
    }

    #[test]
    fn test_short_line_is_malformed() {
        for mode in ReadMode::ALL {
            let err = drain(source("123\n45\n678\n", 3, mode)).unwrap_err();
            match err {
                ParseError::MalformedRecord {
                    line,
                    expected,
                    found,
                } => {
                    assert_eq!(line, 2, "{}", mode.name());
                    assert_eq!(expected, 3);
                    assert_eq!(found, 2);
                }
                other => panic!("Expected MalformedRecord, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_long_line_is_malformed() {
        for mode in ReadMode::ALL {
            let err = drain(source("123\n45678\n9\n", 3, mode)).unwrap_err();
            match err {
                ParseError::MalformedRecord { line, found, .. } => {
                    assert_eq!(line, 2, "{}", mode.name());
                    assert_eq!(found, 5, "{}", mode.name());
                }
                other => panic!("Expected MalformedRecord, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_short_final_line_is_malformed() {
        for mode in ReadMode::ALL {
            let err = drain(source("123\n45", 3, mode)).unwrap_err();
            assert!(
                matches!(err, ParseError::MalformedRecord { line: 2, found: 2, .. }),
                "{}: {err:?}",
                mode.name()
            );
        }
    }

    #[test]
    fn test_blocks_terminator_mismatch() {
        let options = SourceOptions {
            read_mode: ReadMode::Blocks,
            terminator: Terminator::CrLf,
            ..SourceOptions::new(3)
        };
        let src = LineSource::new(Cursor::new(b"123\n456\n".to_vec()), options).unwrap();
        let err = drain(src).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TerminatorMismatch {
                line: 1,
                expected: "CRLF"
            }
        ));
    }

    #[test]
    fn test_blocks_crlf_short_line() {
        let options = SourceOptions {
            read_mode: ReadMode::Blocks,
            terminator: Terminator::CrLf,
            ..SourceOptions::new(3)
        };
        let src = LineSource::new(Cursor::new(b"123\r\n12\r\n456\r\n".to_vec()), options).unwrap();
        let err = drain(src).unwrap_err();
        assert!(
            matches!(err, ParseError::MalformedRecord { line: 2, found: 2, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn test_lenient_pads_and_truncates() {
        let options = SourceOptions {
            length_policy: LengthPolicy::lenient(),
            ..SourceOptions::new(4)
        };
        let src = LineSource::new(Cursor::new(b"12\n123456\n1234\n".to_vec()), options).unwrap();
        assert_eq!(drain(src).unwrap(), vec!["1200", "1234", "1234"]);
    }

    #[test]
    fn test_lenient_padding_overwrites_cr() {
        let options = SourceOptions {
            length_policy: LengthPolicy::Lenient { pad: b' ' },
            ..SourceOptions::new(4)
        };
        let src = LineSource::new(Cursor::new(b"12\r\n".to_vec()), options).unwrap();
        assert_eq!(drain(src).unwrap(), vec!["12  "]);
    }

    #[test]
    fn test_lenient_blocks_rejected() {
        let options = SourceOptions {
            read_mode: ReadMode::Blocks,
            length_policy: LengthPolicy::lenient(),
            ..SourceOptions::new(4)
        };
        let err = LineSource::new(Cursor::new(Vec::new()), options).err().unwrap();
        assert!(matches!(err, ParseError::InvalidConfig { .. }));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut src = source("1234\n", 4, ReadMode::Lines);
        let mut buf = [0u8; 3];
        let err = src.next_into(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            ParseError::BufferTooSmall {
                needed: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_line_numbers_advance() {
        let mut src = source("12\n34\n", 2, ReadMode::Lines);
        let mut buf = [0u8; 2];
        assert_eq!(src.line_number(), 0);
        assert!(src.next_into(&mut buf).unwrap());
        assert_eq!(src.line_number(), 1);
        assert!(src.next_into(&mut buf).unwrap());
        assert_eq!(src.line_number(), 2);
        assert!(!src.next_into(&mut buf).unwrap());
        assert_eq!(src.line_number(), 2);
    }

    #[test]
    fn test_lines_span_reader_chunks() {
        // Force the BufReader window to split lines mid-record.
        let input = "0123456789\n".repeat(50);
        let options = SourceOptions::new(10);
        let mut src = LineSource {
            reader: BufReader::with_capacity(7, Cursor::new(input.into_bytes())),
            options,
            line: 0,
        };
        let mut buf = [0u8; 10];
        let mut count = 0;
        while src.next_into(&mut buf).unwrap() {
            assert_eq!(&buf, b"0123456789");
            count += 1;
        }
        assert_eq!(count, 50);
    }

    #[test]
    fn test_open_missing_file() {
        let err = LineSource::open("/definitely/not/here.txt", SourceOptions::new(3))
            .err()
            .unwrap();
        match err {
            ParseError::SourceUnavailable { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here.txt"));
            }
            other => panic!("Expected SourceUnavailable, got {other:?}"),
        }
    }
}
