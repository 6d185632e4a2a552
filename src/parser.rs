//! Parse driver: source, extractor, decoder and checksum wired together.
//!
//! Each record is read into the one buffer owned by the parse, split into
//! column views, decoded into a values array allocated once per parse, and
//! only then committed to the checksum. A record that fails anywhere is
//! never partially added.

use std::fmt;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::buffer::BufferPlacement;
use crate::checksum::Checksum;
use crate::decode::DecodeStrategy;
use crate::error::{ParseError, Result};
use crate::extract::extract;
use crate::schema::Schema;
use crate::source::{LengthPolicy, LineSource, ReadMode, SourceOptions, Terminator};

/// Strategy selection for one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParserConfig {
    pub read_mode: ReadMode,
    pub terminator: Terminator,
    pub length_policy: LengthPolicy,
    pub placement: BufferPlacement,
    pub decode: DecodeStrategy,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn with_length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    pub fn with_placement(mut self, placement: BufferPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_decode(mut self, decode: DecodeStrategy) -> Self {
        self.decode = decode;
        self
    }

    /// Every read mode, buffer placement and decode strategy combination,
    /// strict and LF-terminated.
    pub fn all_strategies() -> Vec<ParserConfig> {
        let mut configs = Vec::new();
        for read_mode in ReadMode::ALL {
            for placement in BufferPlacement::ALL {
                for decode in DecodeStrategy::ALL {
                    configs.push(Self {
                        read_mode,
                        placement,
                        decode,
                        ..Self::default()
                    });
                }
            }
        }
        configs
    }

    pub fn source_options(&self, width: usize) -> SourceOptions {
        SourceOptions {
            width,
            read_mode: self.read_mode,
            terminator: self.terminator,
            length_policy: self.length_policy,
        }
    }
}

impl fmt::Display for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.read_mode.name(),
            self.placement.name(),
            self.decode.name()
        )
    }
}

/// Outcome of a completed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    /// Records read by this parse.
    pub lines: u64,
    /// Columns decoded by this parse.
    pub columns: u64,
    /// Checksum total after the last record.
    pub total: i64,
}

/// Fixed-width parser for one schema and one strategy combination.
///
/// Holds no per-parse state and can be reused.
#[derive(Debug, Clone)]
pub struct FixedWidthParser {
    schema: Schema,
    config: ParserConfig,
}

impl FixedWidthParser {
    /// Fails if `config` cannot serve records of this schema's width.
    pub fn new(schema: Schema, config: ParserConfig) -> Result<Self> {
        let width = schema.total_width();
        config.source_options(width).validate()?;
        config.placement.check(width)?;
        Ok(Self { schema, config })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn source_options(&self) -> SourceOptions {
        self.config.source_options(self.schema.total_width())
    }

    /// Parse the file at `path` into a fresh checksum.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<ParseSummary> {
        let source = LineSource::open(path, self.source_options())?;
        self.parse_source(source, &mut Checksum::new(), |_, _| {})
    }

    /// Parse everything `reader` yields into a fresh checksum.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<ParseSummary> {
        self.parse_into(reader, &mut Checksum::new(), |_, _| {})
    }

    /// Parse `reader` into `checksum`, handing each record's values to
    /// `on_record` along with its line number.
    ///
    /// On error, `checksum` holds exactly the records before the failing one.
    pub fn parse_into<R, F>(
        &self,
        reader: R,
        checksum: &mut Checksum,
        on_record: F,
    ) -> Result<ParseSummary>
    where
        R: Read,
        F: FnMut(u64, &[i64]),
    {
        let source = LineSource::new(reader, self.source_options())?;
        self.parse_source(source, checksum, on_record)
    }

    pub fn parse_source<R, F>(
        &self,
        mut source: LineSource<R>,
        checksum: &mut Checksum,
        mut on_record: F,
    ) -> Result<ParseSummary>
    where
        R: Read,
        F: FnMut(u64, &[i64]),
    {
        let schema = &self.schema;
        if source.options().width != schema.total_width() {
            return Err(ParseError::invalid_config(format!(
                "source width {} does not match schema width {}",
                source.options().width,
                schema.total_width()
            )));
        }

        let mut decoder = self.config.decode.decoder(schema);
        let mut values = vec![0i64; schema.len()];
        debug!(
            config = %self.config,
            columns = schema.len(),
            width = schema.total_width(),
            "starting parse"
        );

        let lines = self.config.placement.with_buffer(schema.total_width(), |buffer| {
            let mut lines = 0u64;
            while source.next_into(buffer)? {
                let line = source.line_number();
                for (slot, view) in values.iter_mut().zip(extract(buffer, schema)?) {
                    *slot = decoder
                        .decode(&view)
                        .map_err(|source| ParseError::Decode { line, source })?;
                }
                checksum
                    .add_record(&values)
                    .ok_or(ParseError::TotalOverflow { line })?;
                on_record(line, &values);
                lines += 1;
            }
            Ok(lines)
        })?;

        let summary = ParseSummary {
            lines,
            columns: lines * schema.len() as u64,
            total: checksum.total(),
        };
        info!(
            config = %self.config,
            lines = summary.lines,
            total = summary.total,
            "parse complete"
        );
        Ok(summary)
    }
}
