//! # fixedwidth-rs
//!
//! Allocation-free parsing of fixed-width, delimiterless numeric records.
//!
//! Every line of the input holds the same number of bytes, split into
//! consecutive columns whose widths come from a [`Schema`]. Parsing reads
//! each line into one reused record buffer, slices it into column views
//! without copying, decodes each view to an `i64`, and adds the values to a
//! running [`Checksum`].
//!
//! ## Overview
//!
//! - **Line source**: line-oriented or fixed-block reads into the buffer
//! - **Buffer placement**: heap or stack, chosen by configuration
//! - **Column extractor**: lazy views, offsets are cumulative widths
//! - **Decoder**: borrowed, scratch-copy or owned-string strategies
//! - **Checksum**: the running total every strategy must agree on
//!
//! ## Example
//!
//! ```
//! use fixedwidth_rs::{FixedWidthParser, ParserConfig, Schema};
//!
//! // Layout: A(1) B(2) C(3)
//! let schema = Schema::new(vec![1, 2, 3]).unwrap();
//! let parser = FixedWidthParser::new(schema, ParserConfig::default()).unwrap();
//!
//! let input = "122333\n100200\n";
//! let summary = parser.parse_reader(input.as_bytes()).unwrap();
//!
//! assert_eq!(summary.lines, 2);
//! assert_eq!(summary.total, 1 + 22 + 333 + 1 + 200);
//! ```

pub mod buffer;
pub mod checksum;
pub mod decode;
pub mod error;
pub mod extract;
pub mod parser;
pub mod schema;
pub mod source;

pub use buffer::{BufferPlacement, BufferProvider, HeapBuffer, STACK_RECORD_CAPACITY, StackBuffer};
pub use checksum::Checksum;
pub use decode::{
    BorrowedDecoder, ColumnDecoder, DecodeError, DecodeStrategy, OwnedDecoder, ScratchDecoder,
    decode_bytes,
};
pub use error::{ParseError, Result};
pub use extract::{ColumnView, Columns, extract};
pub use parser::{FixedWidthParser, ParseSummary, ParserConfig};
pub use schema::Schema;
pub use source::{LengthPolicy, LineSource, ReadMode, SourceOptions, Terminator};
