//! CLI tool to parse a fixed-width numeric file and check its checksum.
//!
//! Usage:
//!   fw-checksum <input.txt>
//!   fw-checksum <input.txt> --generate 100000 --expected 370370370000000
//!   fw-checksum <input.txt> --all-strategies

use std::path::PathBuf;
use std::process;

use checksum_run::{RunError, check_agreement, ensure_fixture, run_all, run_one};
use clap::{Parser, ValueEnum};
use fixedwidth_rs::{
    BufferPlacement, DecodeStrategy, LengthPolicy, ParseError, ParserConfig, ReadMode, Schema,
    Terminator,
};
use tracing::{error, info};

#[derive(Clone, Copy, ValueEnum)]
enum ReadArg {
    Lines,
    Blocks,
}

#[derive(Clone, Copy, ValueEnum)]
enum TerminatorArg {
    Lf,
    Crlf,
}

#[derive(Clone, Copy, ValueEnum)]
enum BufferArg {
    Heap,
    Stack,
}

#[derive(Clone, Copy, ValueEnum)]
enum DecodeArg {
    Borrowed,
    Scratch,
    Owned,
}

/// Parse a fixed-width numeric file and report the sum of every column.
#[derive(Parser)]
#[command(name = "fw-checksum")]
struct Cli {
    /// Input data file (fixed-width records)
    input: PathBuf,

    /// Comma-separated column widths (default: 1..10 repeated three times)
    #[arg(short, long)]
    widths: Option<Schema>,

    /// Fail unless the total equals this value
    #[arg(short, long, allow_hyphen_values = true)]
    expected: Option<i64>,

    /// Create the input with this many lines of '1' if it does not exist
    #[arg(short, long, value_name = "LINES")]
    generate: Option<u64>,

    /// How lines are read
    #[arg(long, value_enum, default_value = "lines")]
    read_mode: ReadArg,

    /// Line terminator for block reads and generated files
    #[arg(long, value_enum, default_value = "lf")]
    terminator: TerminatorArg,

    /// Where the record buffer lives
    #[arg(long, value_enum, default_value = "heap")]
    buffer: BufferArg,

    /// Column decoding strategy
    #[arg(long, value_enum, default_value = "borrowed")]
    decode: DecodeArg,

    /// Pad short lines and truncate long ones instead of failing
    #[arg(long)]
    lenient: bool,

    /// Padding byte for --lenient
    #[arg(long, default_value_t = '0')]
    pad: char,

    /// Run every strategy combination and require identical totals
    #[arg(long)]
    all_strategies: bool,

    /// Log each strategy and the parse progress
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<ParserConfig, RunError> {
        let length_policy = if self.lenient {
            if !self.pad.is_ascii() {
                return Err(ParseError::invalid_config("--pad must be an ASCII character").into());
            }
            LengthPolicy::Lenient {
                pad: self.pad as u8,
            }
        } else {
            LengthPolicy::Strict
        };

        Ok(ParserConfig {
            read_mode: match self.read_mode {
                ReadArg::Lines => ReadMode::Lines,
                ReadArg::Blocks => ReadMode::Blocks,
            },
            terminator: self.terminator(),
            length_policy,
            placement: match self.buffer {
                BufferArg::Heap => BufferPlacement::Heap,
                BufferArg::Stack => BufferPlacement::Stack,
            },
            decode: match self.decode {
                DecodeArg::Borrowed => DecodeStrategy::Borrowed,
                DecodeArg::Scratch => DecodeStrategy::Scratch,
                DecodeArg::Owned => DecodeStrategy::Owned,
            },
        })
    }

    fn terminator(&self) -> Terminator {
        match self.terminator {
            TerminatorArg::Lf => Terminator::Lf,
            TerminatorArg::Crlf => Terminator::CrLf,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(total) => println!("{total}"),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i64, RunError> {
    let schema = cli.widths.clone().unwrap_or_else(Schema::benchmark);

    if let Some(lines) = cli.generate {
        ensure_fixture(&cli.input, schema.total_width(), lines, b'1', cli.terminator()).map_err(
            |source| RunError::Fixture {
                path: cli.input.clone(),
                source,
            },
        )?;
    }

    let runs = if cli.all_strategies {
        let terminator = cli.terminator();
        let configs: Vec<ParserConfig> = ParserConfig::all_strategies()
            .into_iter()
            .map(|c| c.with_terminator(terminator))
            .collect();
        run_all(&schema, &configs, &cli.input)?
    } else {
        vec![run_one(&schema, cli.config()?, &cli.input)?]
    };

    for r in &runs {
        info!(
            config = %r.config,
            lines = r.summary.lines,
            columns = r.summary.columns,
            total = r.summary.total,
            "parsed"
        );
    }

    check_agreement(&runs, cli.expected)
}
