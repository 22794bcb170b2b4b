use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::io::{self, Write};
use std::process::ExitCode;

use geoipcsv::input::FileOrStdin;
use geoipcsv::{Config, ErrorMode, MaxMindStore, StreamProcessor, Summary};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
        if let Some(lib_err) = cause.downcast_ref::<geoipcsv::Error>() {
            if lib_err.is_broken_pipe() {
                return true;
            }
        }
    }
    false
}

/// Append city, country, isAnonymousProxy and isSatelliteProvider columns (in
/// that order) to CSV records, looked up from a MaxMind GeoIP2 City database
/// by the IP address in one column. Names missing in the chosen language are
/// left blank.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Location on disk of the GeoIP2/GeoLite2 City database
    #[clap(
        short = 'd',
        long,
        value_name = "PATH",
        value_hint = clap::ValueHint::FilePath,
        env = "GEOIP_DB",
        default_value = geoipcsv::config::DEFAULT_DATABASE
    )]
    dblocation: Utf8PathBuf,

    /// Zero-based index of the column containing the IP address
    #[clap(short = 'i', long, value_name = "N", default_value_t = 0)]
    address_column_index: usize,

    /// Two letter code of the language city and country names are wanted in
    #[clap(short, long, value_name = "CODE", default_value = geoipcsv::config::DEFAULT_LANGUAGE)]
    language: String,

    /// Characters used to quote the IP address, if any. Each one is trimmed
    /// from both ends of the address column before lookup
    #[clap(short = 'c', long, value_name = "CHARS")]
    quote_char: Option<String>,

    /// Field delimiter for input and output records
    #[clap(short = 'D', long, value_name = "CHAR", default_value_t = ',')]
    delimiter: char,

    /// What to do with a record whose address cannot be parsed or resolved
    #[clap(long, value_enum, default_value_t = ArgsErrorMode::Abort)]
    on_error: ArgsErrorMode,

    /// Log additional diagnostics, such as missing translations, to stderr
    #[clap(long)]
    verbose: bool,

    /// Input file(s) to process. Leave empty or use "-" to read from stdin
    #[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    input: Vec<Utf8PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ArgsErrorMode {
    /// Stop at the first bad record
    Abort,
    /// Log bad records to stderr and continue
    Skip,
}

impl From<ArgsErrorMode> for ErrorMode {
    fn from(mode: ArgsErrorMode) -> Self {
        match mode {
            ArgsErrorMode::Abort => ErrorMode::Abort,
            ArgsErrorMode::Skip => ErrorMode::Skip,
        }
    }
}

impl Args {
    fn config(&self) -> Result<Config> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            );
        }
        Ok(Config {
            database: self.dblocation.clone(),
            column: self.address_column_index,
            language: self.language.clone(),
            trim: self.quote_char.clone(),
            delimiter: self.delimiter as u8,
            verbose: self.verbose,
            on_error: self.on_error.into(),
        })
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    // RUST_LOG is read first, the CLI level takes precedence
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    // Handle broken pipe errors gracefully
    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    // Print detailed error information based on environment variables
    let mut stderr = io::stderr();
    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(stderr, "error: {:?}", err);
    } else {
        let _ = writeln!(stderr, "error: {:#}", err);
    }

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    let mut args = Args::parse();
    init_logger(args.verbose);

    // if no files specified, add stdin
    if args.input.is_empty() {
        args.input.push(Utf8PathBuf::from("-"));
    }

    let config = args.config()?;
    run(&config, args.input)?;

    Ok(ExitCode::SUCCESS)
}

fn run(config: &Config, inputs: Vec<Utf8PathBuf>) -> Result<()> {
    // Open once up front; dropping the store at the end of this scope closes it
    // on every exit path.
    let store = MaxMindStore::open(&config.database)?;
    let processor = StreamProcessor::new(config, &store);

    // stdout is line buffered, so each record is emitted as soon as it is done
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut total = Summary::default();

    for path in inputs {
        let source = FileOrStdin::from_path(path);
        let mut reader = source.reader()?;
        let summary = processor
            .process(&mut reader, &mut out)
            .with_context(|| format!("failed to enrich {}", source))?;
        log::debug!(
            "{}: {} lines, {} written, {} skipped",
            source,
            summary.lines,
            summary.written,
            summary.skipped
        );
        total += summary;
    }

    if total.skipped > 0 {
        log::warn!(
            "skipped {} of {} records",
            total.skipped,
            total.lines
        );
    }
    out.flush()?;
    Ok(())
}
