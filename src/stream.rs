//! The line-by-line enrichment loop.
//!
//! Every input line is parsed, its address resolved and the original fields
//! written back out followed by the four derived columns. Records are handled
//! strictly one at a time and in input order.

use std::error::Error as StdError;
use std::io::{BufRead, Write};

use crate::config::{Config, ErrorMode};
use crate::enrich::Enricher;
use crate::error::{Error, Result, Stage};
use crate::input::{for_each_line, Line};
use crate::record::RecordParser;
use crate::store::LocationStore;

/// Counters for one run over an input source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Lines read from the input.
    pub lines: u64,
    /// Enriched lines written to the output.
    pub written: u64,
    /// Bad records dropped under [`ErrorMode::Skip`].
    pub skipped: u64,
}

impl std::ops::AddAssign for Summary {
    fn add_assign(&mut self, other: Summary) {
        self.lines += other.lines;
        self.written += other.written;
        self.skipped += other.skipped;
    }
}

/// Drives parsing and enrichment over a stream of lines.
#[derive(Debug)]
pub struct StreamProcessor<'s, S: LocationStore + ?Sized> {
    parser: RecordParser,
    enricher: Enricher<'s, S>,
    on_error: ErrorMode,
}

impl<'s, S: LocationStore + ?Sized> StreamProcessor<'s, S> {
    pub fn new(config: &Config, store: &'s S) -> Self {
        Self {
            parser: RecordParser::new(config.delimiter, config.column, config.trim()),
            enricher: Enricher::new(store, config.language.as_str(), config.verbose),
            on_error: config.on_error,
        }
    }

    /// Enrich every line of `input` into `out`.
    ///
    /// Under [`ErrorMode::Abort`] the first bad record ends the run with an
    /// [`Error::Line`]; lines before it have already been written. I/O errors
    /// always end the run.
    pub fn process<R, W>(&self, input: &mut R, out: &mut W) -> Result<Summary>
    where
        R: BufRead + ?Sized,
        W: Write + ?Sized,
    {
        let mut summary = Summary::default();
        let mut buf = Vec::with_capacity(256);

        for_each_line(input, |line| {
            summary.lines += 1;
            buf.clear();
            match self.enrich_line(line, &mut buf) {
                Ok(()) => {
                    out.write_all(&buf)?;
                    summary.written += 1;
                }
                Err(err) if self.on_error == ErrorMode::Skip && err.is_record_error() => {
                    log::warn!("skipping record: {}", error_chain(&err));
                    summary.skipped += 1;
                }
                Err(err) => return Err(err),
            }
            Ok(true)
        })?;

        out.flush()?;
        Ok(summary)
    }

    /// Render one enriched line, terminator included, into `buf`.
    fn enrich_line(&self, line: Line<'_>, buf: &mut Vec<u8>) -> Result<()> {
        let number = line.number();
        let at = |stage: Stage| {
            move |source: Error| Error::Line {
                line: number,
                stage,
                source: Box::new(source),
            }
        };

        let record = self.parser.parse(line.content()).map_err(at(Stage::Parse))?;
        let tuple = self
            .enricher
            .enrich(record.address())
            .map_err(at(Stage::Lookup))?;

        let delimiter = self.parser.delimiter();
        for (i, field) in record.fields().iter().enumerate() {
            if i > 0 {
                buf.push(delimiter);
            }
            buf.extend_from_slice(field);
        }
        tuple.write_fields(delimiter, buf)?;
        buf.push(b'\n');
        Ok(())
    }
}

/// Render an error and its sources on one line, `outer: inner: ...`.
pub fn error_chain(err: &Error) -> String {
    let mut rendered = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    rendered
}
