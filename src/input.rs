use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use camino::Utf8PathBuf;

use crate::error::{Error, Result};

/// One line of input with its terminator removed.
///
/// Both `\n` and `\r\n` endings are accepted; a final line without a
/// terminator is still a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    number: u64,
    content: &'a [u8],
}

impl<'a> Line<'a> {
    /// Create a Line from raw bytes as returned by `read_until(b'\n')`.
    #[inline]
    pub fn new(number: u64, full: &'a [u8]) -> Line<'a> {
        let content = full.strip_suffix(b"\n").unwrap_or(full);
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        Line { number, content }
    }

    /// One-based position of the line in its source.
    #[inline]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The content of the line, excluding the line terminator.
    #[inline]
    pub fn content(&self) -> &'a [u8] {
        self.content
    }
}

/// Call `f` with each line of `rdr`, in order, until it returns `Ok(false)`,
/// fails, or the input ends.
///
/// Only one line is buffered at a time, so this works on unbounded streams.
pub fn for_each_line<R, F>(rdr: &mut R, mut f: F) -> Result<()>
where
    R: BufRead + ?Sized,
    F: FnMut(Line<'_>) -> Result<bool>,
{
    let mut buf = Vec::with_capacity(1024);
    let mut number = 0;
    loop {
        buf.clear();
        if rdr.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;
        if !f(Line::new(number, &buf))? {
            break;
        }
    }
    Ok(())
}

/// A source that can be either a file or stdin.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum FileOrStdin {
    /// Input from a file.
    File(Utf8PathBuf),
    /// Input from stdin.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// Create a new FileOrStdin from a path.
    ///
    /// If the path is "-", stdin is used.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    /// Open the input source as a reader.
    pub fn reader(&self) -> Result<InputReader> {
        match self {
            FileOrStdin::File(path) => {
                let file = File::open(path).map_err(|source| Error::OpenInput {
                    path: path.clone(),
                    source,
                })?;
                Ok(InputReader::File(BufReader::new(file)))
            }
            FileOrStdin::Stdin => Ok(InputReader::Stdin(io::stdin().lock())),
        }
    }
}

/// A reader for input from either a file or stdin.
pub enum InputReader {
    /// A reader for a file.
    File(BufReader<File>),
    /// A locked handle to stdin.
    Stdin(io::StdinLock<'static>),
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputReader::File(rdr) => rdr.read(buf),
            InputReader::Stdin(rdr) => rdr.read(buf),
        }
    }
}

impl BufRead for InputReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            InputReader::File(rdr) => rdr.fill_buf(),
            InputReader::Stdin(rdr) => rdr.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            InputReader::File(rdr) => rdr.consume(amt),
            InputReader::Stdin(rdr) => rdr.consume(amt),
        }
    }
}
