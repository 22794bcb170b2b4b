use bstr::ByteSlice;

use crate::error::{Error, Result};

/// One input line split into its fields, with the address column extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    fields: Vec<&'a [u8]>,
    address: &'a [u8],
}

impl<'a> Record<'a> {
    /// All fields of the line in input order, untouched by trimming.
    #[inline]
    pub fn fields(&self) -> &[&'a [u8]] {
        &self.fields
    }

    /// The address column after trimming.
    #[inline]
    pub fn address(&self) -> &'a [u8] {
        self.address
    }
}

/// Characters stripped from both ends of the address column.
///
/// Each character is trimmed on its own, so `"'` strips any mix of double and
/// single quotes rather than one matched pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimSet(Vec<char>);

impl TrimSet {
    pub fn new(chars: &str) -> Self {
        TrimSet(chars.chars().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    /// Strip leading and trailing members of the set from `field`.
    #[inline]
    pub fn trim<'a>(&self, field: &'a [u8]) -> &'a [u8] {
        if self.is_empty() {
            return field;
        }
        field.trim_with(|c| self.contains(c))
    }
}

/// Splits delimited lines and pulls out the configured address column.
#[derive(Debug, Clone)]
pub struct RecordParser {
    delimiter: u8,
    column: usize,
    trim: TrimSet,
}

impl RecordParser {
    pub fn new(delimiter: u8, column: usize, trim: Option<&str>) -> Self {
        Self {
            delimiter,
            column,
            trim: trim.map(TrimSet::new).unwrap_or_default(),
        }
    }

    #[inline]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Split `line` (without its terminator) into a [`Record`].
    ///
    /// There is no quoting: a delimiter inside a field always starts a new
    /// field, and an empty line is a single empty field.
    pub fn parse<'a>(&self, line: &'a [u8]) -> Result<Record<'a>> {
        let delimiter = self.delimiter;
        let fields: Vec<&'a [u8]> = line.split(|&b| b == delimiter).collect();

        let address = match fields.get(self.column) {
            Some(&field) => self.trim.trim(field),
            None => {
                return Err(Error::ColumnOutOfRange {
                    column: self.column,
                    fields: fields.len(),
                })
            }
        };

        Ok(Record { fields, address })
    }
}
