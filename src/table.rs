//! Range table construction from reference text.
//!
//! Reference data is plain UTF-8 text with one record per line:
//!
//! ```text
//! 10.0.0.0/24,CountryA
//! 10.0.1.0/24,CountryB
//! 192.0.2.1,CountryC
//! ```
//!
//! The first comma separates the CIDR block from the country name. Blank
//! lines are ignored.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use crate::cidr::CidrBlock;
use crate::error::{Error, LineErrorKind, ParseError, Result};
use crate::lookup::RangeLookup;

/// A contiguous address range owned by one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
    min: u32,
    max: u32,
    country: Arc<str>,
}

impl RangeEntry {
    /// Create an entry, swapping the bounds if given in reverse order.
    pub fn new(min: u32, max: u32, country: impl Into<Arc<str>>) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            country: country.into(),
        }
    }

    /// Create an entry covering every address of a CIDR block.
    pub fn from_block(block: &CidrBlock, country: impl Into<Arc<str>>) -> Self {
        let (min, max) = block.range();
        Self::new(min, max, country)
    }

    pub fn min_addr(&self) -> u32 {
        self.min
    }

    pub fn max_addr(&self) -> u32 {
        self.max
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Shared handle to the country name.
    pub fn country_arc(&self) -> Arc<str> {
        Arc::clone(&self.country)
    }

    /// Check whether `addr` lies within `[min, max]`.
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.min && addr <= self.max
    }
}

/// Immutable list of ranges sorted ascending by lower bound.
///
/// Overlapping ranges are kept as given; see [`RangeLookup`] for how a
/// lookup picks between them.
#[derive(Debug, Clone, Default)]
pub struct RangeTable {
    entries: Vec<RangeEntry>,
}

impl RangeTable {
    /// Build a table from entries in any order.
    ///
    /// The sort is stable: entries with equal lower bounds keep their
    /// relative input order.
    pub fn from_entries(mut entries: Vec<RangeEntry>) -> Self {
        entries.sort_by_key(|e| e.min);
        Self { entries }
    }

    /// Parse reference text, aborting on the first malformed line.
    pub fn parse_str(text: &str) -> Result<Self> {
        RangeTableBuilder::new().parse_str(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RangeEntry> {
        self.entries.iter()
    }

    /// Lookup handle over this table.
    pub fn lookup(&self) -> RangeLookup<'_> {
        RangeLookup::new(self)
    }

    /// Sum of the sizes of all ranges. Overlaps are counted twice.
    pub fn address_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.max - e.min) + 1)
            .sum()
    }
}

impl<'a> IntoIterator for &'a RangeTable {
    type Item = &'a RangeEntry;
    type IntoIter = std::slice::Iter<'a, RangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// What to do with a reference line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Fail the whole build with the first error.
    #[default]
    Abort,
    /// Log the line, drop it and keep going.
    Skip,
}

/// Incremental builder for [`RangeTable`].
///
/// # Examples
/// ```
/// use ipcountry::table::RangeTableBuilder;
///
/// let table = RangeTableBuilder::new()
///     .parse_str("10.0.1.0/24,CountryB\n10.0.0.0/24,CountryA\n")
///     .unwrap();
/// assert_eq!(table.entries()[0].country(), "CountryA");
/// ```
#[derive(Debug, Default)]
pub struct RangeTableBuilder {
    entries: Vec<RangeEntry>,
    policy: MalformedLinePolicy,
    skipped: usize,
}

impl RangeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the malformed line policy.
    pub fn with_policy(mut self, policy: MalformedLinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MalformedLinePolicy {
        self.policy
    }

    /// Number of lines dropped under [`MalformedLinePolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of entries collected so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an already constructed entry.
    pub fn push_entry(&mut self, entry: RangeEntry) {
        self.entries.push(entry);
    }

    /// Parse one reference line. `line_no` is 1-based and only used for
    /// error reporting.
    ///
    /// Blank lines are accepted and add nothing. Under
    /// [`MalformedLinePolicy::Skip`] a bad line is counted and `Ok` is
    /// returned.
    pub fn push_line(&mut self, line_no: usize, line: &str) -> std::result::Result<(), ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        match parse_line(line) {
            Ok(entry) => {
                log::trace!(
                    "line {}: {}..={} -> {}",
                    line_no,
                    entry.min,
                    entry.max,
                    entry.country
                );
                self.entries.push(entry);
                Ok(())
            }
            Err(kind) => {
                let err = ParseError::new(line_no, kind);
                match self.policy {
                    MalformedLinePolicy::Abort => Err(err),
                    MalformedLinePolicy::Skip => {
                        log::warn!("Skipping malformed reference {}", err);
                        self.skipped += 1;
                        Ok(())
                    }
                }
            }
        }
    }

    /// Parse every line of `text` and build the table.
    pub fn parse_str(mut self, text: &str) -> Result<RangeTable> {
        for (idx, line) in text.lines().enumerate() {
            self.push_line(idx + 1, line)?;
        }
        Ok(self.build())
    }

    /// Read and parse a whole reference stream.
    ///
    /// `key` names the source in errors. Read failures and invalid UTF-8
    /// are reported as [`Error::SourceUnavailable`].
    pub fn read_from<R: Read>(mut self, reader: R, key: &str) -> Result<RangeTable> {
        let buf_reader = BufReader::new(reader);

        for (idx, line) in buf_reader.lines().enumerate() {
            let line = line.map_err(|source| Error::SourceUnavailable {
                key: key.to_string(),
                source,
            })?;
            self.push_line(idx + 1, &line)?;
        }

        Ok(self.build())
    }

    /// Sort the collected entries and produce the table.
    pub fn build(self) -> RangeTable {
        if self.skipped > 0 {
            log::warn!(
                "Built range table with {} malformed lines skipped",
                self.skipped
            );
        }
        RangeTable::from_entries(self.entries)
    }
}

/// Parse `<cidr>,<country>` into an entry.
fn parse_line(line: &str) -> std::result::Result<RangeEntry, LineErrorKind> {
    let (block, country) = line.split_once(',').ok_or(LineErrorKind::MissingCountry)?;
    let block = block.trim();
    let country = country.trim();

    let cidr = CidrBlock::parse(block).map_err(|source| LineErrorKind::Cidr {
        block: block.to_string(),
        source,
    })?;

    if country.is_empty() {
        return Err(LineErrorKind::EmptyCountry);
    }

    Ok(RangeEntry::from_block(&cidr, country))
}
