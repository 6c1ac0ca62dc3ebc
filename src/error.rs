//! Error types for ipcountry.

use thiserror::Error;

/// Error type for ipcountry operations.
///
/// An address that falls outside every known range is not an error;
/// lookups report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    /// The reference source could not be opened or read
    #[error("reference source unavailable: {key}: {source}")]
    SourceUnavailable {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A reference line is malformed
    #[error("malformed reference data: {0}")]
    Parse(#[from] ParseError),

    /// Query address is not a valid dotted quad
    #[error("invalid IPv4 address {input:?}: {source}")]
    InvalidAddress {
        input: String,
        #[source]
        source: AddressError,
    },
}

/// Result type alias for ipcountry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for dotted-quad address parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Wrong number of dot-separated components
    #[error("expected 4 dot-separated components, found {0}")]
    ComponentCount(usize),

    /// Component is empty or contains non-digit characters
    #[error("component {0:?} is not a decimal number")]
    NotNumeric(String),

    /// Component is numeric but larger than 255
    #[error("octet {0} is out of range 0-255")]
    OctetOutOfRange(String),
}

/// Error type for CIDR block parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Address part of the block is invalid
    #[error("invalid network address: {0}")]
    Address(#[from] AddressError),

    /// Prefix length is not a number in 0-32
    #[error("invalid prefix length {0:?} (must be 0-32)")]
    InvalidPrefix(String),
}

/// Reason a single reference line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineErrorKind {
    /// No comma separating the block from the country
    #[error("missing country field")]
    MissingCountry,

    /// Country field present but blank
    #[error("empty country field")]
    EmptyCountry,

    /// First field is not a valid CIDR block
    #[error("invalid CIDR block {block:?}: {source}")]
    Cidr {
        block: String,
        #[source]
        source: CidrError,
    },
}

/// A malformed reference line, identified by its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: LineErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: LineErrorKind) -> Self {
        Self { line, kind }
    }
}
