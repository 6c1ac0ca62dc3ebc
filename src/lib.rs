//! ipcountry - IPv4 to country resolution over CIDR reference tables.
//!
//! This crate maps an IPv4 address to a country name using a reference file
//! of CIDR blocks, each tagged with a country.
//!
//! # Features
//!
//! - **Plain text reference data**: one `<cidr-or-ip>,<country>` per line
//! - **Inclusive ranges**: network and broadcast addresses are lookup-eligible
//! - **Binary search**: O(log n) lookups over ranges sorted by lower bound
//! - **Keyed cache**: one table per reference file, rebuilt on change of key
//! - **Hot swap**: rebuilds are swapped in atomically, readers never see a
//!   half-built table
//! - **Gzip**: `*.gz` reference files are decompressed transparently
//!
//! # Quick Start
//!
//! ```
//! use ipcountry::RangeTable;
//!
//! let table = RangeTable::parse_str("10.0.0.0/24,CountryA\n10.0.1.0/24,CountryB\n")?;
//!
//! assert_eq!(table.lookup().resolve("10.0.0.5")?, Some("CountryA"));
//! assert_eq!(table.lookup().resolve("10.0.2.1")?, None);
//! # Ok::<(), ipcountry::Error>(())
//! ```
//!
//! # Cached Lookups
//!
//! For callers that pass the reference file along with every query, use
//! [`TableCache`] or the process-wide [`resolve`]:
//!
//! ```no_run
//! let country = ipcountry::resolve("10.0.0.5", "/data/ranges.csv")?;
//! # Ok::<(), ipcountry::Error>(())
//! ```
//!
//! # Overlapping Ranges
//!
//! Overlaps are not resolved. A lookup returns whichever enclosing range the
//! binary search reaches first; see [`RangeLookup::find`].

mod error;
mod global;

pub mod addr;
pub mod cache;
pub mod cidr;
pub mod lookup;
pub mod source;
pub mod table;

// Re-export core types
pub use error::{AddressError, CidrError, Error, LineErrorKind, ParseError, Result};
pub use cidr::CidrBlock;
pub use lookup::RangeLookup;
pub use table::{MalformedLinePolicy, RangeEntry, RangeTable, RangeTableBuilder};

// Re-export cache types
pub use cache::{CacheConfig, CacheStats, LoadedTable, TableCache};
pub use source::{FileSource, MemorySource, TableSource};

// Re-export global API functions
pub use global::{global_cache, invalidate, resolve};
