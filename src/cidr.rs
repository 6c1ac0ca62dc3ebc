//! CIDR block parsing and inclusive range calculation.

use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::addr::parse_ipv4;
use crate::error::CidrError;

/// An IPv4 CIDR block such as `10.0.0.0/24`.
///
/// A bare address (no `/prefix`) is a single-host `/32` block. Host bits in
/// the written address are ignored: `10.0.0.5/24` is the same block as
/// `10.0.0.0/24`.
///
/// # Examples
/// ```
/// use ipcountry::cidr::CidrBlock;
///
/// let block: CidrBlock = "10.0.1.0/24".parse().unwrap();
/// assert_eq!(block.range(), (0x0A00_0100, 0x0A00_01FF));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    net: Ipv4Net,
}

impl CidrBlock {
    /// Create a block from a numeric address and prefix length.
    pub fn new(addr: u32, prefix_len: u8) -> Result<Self, CidrError> {
        let net = Ipv4Net::new(Ipv4Addr::from(addr), prefix_len)
            .map_err(|_| CidrError::InvalidPrefix(prefix_len.to_string()))?;
        Ok(Self { net: net.trunc() })
    }

    /// Parse `<address>/<prefix>` or a bare `<address>`.
    pub fn parse(input: &str) -> Result<Self, CidrError> {
        let (addr, prefix_len) = match input.split_once('/') {
            Some((addr, prefix)) => (parse_ipv4(addr)?, parse_prefix(prefix)?),
            None => (parse_ipv4(input)?, 32),
        };
        Self::new(addr, prefix_len)
    }

    /// Prefix length (0-32).
    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Lowest address of the block (the network address).
    pub fn min_addr(&self) -> u32 {
        u32::from(self.net.network())
    }

    /// Highest address of the block (the broadcast address).
    pub fn max_addr(&self) -> u32 {
        u32::from(self.net.broadcast())
    }

    /// Inclusive `(min, max)` interval.
    ///
    /// Network and broadcast addresses both count as hosts, so a `/24`
    /// covers 256 addresses and a `/32` covers exactly one.
    pub fn range(&self) -> (u32, u32) {
        (self.min_addr(), self.max_addr())
    }

    /// Number of addresses covered, including network and broadcast.
    pub fn host_count(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len()))
    }

    /// Check whether a numeric address lies within this block.
    pub fn contains(&self, addr: u32) -> bool {
        self.net.contains(&Ipv4Addr::from(addr))
    }
}

fn parse_prefix(prefix: &str) -> Result<u8, CidrError> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CidrError::InvalidPrefix(prefix.to_string()));
    }
    match prefix.parse::<u8>() {
        Ok(len) if len <= 32 => Ok(len),
        _ => Err(CidrError::InvalidPrefix(prefix.to_string())),
    }
}

impl FromStr for CidrBlock {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.net)
    }
}
