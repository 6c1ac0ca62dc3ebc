//! Binary search lookup over a [`RangeTable`].

use std::net::Ipv4Addr;

use crate::addr::parse_ipv4;
use crate::error::{Error, Result};
use crate::table::{RangeEntry, RangeTable};

/// Read-only lookup over a built table.
///
/// Holds only a shared borrow, so any number of lookups can run against
/// the same table from different threads.
///
/// # Examples
/// ```
/// use ipcountry::RangeTable;
///
/// let table = RangeTable::parse_str("10.0.0.0/24,CountryA\n10.0.1.0/24,CountryB").unwrap();
/// let lookup = table.lookup();
///
/// assert_eq!(lookup.resolve("10.0.0.5").unwrap(), Some("CountryA"));
/// assert_eq!(lookup.resolve("10.0.2.1").unwrap(), None);
/// assert!(lookup.resolve("10.0.2").is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RangeLookup<'a> {
    table: &'a RangeTable,
}

impl<'a> RangeLookup<'a> {
    pub fn new(table: &'a RangeTable) -> Self {
        Self { table }
    }

    /// Find the entry enclosing `addr`.
    ///
    /// Searches the inclusive window `[begin, end]`, probing
    /// `begin + (end - begin + 1) / 2` so that an even-sized window probes
    /// its upper middle. The window is kept half-open here as `lo..hi`
    /// with `hi = end + 1`, which makes that probe `lo + (hi - lo) / 2`.
    ///
    /// With overlapping ranges the result is whichever enclosing entry
    /// the probe sequence reaches first, which is not necessarily the most
    /// specific one, and an enclosing entry may be missed entirely.
    pub fn find(&self, addr: u32) -> Option<&'a RangeEntry> {
        let entries = self.table.entries();
        let mut lo = 0usize;
        let mut hi = entries.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = &entries[mid];

            if entry.contains(addr) {
                return Some(entry);
            } else if addr < entry.min_addr() {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        None
    }

    /// Country for a numeric address, `None` if no range encloses it.
    pub fn country(&self, addr: u32) -> Option<&'a str> {
        self.find(addr).map(RangeEntry::country)
    }

    /// Country for an [`Ipv4Addr`].
    pub fn country_of(&self, ip: Ipv4Addr) -> Option<&'a str> {
        self.country(u32::from(ip))
    }

    /// Parse a dotted-quad address and look it up.
    ///
    /// Returns `Ok(None)` when the address is valid but not covered.
    pub fn resolve(&self, ip: &str) -> Result<Option<&'a str>> {
        let addr = parse_ipv4(ip).map_err(|source| Error::InvalidAddress {
            input: ip.to_string(),
            source,
        })?;
        Ok(self.country(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::CidrBlock;

    fn ip(s: &str) -> u32 {
        parse_ipv4(s).unwrap()
    }

    fn sample() -> RangeTable {
        RangeTable::parse_str("10.0.0.0/24,CountryA\n10.0.1.0/24,CountryB\n").unwrap()
    }

    #[test]
    fn test_resolve() {
        let table = sample();
        let lookup = table.lookup();

        assert_eq!(lookup.resolve("10.0.0.5").unwrap(), Some("CountryA"));
        assert_eq!(lookup.resolve("10.0.1.255").unwrap(), Some("CountryB"));
        assert_eq!(lookup.resolve("10.0.2.1").unwrap(), None);
        assert_eq!(lookup.resolve("9.255.255.255").unwrap(), None);
    }

    #[test]
    fn test_inclusive_bounds() {
        let table = sample();
        let lookup = table.lookup();

        for entry in table.iter() {
            assert_eq!(lookup.country(entry.min_addr()), Some(entry.country()));
            assert_eq!(lookup.country(entry.max_addr()), Some(entry.country()));
        }
        assert_eq!(lookup.country(ip("10.0.0.0") - 1), None);
        assert_eq!(lookup.country(ip("10.0.1.255") + 1), None);
    }

    #[test]
    fn test_single_host() {
        let table = RangeTable::parse_str("192.0.2.1/32,Solo").unwrap();
        let lookup = table.lookup();

        let block = CidrBlock::parse("192.0.2.1/32").unwrap();
        assert_eq!(block.min_addr(), ip("192.0.2.1"));
        assert_eq!(block.max_addr(), ip("192.0.2.1"));

        assert_eq!(lookup.resolve("192.0.2.1").unwrap(), Some("Solo"));
        assert_eq!(lookup.resolve("192.0.2.0").unwrap(), None);
        assert_eq!(lookup.resolve("192.0.2.2").unwrap(), None);
    }

    #[test]
    fn test_invalid_address() {
        let table = sample();
        let lookup = table.lookup();

        for bad in ["", "10.0.0", "10.0.0.256", "a.b.c.d", "10.0.0.1/24", "::1"] {
            let err = lookup.resolve(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress { ref input, .. } if input == bad),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_empty_table() {
        let table = RangeTable::default();
        assert_eq!(table.lookup().country(0), None);
        assert_eq!(table.lookup().country(u32::MAX), None);
    }

    #[test]
    fn test_many_ranges() {
        // 256 disjoint /24s with gaps between them
        let text: String = (0..256)
            .map(|i| format!("10.{}.0.0/24,C{}\n", i, i))
            .collect();
        let table = RangeTable::parse_str(&text).unwrap();
        let lookup = table.lookup();

        for i in 0..256u32 {
            let base = (10 << 24) | (i << 16);
            let expected = format!("C{}", i);
            assert_eq!(lookup.country(base), Some(expected.as_str()));
            assert_eq!(lookup.country(base + 255), Some(expected.as_str()));
            assert_eq!(lookup.country(base + 256), None);
        }
    }

    #[test]
    fn test_upper_middle_probe() {
        // Two overlapping ranges: an even window probes index 1 first
        let table = RangeTable::from_entries(vec![
            RangeEntry::new(0, 100, "Wide"),
            RangeEntry::new(10, 20, "Narrow"),
        ]);
        assert_eq!(table.lookup().country(15), Some("Narrow"));
        assert_eq!(table.lookup().country(5), Some("Wide"));
        // Right of Narrow, so the search never returns to Wide
        assert_eq!(table.lookup().country(50), None);
    }

    #[test]
    fn test_overlap_can_miss() {
        let table = RangeTable::from_entries(vec![
            RangeEntry::new(0, 100, "Wide"),
            RangeEntry::new(10, 20, "B"),
            RangeEntry::new(30, 40, "C"),
        ]);
        // Probes B then C and walks off the right end
        assert_eq!(table.lookup().country(50), None);
        assert_eq!(table.lookup().country(5), Some("Wide"));
    }

    #[test]
    fn test_idempotent() {
        let table = sample();
        let lookup = table.lookup();
        let first = lookup.resolve("10.0.1.7").unwrap();
        let second = lookup.resolve("10.0.1.7").unwrap();
        assert_eq!(first, second);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_country_of() {
        let table = sample();
        assert_eq!(
            table.lookup().country_of(Ipv4Addr::new(10, 0, 1, 1)),
            Some("CountryB")
        );
    }
}
