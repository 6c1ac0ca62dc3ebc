//! IPv4 address <-> `u32` conversion.
//!
//! Addresses are handled as host-order `u32` values so that range
//! comparisons are plain integer comparisons.

use std::net::Ipv4Addr;

use crate::error::AddressError;

/// Parse a dotted-quad address into its numeric form.
///
/// Exactly four dot-separated components are required, each made of
/// decimal digits only and in the range 0-255. Leading zeros are read as
/// decimal (`010` is 10).
///
/// # Examples
/// ```
/// use ipcountry::addr::parse_ipv4;
///
/// assert_eq!(parse_ipv4("10.0.1.255").unwrap(), 0x0A00_01FF);
/// assert!(parse_ipv4("10.0.1").is_err());
/// ```
pub fn parse_ipv4(input: &str) -> Result<u32, AddressError> {
    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() != 4 {
        return Err(AddressError::ComponentCount(parts.len()));
    }

    let mut num = 0u32;
    for part in parts {
        num = (num << 8) | u32::from(parse_octet(part)?);
    }
    Ok(num)
}

fn parse_octet(part: &str) -> Result<u8, AddressError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::NotNumeric(part.to_string()));
    }

    // All digits, so the only way parsing fails is overflow
    part.parse::<u8>()
        .map_err(|_| AddressError::OctetOutOfRange(part.to_string()))
}

/// Format a numeric address as a canonical dotted quad.
pub fn format_ipv4(num: u32) -> String {
    Ipv4Addr::from(num).to_string()
}

/// Numeric form of an [`Ipv4Addr`].
#[inline]
pub fn ipv4_to_num(ip: Ipv4Addr) -> u32 {
    u32::from(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("0.0.0.0").unwrap(), 0);
        assert_eq!(parse_ipv4("255.255.255.255").unwrap(), u32::MAX);
        assert_eq!(parse_ipv4("192.168.1.0").unwrap(), 0xC0A8_0100);
        assert_eq!(parse_ipv4("10.0.0.5").unwrap(), (10 << 24) | 5);
    }

    #[test]
    fn test_parse_ipv4_high_bit() {
        // Would overflow a signed 32-bit accumulator
        assert_eq!(parse_ipv4("200.1.2.3").unwrap(), 0xC801_0203);
    }

    #[test]
    fn test_parse_ipv4_leading_zeros() {
        assert_eq!(parse_ipv4("010.000.001.009").unwrap(), parse_ipv4("10.0.1.9").unwrap());
    }

    #[test]
    fn test_parse_ipv4_invalid() {
        assert_eq!(parse_ipv4("10.0.1"), Err(AddressError::ComponentCount(3)));
        assert_eq!(parse_ipv4("1.2.3.4.5"), Err(AddressError::ComponentCount(5)));
        assert_eq!(parse_ipv4(""), Err(AddressError::ComponentCount(1)));
        assert_eq!(
            parse_ipv4("1.2.3.256"),
            Err(AddressError::OctetOutOfRange("256".to_string()))
        );
        assert_eq!(
            parse_ipv4("1.2.3.99999999999"),
            Err(AddressError::OctetOutOfRange("99999999999".to_string()))
        );
        assert_eq!(
            parse_ipv4("1.2..4"),
            Err(AddressError::NotNumeric(String::new()))
        );
        assert_eq!(
            parse_ipv4("1.2.3.+4"),
            Err(AddressError::NotNumeric("+4".to_string()))
        );
        assert!(parse_ipv4(" 1.2.3.4").is_err());
        assert!(parse_ipv4("::1").is_err());
    }

    #[test]
    fn test_roundtrip() {
        for ip in ["0.0.0.0", "1.2.3.4", "10.0.1.255", "127.0.0.1", "255.255.255.255"] {
            let num = parse_ipv4(ip).unwrap();
            assert_eq!(format_ipv4(num), ip);
            assert_eq!(parse_ipv4(&format_ipv4(num)).unwrap(), num);
        }
    }

    #[test]
    fn test_matches_std() {
        let ip = Ipv4Addr::new(203, 0, 113, 77);
        assert_eq!(ipv4_to_num(ip), parse_ipv4("203.0.113.77").unwrap());
    }
}
