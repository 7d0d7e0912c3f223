//! Address canonicalization helpers.
//!
//! Addresses are stored canonically in mixed-case checksum form (on write)
//! and compared case-insensitively against the zero sentinel.

use alloy::primitives::Address;

/// Render an address in its canonical checksum form for persistence.
#[must_use]
pub fn checksum(address: Address) -> String {
    address.to_checksum(None)
}

/// Parse an address from a string, accepting any case.
///
/// # Errors
/// Returns an error if the string is not a well-formed 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, alloy::primitives::AddressError> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_roundtrips_zero_address() {
        assert_eq!(
            checksum(Address::ZERO),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn parse_address_accepts_lowercase() {
        let addr = parse_address("0x1111111111111111111111111111111111111111").unwrap();
        assert_eq!(checksum(addr).to_lowercase(), "0x1111111111111111111111111111111111111111");
    }

    #[test]
    fn parse_address_rejects_short_strings() {
        assert!(parse_address("0x1234").is_err());
    }
}
