use regex::Regex;
use sha3::{Digest, Keccak256};
use web3::types::Address;

use crate::error::CheckError;

/// Validate that the RPC endpoint URL is http(s).
///
/// # Arguments
/// * `url` - RPC endpoint URL to check
pub fn validate_rpc_url(url: &str) -> Result<(), CheckError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(CheckError::InvalidConfig(format!(
            "RPC URL must start with http:// or https://; url={}",
            url
        )))
    }
}

/// Validate whether the specified address is in correct format.
/// Return true if the format is correct, otherwise return false.
///
/// # Arguments
/// * `address` - address to check its format correctness
pub fn validate_address_format(address: &str) -> bool {
    let lowercase_address = address.to_lowercase();
    let regex: Regex = Regex::new(r#"^(0x)?[0-9a-f]{40}$"#).unwrap();

    regex.is_match(&lowercase_address)
}

/// Normalize an address into its EIP-55 checksum-cased form, `0x`-prefixed.
///
/// The case pattern is a checksum: the lowercase hex digits are hashed with
/// Keccak-256 and each hex letter whose corresponding hash nibble is >= 8 is
/// uppercased. Idempotent; input casing is irrelevant.
///
/// # Arguments
/// * `address` - address string, 40 hex chars with optional `0x` prefix
pub fn normalize_address(address: &str) -> Result<String, CheckError> {
    if !validate_address_format(address) {
        return Err(CheckError::InvalidAddress(format!(
            "not a 20-byte hex address; addr={}",
            address
        )));
    }

    let lowercase_address = address.to_lowercase();
    let bare = lowercase_address
        .strip_prefix("0x")
        .unwrap_or(&lowercase_address);
    let hash = Keccak256::digest(bare.as_bytes());

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in bare.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

/// Get `Address` from string literal for use on the wire.
///
/// # Arguments
/// * `address` - address string, 40 hex chars with optional `0x` prefix
pub fn parse_address(address: &str) -> Result<Address, CheckError> {
    if !validate_address_format(address) {
        return Err(CheckError::InvalidAddress(format!(
            "not a 20-byte hex address; addr={}",
            address
        )));
    }

    let lowercase_address = address.to_lowercase();
    let bare = lowercase_address
        .strip_prefix("0x")
        .unwrap_or(&lowercase_address);
    let address_bytes = hex::decode(bare).map_err(|e| {
        CheckError::InvalidAddress(format!(
            "hex decoding of address failed; addr={}, err={}",
            address, e
        ))
    })?;

    Ok(Address::from_slice(address_bytes.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rpc_url() {
        assert!(validate_rpc_url("http://localhost:8545").is_ok());
        assert!(validate_rpc_url("https://rpc.ankr.com/eth").is_ok());

        let res = validate_rpc_url("ftp://example.com");
        assert!(matches!(res, Err(CheckError::InvalidConfig(_))));
        assert!(matches!(
            validate_rpc_url("ws://localhost:8546"),
            Err(CheckError::InvalidConfig(_))
        ));
        assert!(matches!(
            validate_rpc_url(""),
            Err(CheckError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_address_rejected() {
        // wrong length
        assert!(matches!(
            normalize_address("0x1234"),
            Err(CheckError::InvalidAddress(_))
        ));
        // 41 hex chars
        assert!(matches!(
            normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed0"),
            Err(CheckError::InvalidAddress(_))
        ));
        // non-hex characters
        assert!(matches!(
            normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaeg"),
            Err(CheckError::InvalidAddress(_))
        ));
        assert!(matches!(
            normalize_address(""),
            Err(CheckError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("not-an-address"),
            Err(CheckError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_checksum_reference_vectors() {
        // reference vectors from the EIP-55 write-up
        let vectors = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0xde709f2102306220921060314715629080e2fb77",
        ];
        for v in vectors {
            assert_eq!(normalize_address(&v.to_lowercase()).unwrap(), v);
            assert_eq!(normalize_address(&v.to_uppercase()[2..]).unwrap(), v);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_address("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        let twice = normalize_address(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_accepts_unprefixed() {
        let res = normalize_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(res, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_parse_address_roundtrip() {
        let addr = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        assert_eq!(
            format!("0x{}", hex::encode(addr.as_bytes())),
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        );
    }
}
