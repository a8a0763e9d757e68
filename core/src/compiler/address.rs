//! Compile-time decoding of NEO address literals.
//!
//! An address is the base58 encoding of 25 bytes: the version byte `0x17`,
//! the 20-byte script hash and the first four bytes of the double SHA-256 of
//! the preceding 21 bytes.

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const ADDRESS_VERSION: u8 = 0x17;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base58 character {0:?}")]
    InvalidCharacter(char),
    #[error("expected 25 decoded bytes, got {0}")]
    InvalidLength(usize),
    #[error("unexpected version byte 0x{0:02x}")]
    InvalidVersion(u8),
    #[error("checksum mismatch")]
    ChecksumMismatch,
}

/// Decode `address` to its 20-byte script hash, in the order it is encoded.
pub fn decode_address(address: &str) -> Result<[u8; 20], AddressError> {
    let data = base58_decode(address)?;
    if data.len() != 25 {
        return Err(AddressError::InvalidLength(data.len()));
    }
    let (payload, checksum) = data.split_at(21);
    if checksum != &double_sha256(payload)[..4] {
        return Err(AddressError::ChecksumMismatch);
    }
    if payload[0] != ADDRESS_VERSION {
        return Err(AddressError::InvalidVersion(payload[0]));
    }
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

fn base58_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    // Big-endian magnitude, grown as digits are folded in.
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len());
    for c in input.chars() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(AddressError::InvalidCharacter(c))? as u32;

        let mut carry = digit;
        for byte in bytes.iter_mut().rev() {
            carry += *byte as u32 * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    // Each leading '1' stands for a leading zero byte.
    let zeros = input.chars().take_while(|&c| c == '1').count();
    let mut out = vec![0u8; zeros];
    out.extend(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_address() {
        let hash = decode_address("AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y").unwrap();
        assert_eq!(
            hash,
            [
                0x23, 0xba, 0x27, 0x03, 0xc5, 0x32, 0x63, 0xe8, 0xd6, 0xe5, 0x22, 0xdc, 0x32, 0x20,
                0x33, 0x39, 0xdc, 0xd8, 0xee, 0xe9
            ]
        );
    }

    #[test]
    fn test_decode_sequential_hash() {
        let hash = decode_address("AFsCjUGzicZmXQtWpwVt6fQTZyaVe7bfEk").unwrap();
        let expected: Vec<u8> = (1..=20).collect();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_rejects_bad_checksum() {
        assert_eq!(
            decode_address("AFsCjUGzicZmXQtWpwVt6fQTZyaVe7bfEa"),
            Err(AddressError::ChecksumMismatch)
        );
    }

    #[test]
    fn test_rejects_other_versions() {
        assert_eq!(
            decode_address("NL1JGjDe22U44R57ZXVSeRa4T7Jo1HDLF4"),
            Err(AddressError::InvalidVersion(0x35))
        );
    }

    #[test]
    fn test_rejects_bad_characters_and_lengths() {
        assert_eq!(
            decode_address("AK2nJJpJr6o664CWJKi1QRXjqeic2zRp0y"),
            Err(AddressError::InvalidCharacter('0'))
        );
        assert_eq!(
            decode_address("2R3YGXpUDxuE9th8G4MSxxtjBtxAw"),
            Err(AddressError::InvalidLength(21))
        );
        assert_eq!(decode_address(""), Err(AddressError::InvalidLength(0)));
    }

    #[test]
    fn test_leading_ones_are_zero_bytes() {
        assert_eq!(base58_decode("11").unwrap(), vec![0, 0]);
        assert_eq!(base58_decode("12").unwrap(), vec![0, 1]);
    }
}
