/*
 * Nox Fluence Peer
 *
 * Copyright (C) 2024 Fluence DAO
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation version 3 of the
 * License.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use alloy_primitives::U256;
use thiserror::Error;

pub use hex::FromHexError;

#[derive(Debug, Error, PartialEq)]
#[error("invalid hex quantity '{0}'")]
pub struct InvalidQuantity(pub String);

/// Decode hex string, with or without "0x" prefix
pub fn decode_hex(h: &str) -> Result<Vec<u8>, FromHexError> {
    let h = h.trim_start_matches("0x");
    hex::decode(h)
}

pub fn encode_hex_0x(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse JSON-RPC quantity, i.e. "0x1a". Bare "0x" is treated as zero.
pub fn parse_quantity(q: &str) -> Result<U256, InvalidQuantity> {
    let digits = q.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|_| InvalidQuantity(q.to_string()))
}

pub fn parse_quantity_u64(q: &str) -> Result<u64, InvalidQuantity> {
    let value = parse_quantity(q)?;
    u64::try_from(value).map_err(|_| InvalidQuantity(q.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_with_and_without_prefix() {
        assert_eq!(decode_hex("0x0a0b").unwrap(), vec![10, 11]);
        assert_eq!(decode_hex("0a0b").unwrap(), vec![10, 11]);
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    fn encode_is_prefixed_lowercase() {
        assert_eq!(encode_hex_0x([0xAB, 0x01]), "0xab01");
        assert_eq!(encode_hex_0x([]), "0x");
    }

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity("0x1a").unwrap(), U256::from(26));
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity_u64("0xa2").unwrap(), 162);
        assert_eq!(
            parse_quantity("0xnope"),
            Err(InvalidQuantity("0xnope".to_string()))
        );
    }
}
