//! ERC-20 calldata encoding.

use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;

/// Encode a `transfer(address,uint256)` call.
pub fn encode_transfer(recipient: Address, amount: U256) -> Bytes {
    let selector = id("transfer(address,uint256)");
    let args = abi::encode(&[Token::Address(recipient), Token::Uint(amount)]);

    let mut data = Vec::with_capacity(4 + args.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&args);
    Bytes::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Address {
        "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_transfer_selector() {
        let data = encode_transfer(recipient(), U256::from(1u64));
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_transfer_layout() {
        let data = encode_transfer(recipient(), U256::from(10_000_000u64));
        // selector + two 32-byte words
        assert_eq!(data.len(), 68);

        // Address is right-aligned in the first word
        assert_eq!(&data[16..36], recipient().as_bytes());

        // Amount is right-aligned in the second word
        let amount = U256::from_big_endian(&data[36..68]);
        assert_eq!(amount, U256::from(10_000_000u64));
    }
}
