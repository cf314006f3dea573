//! Fixed values of the upgrade.

use ethers::types::H256;

/// Name of the contract whose implementation is replaced.
pub const CONTRACT_NAME: &str = "FinanceERC1155";

/// Address of the deployed proxy. Fill in before running.
pub const PROXY_ADDRESS: &str = "";

/// Label printed in front of the upgraded address.
pub const UPGRADED_LABEL: &str = "FinanceERC1155 upgraded at: ";

pub const DEFAULT_RPC: &str = "http://127.0.0.1:8545";

/// First account of the Hardhat and Anvil development mnemonics.
pub const DEFAULT_SK: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const DEFAULT_ARTIFACTS: &str = "artifacts";

/// `bytes32(uint256(keccak256("eip1967.proxy.implementation")) - 1)`
pub const IMPLEMENTATION_SLOT: H256 = H256([
    0x36, 0x08, 0x94, 0xa1, 0x3b, 0xa1, 0xa3, 0x21, 0x06, 0x67, 0xc8, 0x28, 0x49, 0x2d, 0xb9, 0x8d,
    0xca, 0x3e, 0x20, 0x76, 0xcc, 0x37, 0x35, 0xa9, 0x20, 0xa3, 0xca, 0x50, 0x5d, 0x38, 0x2b, 0xbc,
]);

/// `bytes32(uint256(keccak256("eip1967.proxy.admin")) - 1)`
pub const ADMIN_SLOT: H256 = H256([
    0xb5, 0x31, 0x27, 0x68, 0x4a, 0x56, 0x8b, 0x31, 0x73, 0xae, 0x13, 0xb9, 0xf8, 0xa6, 0x01, 0x6e,
    0x24, 0x3e, 0x63, 0xb6, 0xe8, 0xee, 0x11, 0x78, 0xd6, 0xa7, 0x17, 0x85, 0x0b, 0x5d, 0x61, 0x03,
]);

/// `bytes32(uint256(keccak256("eip1967.proxy.beacon")) - 1)`
pub const BEACON_SLOT: H256 = H256([
    0xa3, 0xf0, 0xad, 0x74, 0xe5, 0x42, 0x3a, 0xeb, 0xfd, 0x80, 0xd3, 0xef, 0x43, 0x46, 0x57, 0x83,
    0x35, 0xa9, 0xa7, 0x2a, 0xea, 0xee, 0x59, 0xff, 0x6c, 0xb3, 0x58, 0x2b, 0x35, 0x13, 0x3d, 0x50,
]);

#[cfg(test)]
mod tests {
    use ethers::{types::U256, utils::keccak256};

    use super::*;

    fn eip1967_slot(label: &str) -> H256 {
        let slot = U256::from_big_endian(&keccak256(label)) - U256::one();
        let mut bytes = [0u8; 32];
        slot.to_big_endian(&mut bytes);
        H256(bytes)
    }

    #[test]
    fn slots_match_eip1967() {
        assert_eq!(IMPLEMENTATION_SLOT, eip1967_slot("eip1967.proxy.implementation"));
        assert_eq!(ADMIN_SLOT, eip1967_slot("eip1967.proxy.admin"));
        assert_eq!(BEACON_SLOT, eip1967_slot("eip1967.proxy.beacon"));
    }
}
