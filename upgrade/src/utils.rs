use std::str::FromStr;

use anyhow::Result;
use ethers::{
    contract::ContractCall,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::LocalWallet,
    types::{TransactionReceipt, H160, H256, U64},
    utils::to_checksum,
};

use crate::errors::UpgradeError;

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Parses a proxy address. Mixed-case input must carry a valid EIP-55
/// checksum.
pub fn parse_address(address: &str) -> Result<H160> {
    let invalid = || UpgradeError::InvalidProxyAddress(address.to_string());

    let digits = address.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 {
        return Err(invalid().into());
    }
    let parsed = H160::from_str(digits).map_err(|_| invalid())?;

    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case && to_checksum(&parsed, None) != address {
        return Err(invalid().into());
    }
    Ok(parsed)
}

/// Addresses are stored right-aligned in a 32-byte slot.
pub fn address_from_slot(value: H256) -> H160 {
    H160::from_slice(&value.as_bytes()[12..])
}

pub async fn read_address_slot<M: Middleware + 'static>(
    client: &M,
    address: H160,
    slot: H256,
) -> Result<H160> {
    let value = client.get_storage_at(address, slot, None).await?;
    log::debug!("slot {:?} of {:?}: {:?}", slot, address, value);
    Ok(address_from_slot(value))
}

pub async fn send_transaction<M: Middleware + 'static>(
    call: ContractCall<M, ()>,
) -> Result<TransactionReceipt> {
    let call = call.legacy();
    let pending = call.send().await?;
    let transaction_hash = pending.tx_hash();
    log::info!("transaction hash:{:?}", transaction_hash);

    let receipt = pending.await?;
    check_receipt(transaction_hash, receipt)
}

pub fn check_receipt(
    transaction_hash: H256,
    receipt: Option<TransactionReceipt>,
) -> Result<TransactionReceipt> {
    match receipt {
        Some(receipt) if receipt.status != Some(U64::zero()) => Ok(receipt),
        _ => Err(UpgradeError::UpgradeReverted(transaction_hash).into()),
    }
}
