//! Errors detected by the upgrade tool itself. Provider, signer and contract
//! errors are passed through unchanged.

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    path::PathBuf,
};

use ethers::types::{H160, H256};

#[derive(Debug)]
pub enum UpgradeError {
    /// No compiled artifact exists for the contract name
    ArtifactNotFound(String),
    /// A bare contract name matched more than one artifact
    AmbiguousArtifact(String, Vec<PathBuf>),
    /// An artifact file exists but could not be read as one
    ArtifactParse(PathBuf, String),
    /// The proxy address is empty or malformed
    InvalidProxyAddress(String),
    /// The artifact carries no creation bytecode
    MissingBytecode(String),
    /// No implementation is recorded in the ERC-1967 slot
    NotAProxy(H160),
    /// The address is a beacon proxy
    BeaconProxy(H160, H160),
    /// The transaction was mined but reverted, or never produced a receipt
    UpgradeReverted(H256),
}

impl Display for UpgradeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeError::ArtifactNotFound(name) => {
                write!(f, "contract artifact not found: {}", name)
            }
            UpgradeError::AmbiguousArtifact(name, paths) => {
                write!(f, "multiple artifacts for contract {}:", name)?;
                for path in paths {
                    write!(f, " {}", path.display())?;
                }
                write!(f, "; use the fully qualified name")
            }
            UpgradeError::ArtifactParse(path, s) => {
                write!(f, "error parsing artifact {}: {}", path.display(), s)
            }
            UpgradeError::InvalidProxyAddress(s) if s.is_empty() => {
                write!(f, "proxy address is empty")
            }
            UpgradeError::InvalidProxyAddress(s) => write!(f, "invalid proxy address: {:?}", s),
            UpgradeError::MissingBytecode(name) => write!(
                f,
                "{} has no bytecode; abstract contracts and interfaces cannot be deployed",
                name
            ),
            UpgradeError::NotAProxy(address) => {
                write!(f, "no ERC-1967 implementation found at {:?}", address)
            }
            UpgradeError::BeaconProxy(address, beacon) => write!(
                f,
                "{:?} is a beacon proxy; upgrade its beacon {:?} instead",
                address, beacon
            ),
            UpgradeError::UpgradeReverted(hash) => write!(f, "transaction {:?} reverted", hash),
        }
    }
}

impl Error for UpgradeError {}
