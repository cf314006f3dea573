//! Lookup of compiled contracts in a Hardhat artifacts directory.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Result;
use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::errors::UpgradeError;

/// Marker Solidity leaves in bytecode for libraries that still need linking.
const LINK_PLACEHOLDER: &str = "__$";

/// Compiled output of a single contract.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    /// Creation code, empty for abstract contracts and interfaces.
    pub bytecode: Bytes,
    /// Runtime code as it ends up on chain.
    pub deployed_bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    source_name: String,
    abi: Abi,
    bytecode: String,
    deployed_bytecode: String,
}

pub trait ArtifactResolver {
    /// Resolves `name`, either a bare contract name or
    /// `path/to/Source.sol:Contract`.
    fn resolve(&self, name: &str) -> Result<ContractArtifact>;
}

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn find(&self, name: &str) -> Result<PathBuf> {
        if let Some((source, contract)) = name.split_once(':') {
            let path = self.root.join(source).join(format!("{}.json", contract));
            if path.is_file() {
                return Ok(path);
            }
            return Err(UpgradeError::ArtifactNotFound(name.to_string()).into());
        }

        let file_name = format!("{}.json", name);
        let mut matches = Vec::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != "build-info")
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("skipping unreadable artifact entry: {}", err);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry.file_name().to_str() == Some(file_name.as_str())
            {
                matches.push(entry.into_path());
            }
        }

        match matches.len() {
            0 => Err(UpgradeError::ArtifactNotFound(name.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => Err(UpgradeError::AmbiguousArtifact(name.to_string(), matches).into()),
        }
    }
}

impl ArtifactResolver for ArtifactStore {
    fn resolve(&self, name: &str) -> Result<ContractArtifact> {
        let path = self.find(name)?;
        log::info!("loading artifact {}", path.display());
        read_artifact(&path)
    }
}

fn read_artifact(path: &Path) -> Result<ContractArtifact> {
    let parse_err = |s: String| UpgradeError::ArtifactParse(path.to_path_buf(), s);

    let content = fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
    let artifact: HardhatArtifact =
        serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;

    Ok(ContractArtifact {
        bytecode: parse_bytecode(&artifact.bytecode).map_err(parse_err)?,
        deployed_bytecode: parse_bytecode(&artifact.deployed_bytecode).map_err(parse_err)?,
        contract_name: artifact.contract_name,
        source_name: artifact.source_name,
        abi: artifact.abi,
    })
}

fn parse_bytecode(code: &str) -> std::result::Result<Bytes, String> {
    if code.contains(LINK_PLACEHOLDER) {
        return Err("bytecode contains unlinked libraries".to_string());
    }
    Bytes::from_str(code).map_err(|e| e.to_string())
}
