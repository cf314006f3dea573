use std::io;

use anyhow::Result;
use clap::Parser;

use crate::{
    artifact::ArtifactStore,
    constants::{CONTRACT_NAME, DEFAULT_ARTIFACTS, DEFAULT_RPC, DEFAULT_SK, PROXY_ADDRESS},
    runner::Runner,
    upgrade::RpcUpgrader,
};

/// Upgrades the FinanceERC1155 proxy to the implementation in the local
/// build artifacts.
#[derive(Debug, Parser)]
pub struct CommandLine {
    #[clap(short, long, env = "RPC_URL", default_value = DEFAULT_RPC)]
    rpc: String,

    /// Signer private key, defaults to the first development account
    #[clap(
        long,
        env = "PRIVATE_KEY",
        default_value = DEFAULT_SK,
        hide_default_value = true,
        hide_env_values = true
    )]
    sk: String,

    /// Hardhat artifacts directory
    #[clap(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS)]
    artifacts: String,
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        let runner = Runner::new(
            ArtifactStore::new(&self.artifacts),
            RpcUpgrader::new(&self.rpc, &self.sk),
            CONTRACT_NAME,
            PROXY_ADDRESS,
        );
        runner.run(&mut io::stdout()).await?;
        Ok(())
    }
}
