//! Resolve the artifact, upgrade the proxy, report the address.

use std::io::Write;

use anyhow::Result;
use ethers::utils::to_checksum;

use crate::{
    artifact::ArtifactResolver,
    constants::UPGRADED_LABEL,
    upgrade::{ProxyUpgrader, UpgradedContract},
};

pub struct Runner<R, U> {
    resolver: R,
    upgrader: U,
    contract_name: String,
    proxy_address: String,
}

impl<R: ArtifactResolver, U: ProxyUpgrader> Runner<R, U> {
    pub fn new(resolver: R, upgrader: U, contract_name: &str, proxy_address: &str) -> Self {
        Self {
            resolver,
            upgrader,
            contract_name: contract_name.to_string(),
            proxy_address: proxy_address.to_string(),
        }
    }

    /// Writes the result line to `out` only once the upgrade went through.
    pub async fn run(&self, out: &mut impl Write) -> Result<UpgradedContract> {
        let artifact = self.resolver.resolve(&self.contract_name)?;
        log::debug!("resolved {}:{}", artifact.source_name, artifact.contract_name);
        let contract = self
            .upgrader
            .upgrade_proxy(&self.proxy_address, &artifact)
            .await?;
        log::info!(
            "{} proxy {:?} now points to {:?} ({})",
            self.contract_name,
            contract.address,
            contract.implementation,
            contract.kind
        );

        // checksummed, as ethers.js reports addresses
        writeln!(out, "{} {}", UPGRADED_LABEL, to_checksum(&contract.address, None))?;
        Ok(contract)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;
    use ethers::{
        abi::Abi,
        types::{Bytes, H160},
    };

    use super::*;
    use crate::{
        artifact::ContractArtifact, constants::CONTRACT_NAME, errors::UpgradeError,
        upgrade::ProxyKind, utils::parse_address,
    };

    const PROXY: &str = "0x1234567890123456789012345678901234567890";

    struct FixedArtifacts {
        known: &'static str,
    }

    impl ArtifactResolver for FixedArtifacts {
        fn resolve(&self, name: &str) -> Result<ContractArtifact> {
            if name != self.known {
                return Err(UpgradeError::ArtifactNotFound(name.to_string()).into());
            }
            Ok(ContractArtifact {
                contract_name: name.to_string(),
                source_name: format!("contracts/{}.sol", name),
                abi: serde_json::from_str::<Abi>("[]")?,
                bytecode: Bytes::from(vec![0x60, 0x80]),
                deployed_bytecode: Bytes::from(vec![0x60, 0x80]),
            })
        }
    }

    /// Validates the address like the real upgrader, then succeeds or fails
    /// as configured.
    struct StubUpgrader {
        reject: bool,
        calls: AtomicUsize,
    }

    impl StubUpgrader {
        fn new(reject: bool) -> Self {
            Self {
                reject,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ProxyUpgrader for StubUpgrader {
        async fn upgrade_proxy(
            &self,
            proxy: &str,
            artifact: &ContractArtifact,
        ) -> Result<UpgradedContract> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(artifact.contract_name, CONTRACT_NAME);
            let address = parse_address(proxy)?;
            if self.reject {
                return Err(anyhow!("Ownable: caller is not the owner"));
            }
            Ok(UpgradedContract {
                address,
                implementation: H160::repeat_byte(0x22),
                kind: ProxyKind::Uups,
            })
        }
    }

    #[tokio::test]
    async fn prints_upgraded_address() {
        let runner = Runner::new(
            FixedArtifacts { known: CONTRACT_NAME },
            StubUpgrader::new(false),
            CONTRACT_NAME,
            PROXY,
        );
        let mut out = Vec::new();
        let contract = runner.run(&mut out).await.unwrap();

        assert_eq!(contract.address, parse_address(PROXY).unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "FinanceERC1155 upgraded at:  0x1234567890123456789012345678901234567890\n"
        );
    }

    #[tokio::test]
    async fn missing_artifact_prints_nothing() {
        let runner = Runner::new(
            FixedArtifacts { known: "Other" },
            StubUpgrader::new(false),
            CONTRACT_NAME,
            PROXY,
        );
        let mut out = Vec::new();
        let err = runner.run(&mut out).await.unwrap_err();

        assert_eq!(err.to_string(), "contract artifact not found: FinanceERC1155");
        assert!(out.is_empty());
        assert_eq!(runner.upgrader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_upgrade_prints_nothing() {
        let runner = Runner::new(
            FixedArtifacts { known: CONTRACT_NAME },
            StubUpgrader::new(true),
            CONTRACT_NAME,
            PROXY,
        );
        let mut out = Vec::new();
        let err = runner.run(&mut out).await.unwrap_err();

        assert_eq!(err.to_string(), "Ownable: caller is not the owner");
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn rerun_is_not_guarded() {
        let runner = Runner::new(
            FixedArtifacts { known: CONTRACT_NAME },
            StubUpgrader::new(false),
            CONTRACT_NAME,
            PROXY,
        );
        let mut out = Vec::new();
        runner.run(&mut out).await.unwrap();
        runner.run(&mut out).await.unwrap();

        assert_eq!(runner.upgrader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn empty_placeholder_address_fails() {
        let runner = Runner::new(
            FixedArtifacts { known: CONTRACT_NAME },
            StubUpgrader::new(false),
            CONTRACT_NAME,
            "",
        );
        let mut out = Vec::new();
        let err = runner.run(&mut out).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<UpgradeError>(),
            Some(UpgradeError::InvalidProxyAddress(s)) if s.is_empty()
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn prints_checksummed_address() {
        let runner = Runner::new(
            FixedArtifacts { known: CONTRACT_NAME },
            StubUpgrader::new(false),
            CONTRACT_NAME,
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        );
        let mut out = Vec::new();
        runner.run(&mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "FinanceERC1155 upgraded at:  0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\n"
        );
    }
}
