use std::{fmt, sync::Arc};

use anyhow::Result;
use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::H160,
    utils::hex,
};

use crate::{
    artifact::ContractArtifact,
    constants::{ADMIN_SLOT, BEACON_SLOT, IMPLEMENTATION_SLOT},
    contracts::{ProxyAdmin, UpgradeableProxy},
    errors::UpgradeError,
    utils::{check_receipt, parse_address, read_address_slot, send_transaction, Client},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// Upgrades go through the admin recorded in the ERC-1967 admin slot.
    Transparent { admin: H160 },
    /// Upgrades are authorized by the implementation itself.
    Uups,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Transparent { admin } => write!(f, "transparent (admin {:?})", admin),
            ProxyKind::Uups => write!(f, "uups"),
        }
    }
}

/// Handle to the upgraded contract. `address` is the proxy, which keeps its
/// address and storage across upgrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradedContract {
    pub address: H160,
    pub implementation: H160,
    pub kind: ProxyKind,
}

pub trait ProxyUpgrader {
    async fn upgrade_proxy(
        &self,
        proxy: &str,
        artifact: &ContractArtifact,
    ) -> Result<UpgradedContract>;
}

/// Classifies a proxy from its ERC-1967 slots.
pub fn classify(
    proxy: H160,
    implementation: H160,
    admin: H160,
    beacon: H160,
) -> Result<ProxyKind> {
    if !beacon.is_zero() {
        return Err(UpgradeError::BeaconProxy(proxy, beacon).into());
    }
    if implementation.is_zero() {
        return Err(UpgradeError::NotAProxy(proxy).into());
    }
    if admin.is_zero() {
        Ok(ProxyKind::Uups)
    } else {
        Ok(ProxyKind::Transparent { admin })
    }
}

/// How the upgrade transaction reaches the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeRoute {
    /// `ProxyAdmin.upgrade(proxy, implementation)` on the admin contract.
    ProxyAdmin(H160),
    /// `upgradeTo(implementation)` on the proxy itself.
    Direct,
}

/// Connects to the node only once the request itself is known to be valid.
pub struct RpcUpgrader {
    rpc: String,
    sk: String,
}

impl RpcUpgrader {
    pub fn new(rpc: &str, sk: &str) -> Self {
        Self {
            rpc: rpc.to_string(),
            sk: sk.to_string(),
        }
    }
}

impl ProxyUpgrader for RpcUpgrader {
    async fn upgrade_proxy(
        &self,
        proxy: &str,
        artifact: &ContractArtifact,
    ) -> Result<UpgradedContract> {
        let address = parse_address(proxy)?;
        if artifact.bytecode.is_empty() {
            return Err(UpgradeError::MissingBytecode(artifact.contract_name.clone()).into());
        }

        Upgrade::connect(&self.rpc, &self.sk)
            .await?
            .upgrade(address, artifact)
            .await
    }
}

pub struct Upgrade<M> {
    client: Arc<M>,
}

impl Upgrade<Client> {
    pub async fn connect(rpc: &str, sk: &str) -> Result<Self> {
        let wallet = LocalWallet::from_bytes(&hex::decode(sk.strip_prefix("0x").unwrap_or(sk))?)?;
        let provider = Provider::<Http>::try_from(rpc)?;

        let client = Arc::new(SignerMiddleware::new(
            provider.clone(),
            wallet.with_chain_id(provider.get_chainid().await?.as_u64()),
        ));
        log::info!("signer address:{:?}", client.address());

        Ok(Self::new(client))
    }
}

impl<M: Middleware + 'static> Upgrade<M> {
    pub fn new(client: Arc<M>) -> Self {
        Self { client }
    }

    pub async fn upgrade(
        &self,
        address: H160,
        artifact: &ContractArtifact,
    ) -> Result<UpgradedContract> {
        let (kind, current) = self.inspect(address).await?;
        log::info!("proxy {:?} is {}, implementation {:?}", address, kind, current);

        let implementation = self.prepare_implementation(current, artifact).await?;
        self.point_to(address, kind, implementation).await?;

        Ok(UpgradedContract {
            address,
            implementation,
            kind,
        })
    }

    /// Returns the proxy kind and its current implementation.
    async fn inspect(&self, proxy: H160) -> Result<(ProxyKind, H160)> {
        let implementation = read_address_slot(&*self.client, proxy, IMPLEMENTATION_SLOT).await?;
        let admin = read_address_slot(&*self.client, proxy, ADMIN_SLOT).await?;
        let beacon = read_address_slot(&*self.client, proxy, BEACON_SLOT).await?;

        let kind = classify(proxy, implementation, admin, beacon)?;
        Ok((kind, implementation))
    }

    /// Reuses the current implementation when its runtime code is the
    /// artifact's, otherwise deploys a new one.
    async fn prepare_implementation(
        &self,
        current: H160,
        artifact: &ContractArtifact,
    ) -> Result<H160> {
        let code = self.client.get_code(current, None).await?;
        if !artifact.deployed_bytecode.is_empty() && code == artifact.deployed_bytecode {
            log::info!(
                "implementation {:?} already matches {}, reusing it",
                current,
                artifact.contract_name
            );
            return Ok(current);
        }
        self.deploy_implementation(artifact).await
    }

    async fn deploy_implementation(&self, artifact: &ContractArtifact) -> Result<H160> {
        let (contract, receipt) = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        )
        .deploy(())?
        .legacy()
        .send_with_receipt()
        .await?;
        check_receipt(receipt.transaction_hash, Some(receipt))?;

        log::info!(
            "{} implementation deployed at:{:?}",
            artifact.contract_name,
            contract.address()
        );
        Ok(contract.address())
    }

    /// A transparent proxy whose admin has no code is administered by an
    /// externally owned account, which calls the proxy directly.
    async fn route(&self, kind: ProxyKind) -> Result<UpgradeRoute> {
        match kind {
            ProxyKind::Transparent { admin } => {
                let code = self.client.get_code(admin, None).await?;
                if code.is_empty() {
                    Ok(UpgradeRoute::Direct)
                } else {
                    Ok(UpgradeRoute::ProxyAdmin(admin))
                }
            }
            ProxyKind::Uups => Ok(UpgradeRoute::Direct),
        }
    }

    async fn point_to(&self, proxy: H160, kind: ProxyKind, implementation: H160) -> Result<()> {
        let call = match self.route(kind).await? {
            UpgradeRoute::ProxyAdmin(admin) => {
                log::info!("upgrading {:?} through proxy admin {:?}", proxy, admin);
                ProxyAdmin::new(admin, self.client.clone()).upgrade(proxy, implementation)
            }
            UpgradeRoute::Direct => {
                log::info!("upgrading {:?} directly", proxy);
                UpgradeableProxy::new(proxy, self.client.clone()).upgrade_to(implementation)
            }
        };
        send_transaction(call).await?;
        Ok(())
    }
}
