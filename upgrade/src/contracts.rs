use ethers::contract::abigen;

abigen!(
    ProxyAdmin,
    r#"[
        function upgrade(address proxy, address implementation) external
    ]"#,
);

abigen!(
    UpgradeableProxy,
    r#"[
        function upgradeTo(address newImplementation) external
    ]"#,
);
