// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg(all(feature = "ethereum", not(target_arch = "wasm32")))]

use std::net::TcpListener;

use alloy::{
    network::{EthereumWallet, ReceiptResponse as _},
    node_bindings::{Anvil, AnvilInstance},
    primitives::{hex, Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol,
};
use alloy_signer_local::PrivateKeySigner;
use assert_matches::assert_matches;
use counter_dapp::{
    client::WalletProvider as _,
    common::{ContractError, TransactionKind, WalletError},
    ethereum::EthereumWalletProvider,
    shell::{CONTRACT_INIT_FAILED_MESSAGE, INCREMENT_FAILED_MESSAGE, WALLET_CONNECT_FAILED_MESSAGE},
    ApplicationShell, DappConfig, DispatchOutcome, ShellError, SkipReason,
};

// The first development account of anvil and hardhat.
const DEV_PRIVATE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

// Hand-assembled counters with the `number`/`setNumber`/`increment` interface, keeping
// the value in storage slot 0. The second one reverts on `increment`.
sol! {
    #[sol(rpc, bytecode = "604780600b6000396000f360003560e01c80638381f58a1460285780633fb5c1cb146034578063d09de08a14603c57600080fd5b60005460005260206000f35b600435600055005b60005460010160005500")]
    contract StorageCounter {
        function number() external view returns (uint256);
        function setNumber(uint256 newNumber) external;
        function increment() external;
    }

    #[sol(rpc, bytecode = "604180600b6000396000f360003560e01c80638381f58a1460285780633fb5c1cb146034578063d09de08a14603c57600080fd5b60005460005260206000f35b600435600055005b600080fd")]
    contract StuckCounter {
        function number() external view returns (uint256);
        function setNumber(uint256 newNumber) external;
        function increment() external;
    }
}

fn dev_key(anvil: &AnvilInstance) -> String {
    hex::encode_prefixed(anvil.keys()[0].to_bytes())
}

fn deployer(anvil: &AnvilInstance) -> DynProvider {
    let signer = PrivateKeySigner::from(anvil.keys()[0].clone());
    ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(anvil.endpoint_url())
        .erased()
}

/// Deploys a counter holding `number` and returns a shell bound to it.
async fn counter_shell(
    anvil: &AnvilInstance,
    stuck: bool,
    number: u64,
) -> anyhow::Result<ApplicationShell<EthereumWalletProvider>> {
    let provider = deployer(anvil);
    let address = if stuck {
        let counter = StuckCounter::deploy(provider.clone()).await?;
        counter
            .setNumber(U256::from(number))
            .send()
            .await?
            .get_receipt()
            .await?;
        *counter.address()
    } else {
        let counter = StorageCounter::deploy(provider.clone()).await?;
        counter
            .setNumber(U256::from(number))
            .send()
            .await?
            .get_receipt()
            .await?;
        *counter.address()
    };
    let wallet = EthereumWalletProvider::new(anvil.endpoint(), dev_key(anvil));
    let config = DappConfig::default().with_contract_address(address);
    let shell = ApplicationShell::new(config, Some(wallet));
    shell.initialize().await?;
    Ok(shell)
}

#[test_log::test(tokio::test)]
async fn test_invalid_configuration() {
    let provider = EthereumWalletProvider::new("not a url", DEV_PRIVATE_KEY);
    assert_matches!(provider.connect().await, Err(WalletError::UrlParseError(_)));

    let provider = EthereumWalletProvider::new("http://127.0.0.1:8545", "0x1234");
    assert_matches!(provider.connect().await, Err(WalletError::InvalidKey(_)));

    let provider = EthereumWalletProvider::new("http://127.0.0.1:8545", DEV_PRIVATE_KEY);
    assert_eq!(
        provider.signer().unwrap().address().to_string(),
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
    );
}

#[test_log::test(tokio::test)]
async fn test_malformed_key_fails_connection() {
    let provider = EthereumWalletProvider::new("http://127.0.0.1:8545", "not a key");
    let shell = ApplicationShell::new(DappConfig::default(), Some(provider));

    assert_matches!(
        shell.initialize().await,
        Err(ShellError::WalletConnectFailed(WalletError::InvalidKey(_)))
    );
    assert!(!shell.is_connected());
    assert_eq!(
        shell.state().error.as_deref(),
        Some(WALLET_CONNECT_FAILED_MESSAGE)
    );
    assert_eq!(
        shell.view().error.as_deref(),
        Some(WALLET_CONNECT_FAILED_MESSAGE)
    );
}

#[test_log::test(tokio::test)]
async fn test_unreachable_node() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}");
    let provider = EthereumWalletProvider::new(url, DEV_PRIVATE_KEY);
    let shell = ApplicationShell::new(DappConfig::default(), Some(provider));

    assert_matches!(
        shell.initialize().await,
        Err(ShellError::WalletConnectFailed(WalletError::RpcError(_)))
    );
    assert!(!shell.is_connected());
    assert_eq!(
        shell.state().error.as_deref(),
        Some(WALLET_CONNECT_FAILED_MESSAGE)
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires the anvil binary"]
async fn test_anvil_connect() -> anyhow::Result<()> {
    let anvil = Anvil::new().try_spawn()?;
    let provider = EthereumWalletProvider::new(anvil.endpoint(), dev_key(&anvil));

    let wallet = provider.connect().await?;
    assert_eq!(wallet.chain_id, anvil.chain_id());
    assert_eq!(wallet.address, anvil.addresses()[0]);
    Ok(())
}

#[test_log::test(tokio::test)]
#[ignore = "requires the anvil binary"]
async fn test_anvil_missing_contract() -> anyhow::Result<()> {
    let anvil = Anvil::new().try_spawn()?;
    let provider = EthereumWalletProvider::new(anvil.endpoint(), dev_key(&anvil));
    let config = DappConfig::default().with_contract_address(Address::repeat_byte(0x42));
    let shell = ApplicationShell::new(config, Some(provider));

    assert_matches!(
        shell.initialize().await,
        Err(ShellError::ContractInitFailed(ContractError::CallFailed(_)))
    );
    assert!(shell.is_connected());
    assert!(!shell.is_ready());
    assert_eq!(
        shell.state().error.as_deref(),
        Some(CONTRACT_INIT_FAILED_MESSAGE)
    );
    assert_matches!(
        shell.increment().await,
        DispatchOutcome::Skipped(SkipReason::NotReady)
    );
    Ok(())
}

#[test_log::test(tokio::test)]
#[ignore = "requires the anvil binary"]
async fn test_anvil_increment_and_set_number() -> anyhow::Result<()> {
    let anvil = Anvil::new().try_spawn()?;
    let shell = counter_shell(&anvil, false, 5).await?;
    assert_eq!(shell.state().counter, U256::from(5));

    let increment = assert_matches!(
        shell.increment().await,
        DispatchOutcome::Completed(record) => record
    );
    assert_eq!(increment.kind, TransactionKind::Increment);
    assert_eq!(shell.state().counter, U256::from(6));

    assert!(shell.set_input("42"));
    let set_number = assert_matches!(
        shell.set_number().await,
        DispatchOutcome::Completed(record) => record
    );
    assert_eq!(set_number.value, Some(U256::from(42)));

    let state = shell.state();
    assert_eq!(state.counter, U256::from(42));
    assert_eq!(state.input, "");
    assert_eq!(state.error, None);
    assert_eq!(state.history, vec![set_number.clone(), increment.clone()]);

    let provider = deployer(&anvil);
    for record in [&increment, &set_number] {
        let receipt = provider.get_transaction_receipt(record.hash).await?;
        assert!(receipt.is_some_and(|receipt| receipt.status()));
    }
    Ok(())
}

#[test_log::test(tokio::test)]
#[ignore = "requires the anvil binary"]
async fn test_anvil_reverted_increment() -> anyhow::Result<()> {
    let anvil = Anvil::new().try_spawn()?;
    let shell = counter_shell(&anvil, true, 5).await?;

    assert_matches!(shell.increment().await, DispatchOutcome::Failed(error) => {
        assert_eq!(error.user_message(), INCREMENT_FAILED_MESSAGE);
    });
    let state = shell.state();
    assert_eq!(state.error.as_deref(), Some(INCREMENT_FAILED_MESSAGE));
    assert_eq!(state.counter, U256::from(5));
    assert!(state.history.is_empty());
    assert!(!state.loading);

    // Writes other than `increment` still go through.
    assert!(shell.set_input("7"));
    assert!(shell.set_number().await.is_completed());
    assert_eq!(shell.state().counter, U256::from(7));
    assert_eq!(shell.state().history.len(), 1);
    Ok(())
}
