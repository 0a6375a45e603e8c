// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A wallet provider backed by an Ethereum JSON-RPC node and a local signing key.

use std::fmt;

use alloy::{
    network::{Ethereum, EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    sol,
};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::{
    client::{CounterContract, PendingTransaction, Wallet, WalletProvider},
    common::{ContractError, WalletError},
};

sol! {
    #[sol(rpc)]
    contract Counter {
        function number() external view returns (uint256);
        function setNumber(uint256 newNumber) external;
        function increment() external;
    }
}

/// The node endpoint and the key signing on behalf of the user.
///
/// Both are kept as configured and only parsed when connecting, so a bad value surfaces as
/// a failed connection instead of preventing the wallet from being offered at all.
pub struct EthereumWalletProvider {
    url: String,
    private_key: String,
}

impl EthereumWalletProvider {
    pub fn new(url: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            private_key: private_key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The key transactions are signed with.
    pub fn signer(&self) -> Result<PrivateKeySigner, WalletError> {
        Ok(self.private_key.trim().parse::<PrivateKeySigner>()?)
    }
}

impl fmt::Debug for EthereumWalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthereumWalletProvider")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for EthereumWalletProvider {
    type Wallet = EthereumNodeWallet;

    async fn connect(&self) -> Result<EthereumNodeWallet, WalletError> {
        let url = Url::parse(&self.url)?;
        let signer = self.signer()?;
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url.clone())
            .erased();
        let chain_id = provider.get_chain_id().await?;
        info!(%url, %address, chain_id, "connected to the Ethereum node");
        Ok(EthereumNodeWallet {
            provider,
            address,
            chain_id,
        })
    }
}

/// A signing connection to an Ethereum node.
#[derive(Debug)]
pub struct EthereumNodeWallet {
    provider: DynProvider,
    pub address: Address,
    pub chain_id: u64,
}

#[async_trait]
impl Wallet for EthereumNodeWallet {
    type Contract = EthereumCounter;

    async fn bind_counter(&self, address: Address) -> Result<EthereumCounter, ContractError> {
        let code = self.provider.get_code_at(address).await?;
        if code.is_empty() {
            return Err(ContractError::CallFailed(format!(
                "no contract is deployed at {address}"
            )));
        }
        debug!(%address, code_size = code.len(), "binding the counter contract");
        Ok(EthereumCounter {
            instance: Counter::new(address, self.provider.clone()),
        })
    }
}

/// The counter contract, with transactions signed by the node wallet.
pub struct EthereumCounter {
    instance: Counter::CounterInstance<DynProvider>,
}

impl EthereumCounter {
    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

#[async_trait]
impl CounterContract for EthereumCounter {
    type Pending = EthereumPendingTransaction;

    async fn number(&self) -> Result<U256, ContractError> {
        Ok(self.instance.number().call().await?)
    }

    async fn increment(&self) -> Result<EthereumPendingTransaction, ContractError> {
        let inner = self.instance.increment().send().await?;
        Ok(EthereumPendingTransaction { inner })
    }

    async fn set_number(&self, value: U256) -> Result<EthereumPendingTransaction, ContractError> {
        let inner = self.instance.setNumber(value).send().await?;
        Ok(EthereumPendingTransaction { inner })
    }
}

/// A transaction accepted by the node, waiting to be mined.
pub struct EthereumPendingTransaction {
    inner: PendingTransactionBuilder<Ethereum>,
}

#[async_trait]
impl PendingTransaction for EthereumPendingTransaction {
    fn hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirm(self) -> Result<(), ContractError> {
        let hash = self.hash();
        let receipt = self.inner.get_receipt().await?;
        if !ReceiptResponse::status(&receipt) {
            return Err(ContractError::Reverted(hash));
        }
        debug!(%hash, block_number = ?receipt.block_number(), "transaction mined");
        Ok(())
    }
}
