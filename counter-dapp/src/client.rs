// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The capabilities the application shell expects from the outside world: an injected
//! wallet provider, the wallet it hands out, and the counter contract bound through it.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::common::{ContractError, WalletError};

/// The wallet capability injected into the page, e.g. by a browser extension.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    type Wallet: Wallet;

    /// Asks the provider for a wallet handle. Called once per session.
    async fn connect(&self) -> Result<Self::Wallet, WalletError>;
}

/// A connected wallet, able to derive a signer for contract handles.
#[async_trait]
pub trait Wallet: Send + Sync {
    type Contract: CounterContract;

    /// Binds the counter interface at `address` to a signer of this wallet.
    async fn bind_counter(&self, address: Address) -> Result<Self::Contract, ContractError>;
}

/// The three-method counter contract.
#[async_trait]
pub trait CounterContract: Send + Sync {
    type Pending: PendingTransaction;

    /// Reads the current value with a non-executive call.
    async fn number(&self) -> Result<U256, ContractError>;

    /// Submits `increment()`. Returns once the transaction has been accepted by the network.
    async fn increment(&self) -> Result<Self::Pending, ContractError>;

    /// Submits `setNumber(value)`. Returns once the transaction has been accepted by the
    /// network.
    async fn set_number(&self, value: U256) -> Result<Self::Pending, ContractError>;
}

/// A transaction accepted by the network but not yet confirmed.
#[async_trait]
pub trait PendingTransaction: Send {
    fn hash(&self) -> TxHash;

    /// Waits until the transaction is part of the canonical chain. Fails if it reverted.
    async fn confirm(self) -> Result<(), ContractError>;
}
