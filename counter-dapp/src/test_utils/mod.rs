// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory chain hosting the counter contract, with scriptable failures.

use std::{
    collections::{BTreeSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::{
    client::{CounterContract, PendingTransaction, Wallet, WalletProvider},
    common::{ContractError, WalletError},
};

/// A step of the session that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Connect,
    Bind,
    Read,
    Submit,
    Confirm,
}

#[derive(Default)]
struct ChainState {
    number: U256,
    failures: BTreeSet<Phase>,
    hashes: VecDeque<TxHash>,
    submissions: Vec<Call>,
    next_nonce: u8,
    gate: Option<Arc<Semaphore>>,
}

/// A call submitted to the test chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Increment,
    SetNumber(U256),
}

/// The shared state of the test chain. Cloning gives another handle to the same chain.
#[derive(Clone, Default)]
pub struct TestChain(Arc<Mutex<ChainState>>);

impl TestChain {
    pub fn new(number: u64) -> Self {
        let chain = Self::default();
        chain.state().number = U256::from(number);
        chain
    }

    /// Makes the next attempt at `phase` fail. Later attempts succeed again.
    pub fn fail_next(&self, phase: Phase) {
        self.state().failures.insert(phase);
    }

    /// Sets the hash of the next submitted transaction.
    pub fn push_hash(&self, hash: TxHash) {
        self.state().hashes.push_back(hash);
    }

    /// Holds every submission until a permit is added to the returned semaphore.
    pub fn hold_submissions(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.state().gate = Some(gate.clone());
        gate
    }

    /// Overwrites the on-chain value, as another user would.
    pub fn set_number(&self, number: u64) {
        self.state().number = U256::from(number);
    }

    pub fn number(&self) -> U256 {
        self.state().number
    }

    /// The calls that were accepted, in submission order.
    pub fn submissions(&self) -> Vec<Call> {
        self.state().submissions.clone()
    }

    pub fn provider(&self) -> TestWalletProvider {
        TestWalletProvider(self.clone())
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self, phase: Phase) -> bool {
        self.state().failures.remove(&phase)
    }

    async fn submit(&self, call: Call) -> Result<TestPendingTransaction, ContractError> {
        let gate = self.state().gate.clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|error| ContractError::Rejected(error.to_string()))?
                .forget();
        }
        if self.check(Phase::Submit) {
            return Err(ContractError::Rejected("user denied transaction signature".into()));
        }
        let mut state = self.state();
        state.next_nonce = state.next_nonce.wrapping_add(1);
        let nonce = state.next_nonce;
        let hash = state
            .hashes
            .pop_front()
            .unwrap_or_else(|| TxHash::with_last_byte(nonce));
        state.submissions.push(call);
        Ok(TestPendingTransaction {
            chain: self.clone(),
            hash,
            call,
        })
    }
}

pub struct TestWalletProvider(TestChain);

#[async_trait]
impl WalletProvider for TestWalletProvider {
    type Wallet = TestWallet;

    async fn connect(&self) -> Result<TestWallet, WalletError> {
        if self.0.check(Phase::Connect) {
            return Err(WalletError::Rejected("user rejected the request".into()));
        }
        Ok(TestWallet(self.0.clone()))
    }
}

pub struct TestWallet(TestChain);

#[async_trait]
impl Wallet for TestWallet {
    type Contract = TestCounter;

    async fn bind_counter(&self, address: Address) -> Result<TestCounter, ContractError> {
        if self.0.check(Phase::Bind) {
            return Err(ContractError::CallFailed(format!(
                "no contract is deployed at {address}"
            )));
        }
        Ok(TestCounter(self.0.clone()))
    }
}

pub struct TestCounter(TestChain);

#[async_trait]
impl CounterContract for TestCounter {
    type Pending = TestPendingTransaction;

    async fn number(&self) -> Result<U256, ContractError> {
        if self.0.check(Phase::Read) {
            return Err(ContractError::CallFailed("execution timeout".into()));
        }
        Ok(self.0.number())
    }

    async fn increment(&self) -> Result<TestPendingTransaction, ContractError> {
        self.0.submit(Call::Increment).await
    }

    async fn set_number(&self, value: U256) -> Result<TestPendingTransaction, ContractError> {
        self.0.submit(Call::SetNumber(value)).await
    }
}

pub struct TestPendingTransaction {
    chain: TestChain,
    hash: TxHash,
    call: Call,
}

#[async_trait]
impl PendingTransaction for TestPendingTransaction {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn confirm(self) -> Result<(), ContractError> {
        if self.chain.check(Phase::Confirm) {
            return Err(ContractError::Reverted(self.hash));
        }
        let mut state = self.chain.state();
        state.number = match self.call {
            Call::Increment => state.number + U256::from(1),
            Call::SetNumber(value) => value,
        };
        Ok(())
    }
}
