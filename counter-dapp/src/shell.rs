// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The application shell: connects the injected wallet, binds the counter contract, and runs
//! the user actions against it.
//!
//! Every action follows the same lifecycle: acquire the operation slot, submit, wait for
//! confirmation, read the counter back, and record the transaction. A failure in any phase
//! is reported through [`UiState::error`] and leaves the counter and history untouched.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use alloy_primitives::{TxHash, U256};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    client::{CounterContract, PendingTransaction, Wallet, WalletProvider},
    common::{parse_number, ContractError, TransactionKind, TransactionRecord, WalletError},
    config::DappConfig,
    view::{self, View},
};

#[cfg(test)]
#[path = "unit_tests/shell_tests.rs"]
mod tests;

pub const WALLET_UNAVAILABLE_MESSAGE: &str = "wallet not available, please install it";
pub const WALLET_CONNECT_FAILED_MESSAGE: &str = "failed to connect, please retry";
pub const CONTRACT_INIT_FAILED_MESSAGE: &str = "failed to initialize contract";
pub const INCREMENT_FAILED_MESSAGE: &str = "failed to increment, please retry";
pub const SET_NUMBER_FAILED_MESSAGE: &str = "failed to set number, please retry";

/// Everything that can go wrong in a session.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no wallet provider has been injected")]
    WalletUnavailable,

    #[error("failed to connect to the wallet: {0}")]
    WalletConnectFailed(#[source] WalletError),

    #[error("failed to initialize the counter contract: {0}")]
    ContractInitFailed(#[source] ContractError),

    #[error("failed to submit the {kind} transaction: {source}")]
    Submission {
        kind: TransactionKind,
        source: ContractError,
    },

    #[error("{kind} transaction {hash} was not confirmed: {source}")]
    Confirmation {
        kind: TransactionKind,
        hash: TxHash,
        source: ContractError,
    },

    #[error("failed to read the counter after the {kind} transaction: {source}")]
    Read {
        kind: TransactionKind,
        source: ContractError,
    },
}

impl ShellError {
    /// The static message shown to the user for this category of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ShellError::WalletUnavailable => WALLET_UNAVAILABLE_MESSAGE,
            ShellError::WalletConnectFailed(_) => WALLET_CONNECT_FAILED_MESSAGE,
            ShellError::ContractInitFailed(_) => CONTRACT_INIT_FAILED_MESSAGE,
            ShellError::Submission { kind, .. }
            | ShellError::Confirmation { kind, .. }
            | ShellError::Read { kind, .. } => match kind {
                TransactionKind::Increment => INCREMENT_FAILED_MESSAGE,
                TransactionKind::SetNumber => SET_NUMBER_FAILED_MESSAGE,
            },
        }
    }
}

/// The state the view is rendered from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    /// The last value read from the contract.
    pub counter: U256,
    /// The text of the `setNumber` input.
    pub input: String,
    pub error: Option<String>,
    /// Whether an action is in flight. Both action triggers are disabled while set.
    pub loading: bool,
    /// Confirmed transactions, newest first.
    pub history: Vec<TransactionRecord>,
}

/// Why an action was not started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No contract is bound.
    NotReady,
    /// Another action is in flight.
    Busy,
    /// `setNumber` was requested with an empty input.
    EmptyInput,
}

/// The result of triggering an action.
#[derive(Debug)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    Completed(TransactionRecord),
    Failed(ShellError),
}

impl DispatchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DispatchOutcome::Completed(_))
    }
}

type ContractOf<P> = <<P as WalletProvider>::Wallet as Wallet>::Contract;

struct Session<P: WalletProvider> {
    initialized: bool,
    wallet: Option<Arc<P::Wallet>>,
    contract: Option<Arc<ContractOf<P>>>,
    ui: UiState,
}

/// The single slot for an in-flight action. Releasing it clears the loading flag.
struct OperationToken<'a, P: WalletProvider> {
    session: &'a Mutex<Session<P>>,
}

impl<P: WalletProvider> Drop for OperationToken<'_, P> {
    fn drop(&mut self) {
        lock(self.session).ui.loading = false;
    }
}

/// An action that has acquired the operation slot.
struct Dispatch<'a, P: WalletProvider> {
    token: OperationToken<'a, P>,
    contract: Arc<ContractOf<P>>,
    input: String,
}

/// A wallet-connected view of the counter contract.
///
/// The session lock is never held across an `await`, so the state can be rendered while an
/// action is in flight.
pub struct ApplicationShell<P: WalletProvider> {
    config: DappConfig,
    provider: Option<P>,
    session: Mutex<Session<P>>,
}

impl<P: WalletProvider> ApplicationShell<P> {
    /// Creates a shell. `provider` is `None` when no wallet has been injected.
    pub fn new(config: DappConfig, provider: Option<P>) -> Self {
        Self {
            config,
            provider,
            session: Mutex::new(Session {
                initialized: false,
                wallet: None,
                contract: None,
                ui: UiState::default(),
            }),
        }
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    /// Connects the wallet and binds the contract. Only the first call has any effect.
    #[instrument(level = "debug", skip(self))]
    pub async fn initialize(&self) -> Result<(), ShellError> {
        {
            let mut session = self.session();
            if session.initialized {
                debug!("the shell is already initialized");
                return Ok(());
            }
            session.initialized = true;
        }
        let wallet = match self.connect_wallet().await {
            Ok(wallet) => wallet,
            Err(error) => {
                self.report(&error);
                return Err(error);
            }
        };
        if let Err(error) = self.bind_contract(wallet).await {
            self.report(&error);
            return Err(error);
        }
        Ok(())
    }

    async fn connect_wallet(&self) -> Result<Arc<P::Wallet>, ShellError> {
        let Some(provider) = &self.provider else {
            return Err(ShellError::WalletUnavailable);
        };
        let wallet = provider
            .connect()
            .await
            .map_err(ShellError::WalletConnectFailed)?;
        let wallet = Arc::new(wallet);
        let mut session = self.session();
        session.wallet = Some(wallet.clone());
        session.ui.error = None;
        info!("wallet connected");
        Ok(wallet)
    }

    async fn bind_contract(&self, wallet: Arc<P::Wallet>) -> Result<(), ShellError> {
        let address = self.config.contract_address;
        let contract = wallet
            .bind_counter(address)
            .await
            .map_err(ShellError::ContractInitFailed)?;
        let number = contract
            .number()
            .await
            .map_err(ShellError::ContractInitFailed)?;
        let mut session = self.session();
        session.contract = Some(Arc::new(contract));
        session.ui.counter = number;
        info!(%address, %number, "counter contract bound");
        Ok(())
    }

    /// Submits `increment()` and waits for it to take effect.
    #[instrument(level = "debug", skip(self))]
    pub async fn increment(&self) -> DispatchOutcome {
        let kind = TransactionKind::Increment;
        let dispatch = match self.begin(kind) {
            Ok(dispatch) => dispatch,
            Err(reason) => return DispatchOutcome::Skipped(reason),
        };
        let contract = &*dispatch.contract;
        let result = transact(contract, kind, contract.increment())
            .await
            .map(|(hash, number)| (TransactionRecord::increment(hash), number));
        self.conclude(dispatch.token, result)
    }

    /// Submits `setNumber` with the current input and waits for it to take effect.
    #[instrument(level = "debug", skip(self))]
    pub async fn set_number(&self) -> DispatchOutcome {
        let kind = TransactionKind::SetNumber;
        let dispatch = match self.begin(kind) {
            Ok(dispatch) => dispatch,
            Err(reason) => return DispatchOutcome::Skipped(reason),
        };
        let contract = &*dispatch.contract;
        let result = match parse_number(&dispatch.input) {
            Ok(value) => transact(contract, kind, contract.set_number(value))
                .await
                .map(|(hash, number)| {
                    let record = TransactionRecord::set_number(hash, value, dispatch.input.trim());
                    (record, number)
                }),
            Err(source) => Err(ShellError::Submission { kind, source }),
        };
        self.conclude(dispatch.token, result)
    }

    /// Replaces the input text. Ignored while an action is in flight.
    pub fn set_input(&self, text: impl Into<String>) -> bool {
        let mut session = self.session();
        if session.ui.loading {
            return false;
        }
        session.ui.input = text.into();
        true
    }

    /// Whether a wallet handle has been obtained.
    pub fn is_connected(&self) -> bool {
        self.session().wallet.is_some()
    }

    /// Whether the contract is bound and actions can be dispatched.
    pub fn is_ready(&self) -> bool {
        self.session().contract.is_some()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> UiState {
        self.session().ui.clone()
    }

    /// Renders the current state.
    pub fn view(&self) -> View {
        view::render(&self.config.title, &self.session().ui)
    }

    fn begin(&self, kind: TransactionKind) -> Result<Dispatch<'_, P>, SkipReason> {
        let mut session = self.session();
        let contract = match &session.contract {
            None => Err(SkipReason::NotReady),
            Some(_) if session.ui.loading => Err(SkipReason::Busy),
            Some(_) if kind == TransactionKind::SetNumber && session.ui.input.is_empty() => {
                Err(SkipReason::EmptyInput)
            }
            Some(contract) => Ok(contract.clone()),
        }
        .inspect_err(|reason| debug!(%kind, ?reason, "action skipped"))?;
        session.ui.loading = true;
        session.ui.error = None;
        Ok(Dispatch {
            token: OperationToken {
                session: &self.session,
            },
            contract,
            input: session.ui.input.clone(),
        })
    }

    fn conclude(
        &self,
        token: OperationToken<'_, P>,
        result: Result<(TransactionRecord, U256), ShellError>,
    ) -> DispatchOutcome {
        let outcome = match result {
            Ok((record, number)) => {
                let mut session = self.session();
                session.ui.counter = number;
                if record.kind == TransactionKind::SetNumber {
                    session.ui.input.clear();
                }
                session.ui.history.insert(0, record.clone());
                info!(kind = %record.kind, %number, "counter updated");
                DispatchOutcome::Completed(record)
            }
            Err(error) => {
                self.report(&error);
                DispatchOutcome::Failed(error)
            }
        };
        drop(token);
        outcome
    }

    fn report(&self, error: &ShellError) {
        warn!(%error, "{}", error.user_message());
        self.session().ui.error = Some(error.user_message().to_string());
    }

    fn session(&self) -> MutexGuard<'_, Session<P>> {
        lock(&self.session)
    }
}

/// Runs a submitted transaction to completion and reads the counter back.
async fn transact<C, F>(
    contract: &C,
    kind: TransactionKind,
    submission: F,
) -> Result<(TxHash, U256), ShellError>
where
    C: CounterContract + ?Sized,
    F: Future<Output = Result<C::Pending, ContractError>>,
{
    let pending = submission
        .await
        .map_err(|source| ShellError::Submission { kind, source })?;
    let hash = pending.hash();
    info!(%kind, %hash, "transaction accepted");
    pending
        .confirm()
        .await
        .map_err(|source| ShellError::Confirmation { kind, hash, source })?;
    debug!(%hash, "transaction confirmed");
    let number = contract
        .number()
        .await
        .map_err(|source| ShellError::Read { kind, source })?;
    Ok((hash, number))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
