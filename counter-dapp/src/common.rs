// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

use alloy_primitives::{hex, TxHash, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while obtaining a wallet handle from the injected provider.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The provider refused the connection request.
    #[error("connection request rejected: {0}")]
    Rejected(String),

    /// The configured signing key could not be parsed.
    #[error(transparent)]
    #[cfg(with_ethereum)]
    InvalidKey(#[from] alloy_signer_local::LocalSignerError),

    /// RPC error
    #[error(transparent)]
    #[cfg(with_ethereum)]
    RpcError(#[from] alloy::transports::TransportError),

    /// URL parsing error
    #[error(transparent)]
    #[cfg(with_ethereum)]
    UrlParseError(#[from] url::ParseError),
}

/// Errors raised by a bound counter contract.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The text given for `setNumber` is not an unsigned 256-bit integer.
    #[error("{0:?} is not a valid uint256")]
    InvalidNumber(String),

    /// The wallet refused to sign, or the node refused to broadcast.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was included but its execution reverted.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// The node could not answer a call.
    #[error("call failed: {0}")]
    CallFailed(String),

    /// Contract binding error
    #[error(transparent)]
    #[cfg(with_ethereum)]
    Contract(#[from] alloy::contract::Error),

    /// Pending transaction error
    #[error(transparent)]
    #[cfg(with_ethereum)]
    PendingTransaction(#[from] alloy::providers::PendingTransactionError),

    /// RPC error
    #[error(transparent)]
    #[cfg(with_ethereum)]
    RpcError(#[from] alloy::transports::TransportError),
}

/// Parses user input into the argument of `setNumber`.
///
/// Decimal and `0x`-prefixed hexadecimal are accepted. Surrounding whitespace is ignored.
pub fn parse_number(input: &str) -> Result<U256, ContractError> {
    let digits = input.trim();
    if digits.is_empty() {
        return Err(ContractError::InvalidNumber(input.to_string()));
    }
    U256::from_str(digits).map_err(|_| ContractError::InvalidNumber(input.to_string()))
}

/// The two state-changing calls of the counter contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Increment,
    SetNumber,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Increment => write!(f, "Increment"),
            TransactionKind::SetNumber => write!(f, "Set Number"),
        }
    }
}

/// A confirmed transaction, as kept in the session history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub hash: TxHash,
    /// The argument of `setNumber`. Always `None` for increments.
    pub value: Option<U256>,
    /// The text the argument was parsed from, as typed by the user.
    pub input: Option<String>,
}

impl TransactionRecord {
    pub fn increment(hash: TxHash) -> Self {
        Self {
            kind: TransactionKind::Increment,
            hash,
            value: None,
            input: None,
        }
    }

    pub fn set_number(hash: TxHash, value: U256, input: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::SetNumber,
            hash,
            value: Some(value),
            input: Some(input.into()),
        }
    }

    /// The `0x`-prefixed hexadecimal form of the transaction hash.
    pub fn hash_hex(&self) -> String {
        hex::encode_prefixed(self.hash)
    }
}
