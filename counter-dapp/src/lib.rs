// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A client for an on-chain counter contract, driven through an injected wallet.
//!
//! The [`shell::ApplicationShell`] owns the session: it obtains a wallet from a
//! [`client::WalletProvider`], binds the counter contract through it, and dispatches the
//! `increment` and `setNumber` actions. Frontends draw the [`view::View`] it renders.

pub mod client;
pub mod common;
pub mod config;
#[cfg(with_ethereum)]
pub mod ethereum;
pub mod shell;
pub mod tracing;
pub mod view;

/// Helper types for tests.
#[cfg(with_testing)]
pub mod test_utils;

pub use crate::{
    config::DappConfig,
    shell::{ApplicationShell, DispatchOutcome, ShellError, SkipReason, UiState},
};
