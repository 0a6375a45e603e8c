// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// The address the counter contract is deployed at.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("c6f4d2c263f36daccf73f6bf112b62249c015895");

/// The heading shown above the counter.
pub const DEFAULT_TITLE: &str = "Pump Fun";

/// Static settings of an application shell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappConfig {
    pub title: String,
    pub contract_address: Address,
}

impl Default for DappConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS,
        }
    }
}

impl DappConfig {
    pub fn with_contract_address(mut self, contract_address: Address) -> Self {
        self.contract_address = contract_address;
        self
    }
}
