// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use alloy_primitives::Address;
use counter_dapp::{
    config::DEFAULT_CONTRACT_ADDRESS,
    ethereum::EthereumWalletProvider,
    tracing::{LogConfig, LogFormat, SpanEvents},
    DappConfig,
};

#[derive(clap::Parser)]
#[command(
    name = "counter-dapp",
    version = clap::crate_version!(),
    about = "Reads and updates an on-chain counter through a wallet",
)]
pub struct DappOptions {
    /// The JSON-RPC endpoint of the Ethereum node.
    #[arg(long, env = "COUNTER_DAPP_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// The hex-encoded key signing transactions. Without it, no wallet is available.
    #[arg(long, env = "COUNTER_DAPP_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// The address of the counter contract.
    #[arg(long, env = "COUNTER_DAPP_CONTRACT", default_value_t = DEFAULT_CONTRACT_ADDRESS)]
    pub contract_address: Address,

    /// The layout of log events: `plain`, `json` or `pretty`.
    #[arg(long, env = "RUST_LOG_FORMAT", default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Comma-separated span events to log, among `new`, `enter`, `exit`, `close`, `active`
    /// and `full`.
    #[arg(long, env = "RUST_LOG_SPAN_EVENTS")]
    pub log_span_events: Option<SpanEvents>,

    /// A directory where logs are also written, to `counter-dapp.log`.
    #[arg(long, env = "COUNTER_DAPP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl DappOptions {
    pub fn config(&self) -> DappConfig {
        DappConfig::default().with_contract_address(self.contract_address)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            span_events: self.log_span_events.clone().unwrap_or_default(),
            directory: self.log_dir.clone(),
        }
    }

    /// The injected wallet, if a signing key has been configured.
    pub fn wallet_provider(&self) -> Option<EthereumWalletProvider> {
        let private_key = self.private_key.as_ref()?;
        Some(EthereumWalletProvider::new(&self.rpc_url, private_key))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use counter_dapp::tracing::LogFormat;

    use super::DappOptions;

    #[test]
    fn test_malformed_key_still_offers_a_wallet() {
        let options = DappOptions::try_parse_from([
            "counter-dapp",
            "--rpc-url",
            "not a url",
            "--private-key",
            "0x1234",
        ])
        .unwrap();
        let provider = options.wallet_provider().unwrap();
        assert_eq!(provider.url(), "not a url");
        assert!(provider.signer().is_err());
    }

    #[test]
    fn test_log_options() {
        let options = DappOptions::try_parse_from([
            "counter-dapp",
            "--log-format",
            "json",
            "--log-dir",
            "/var/log/counter",
        ])
        .unwrap();
        let config = options.log_config();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(
            config.log_file_path("counter-dapp").unwrap().to_str(),
            Some("/var/log/counter/counter-dapp.log")
        );

        assert!(DappOptions::try_parse_from(["counter-dapp", "--log-format", "yaml"]).is_err());
    }
}
