// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A terminal frontend for the counter contract.

mod options;

use std::process;

use anyhow::Context as _;
use counter_dapp::{client::WalletProvider, ApplicationShell, DispatchOutcome};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, warn, Instrument as _};

use crate::options::DappOptions;

const HELP: &str = "commands: increment | set <number> | input <text> | show | help | quit";

/// A line typed by the user.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Increment,
    SetNumber(String),
    Input(String),
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim().to_string();
        match word {
            "increment" | "inc" => Some(Command::Increment),
            "set" => Some(Command::SetNumber(rest)),
            "input" => Some(Command::Input(rest)),
            "show" | "" => Some(Command::Show),
            "help" => Some(Command::Help),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

async fn run<P: WalletProvider>(shell: ApplicationShell<P>) -> anyhow::Result<()> {
    if let Err(error) = shell.initialize().await {
        warn!("{error}");
    }
    println!("{}", shell.view());
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let Some(command) = Command::parse(&line) else {
            println!("unknown command {line:?}; {HELP}");
            continue;
        };
        debug!(?command, "received command");
        let outcome = match command {
            Command::Increment => Some(shell.increment().await),
            Command::SetNumber(text) => {
                if shell.set_input(text) {
                    Some(shell.set_number().await)
                } else {
                    None
                }
            }
            Command::Input(text) => {
                shell.set_input(text);
                None
            }
            Command::Show => None,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
        };
        if let Some(DispatchOutcome::Skipped(reason)) = outcome {
            println!("nothing to do: {reason:?}");
        }
        println!("{}", shell.view());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = <DappOptions as clap::Parser>::parse();

    counter_dapp::tracing::init("counter-dapp", &options.log_config())
        .context("failed to initialize logging")?;

    let shell = ApplicationShell::new(options.config(), options.wallet_provider());
    let span = tracing::info_span!("counter_dapp::main");

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create the Tokio runtime")?
        .block_on(run(shell).instrument(span));

    if let Err(error) = result {
        tracing::error!("Error is {:?}", error);
        process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("increment"), Some(Command::Increment));
        assert_eq!(
            Command::parse("set  42 "),
            Some(Command::SetNumber("42".to_string()))
        );
        assert_eq!(
            Command::parse("input abc"),
            Some(Command::Input("abc".to_string()))
        );
        assert_eq!(Command::parse(""), Some(Command::Show));
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse("decrement"), None);
    }
}
