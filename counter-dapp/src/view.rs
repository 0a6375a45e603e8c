// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projection of the shell state into something a frontend can draw.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{common::TransactionRecord, shell::UiState};

const PROCESSING_LABEL: &str = "Processing...";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub text: String,
    pub placeholder: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: String,
    /// The transaction hash with its middle elided.
    pub hash: String,
    pub value: Option<String>,
}

/// Everything that is displayed, derived from a [`UiState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub title: String,
    pub counter: String,
    pub increment: Button,
    pub input: Input,
    pub set_number: Button,
    pub spinner: bool,
    pub error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

pub fn render(title: &str, state: &UiState) -> View {
    let label = |idle: &str| {
        if state.loading {
            PROCESSING_LABEL.to_string()
        } else {
            idle.to_string()
        }
    };
    View {
        title: title.to_string(),
        counter: state.counter.to_string(),
        increment: Button {
            label: label("Increment"),
            enabled: !state.loading,
        },
        input: Input {
            text: state.input.clone(),
            placeholder: "Enter number".to_string(),
            enabled: !state.loading,
        },
        set_number: Button {
            label: label("Set Number"),
            enabled: !state.loading && !state.input.is_empty(),
        },
        spinner: state.loading,
        error: state.error.clone(),
        history: state.history.iter().map(HistoryEntry::from).collect(),
    }
}

impl From<&TransactionRecord> for HistoryEntry {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            kind: record.kind.to_string(),
            hash: short_hash(&record.hash_hex()),
            value: record
                .input
                .clone()
                .or_else(|| record.value.map(|value| value.to_string())),
        }
    }
}

/// Keeps the first 10 and the last 8 characters of a hash.
pub fn short_hash(hash: &str) -> String {
    let chars = hash.chars().collect::<Vec<_>>();
    if chars.len() <= 18 {
        return hash.to_string();
    }
    let head = chars[..10].iter().collect::<String>();
    let tail = chars[chars.len() - 8..].iter().collect::<String>();
    format!("{head}...{tail}")
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "[{}]", self.label)
        } else {
            write!(f, "[{}] (disabled)", self.label)
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "Current Number: {}", self.counter)?;
        writeln!(f, "{}", self.increment)?;
        if self.input.text.is_empty() {
            writeln!(f, "Input: <{}>", self.input.placeholder)?;
        } else {
            writeln!(f, "Input: {}", self.input.text)?;
        }
        writeln!(f, "{}", self.set_number)?;
        if self.spinner {
            writeln!(f, "...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        writeln!(f, "Transaction History")?;
        for entry in &self.history {
            writeln!(f, "  Type: {}", entry.kind)?;
            writeln!(f, "  Hash: {}", entry.hash)?;
            if let Some(value) = &entry.value {
                writeln!(f, "  Value: {value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{TxHash, U256};

    use super::*;

    fn hash(byte: u8) -> TxHash {
        TxHash::repeat_byte(byte)
    }

    #[test]
    fn test_short_hash() {
        let full = format!("0x{}", "ab".repeat(32));
        assert_eq!(short_hash(&full), "0xabababab...abababab");
        assert_eq!(short_hash("0xabc123"), "0xabc123");
    }

    #[test]
    fn test_render_idle() {
        let state = UiState {
            counter: U256::from(5),
            ..UiState::default()
        };
        let view = render("Pump Fun", &state);
        assert_eq!(view.counter, "5");
        assert!(view.increment.enabled);
        assert_eq!(view.increment.label, "Increment");
        assert!(view.input.enabled);
        assert!(!view.set_number.enabled);
        assert!(!view.spinner);
        assert_eq!(view.error, None);
        assert!(view.history.is_empty());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["counter"], "5");
        assert_eq!(json["set_number"]["enabled"], false);
    }

    #[test]
    fn test_render_loading_disables_triggers() {
        let state = UiState {
            input: "42".to_string(),
            loading: true,
            ..UiState::default()
        };
        let view = render("Pump Fun", &state);
        assert!(!view.increment.enabled);
        assert!(!view.set_number.enabled);
        assert!(!view.input.enabled);
        assert!(view.spinner);
        assert_eq!(view.set_number.label, PROCESSING_LABEL);
    }

    #[test]
    fn test_render_history_newest_first() {
        let state = UiState {
            counter: U256::from(42),
            history: vec![
                TransactionRecord::set_number(hash(0xde), U256::from(42), "42"),
                TransactionRecord::increment(hash(0xab)),
            ],
            error: Some("failed to increment, please retry".to_string()),
            ..UiState::default()
        };
        let view = render("Pump Fun", &state);
        assert_eq!(
            view.history,
            vec![
                HistoryEntry {
                    kind: "Set Number".to_string(),
                    hash: "0xdededede...dededede".to_string(),
                    value: Some("42".to_string()),
                },
                HistoryEntry {
                    kind: "Increment".to_string(),
                    hash: "0xabababab...abababab".to_string(),
                    value: None,
                },
            ]
        );
        let text = view.to_string();
        assert!(text.contains("Current Number: 42"));
        assert!(text.contains("Error: failed to increment, please retry"));
        assert!(text.contains("Value: 42"));
    }

    #[test]
    fn test_history_shows_typed_value() {
        let record = TransactionRecord::set_number(hash(0x01), U256::from(42), "0x2a");
        assert_eq!(HistoryEntry::from(&record).value.as_deref(), Some("0x2a"));

        let record = TransactionRecord {
            input: None,
            ..record
        };
        assert_eq!(HistoryEntry::from(&record).value.as_deref(), Some("42"));
    }
}
