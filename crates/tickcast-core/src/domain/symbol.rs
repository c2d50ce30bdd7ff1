use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_ROOT_LEN: usize = 12;
const MAX_EXCHANGE_LEN: usize = 4;

/// Upper-cased ticker with an optional exchange suffix (`INFY.NS`, `CIPLA.BO`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol {
    text: String,
    root_len: usize,
}

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let text = input.trim().to_ascii_uppercase();
        let (root, exchange) = match text.split_once('.') {
            Some((root, exchange)) => (root, Some(exchange)),
            None => (text.as_str(), None),
        };

        check_part(root, MAX_ROOT_LEN, 0, |ch| {
            ch.is_ascii_alphanumeric() || ch == '-' || ch == '&'
        })?;
        if !root.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidSymbol {
                value: text.clone(),
                reason: "ticker must start with a letter",
            });
        }
        if let Some(exchange) = exchange {
            check_part(exchange, MAX_EXCHANGE_LEN, root.len() + 1, |ch| {
                ch.is_ascii_alphabetic()
            })?;
        }

        let root_len = root.len();
        Ok(Self { text, root_len })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Ticker without its exchange suffix (`INFY.NS` -> `INFY`).
    pub fn root(&self) -> &str {
        &self.text[..self.root_len]
    }

    pub fn exchange(&self) -> Option<&str> {
        self.text.get(self.root_len + 1..)
    }
}

fn check_part(
    part: &str,
    max_len: usize,
    offset: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), ValidationError> {
    if part.is_empty() || part.len() > max_len {
        return Err(ValidationError::InvalidSymbol {
            value: part.to_owned(),
            reason: if part.is_empty() {
                "ticker and exchange parts cannot be empty"
            } else {
                "ticker or exchange part is too long"
            },
        });
    }
    match part.char_indices().find(|(_, ch)| !allowed(*ch)) {
        Some((index, ch)) => Err(ValidationError::SymbolInvalidChar {
            ch,
            index: offset + index,
        }),
        None => Ok(()),
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nse_suffix() {
        let infy = Symbol::parse(" infy.ns ").expect("valid ticker");
        assert_eq!(infy.as_str(), "INFY.NS");
        assert_eq!(infy.root(), "INFY");
        assert_eq!(infy.exchange(), Some("NS"));

        let bare = Symbol::parse("M&M").expect("valid ticker");
        assert_eq!(bare.root(), "M&M");
        assert_eq!(bare.exchange(), None);
    }

    #[test]
    fn rejects_malformed_tickers() {
        for raw in ["", "   ", "1INFY.NS", "TCS.", ".NS", "INFY.NSEXCH", "TCS.N1"] {
            assert!(Symbol::parse(raw).is_err(), "{raw:?} should be rejected");
        }
        assert_eq!(
            Symbol::parse("CIP$LA.NS").expect_err("invalid char"),
            ValidationError::SymbolInvalidChar { ch: '$', index: 3 }
        );
    }

    #[test]
    fn deserializes_through_parse() {
        let symbol: Symbol = serde_json::from_str("\"tcs.ns\"").expect("valid");
        assert_eq!(symbol.as_str(), "TCS.NS");
        assert!(serde_json::from_str::<Symbol>("\"9TCS\"").is_err());
    }
}
