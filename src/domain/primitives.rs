//! Domain primitives: Symbol, Action.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Asset or currency symbol (e.g., "BTC", "CAD"), always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Symbol(symbol.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol::new(value)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade action: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    /// The other side of the trade.
    pub fn opposite(&self) -> Action {
        match self {
            Action::Buy => Action::Sell,
            Action::Sell => Action::Buy,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid action: {0}")]
pub struct ActionParseError(pub String);

impl FromStr for Action {
    type Err = ActionParseError;

    /// Case-insensitive; anything other than buy/sell is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_is_uppercased() {
        assert_eq!(Symbol::new(" btc ").as_str(), "BTC");
        assert_eq!(Symbol::from("eth"), Symbol::new("ETH"));
    }

    #[test]
    fn test_symbol_serde_normalizes() {
        let sym: Symbol = serde_json::from_str("\"cad\"").unwrap();
        assert_eq!(sym.as_str(), "CAD");
        assert_eq!(serde_json::to_string(&sym).unwrap(), "\"CAD\"");
    }

    #[test]
    fn test_action_opposite() {
        assert_eq!(Action::Buy.opposite(), Action::Sell);
        assert_eq!(Action::Sell.opposite(), Action::Buy);
    }

    #[test]
    fn test_action_parse_case_insensitive() {
        assert_eq!("BUY".parse::<Action>().unwrap(), Action::Buy);
        assert_eq!("Sell".parse::<Action>().unwrap(), Action::Sell);
        assert!("transfer".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&Action::Sell).unwrap(), "\"sell\"");
    }
}
