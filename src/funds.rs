use std::fmt;
use crate::{Error, Result};

/// A sector exchange-traded fund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fund {
    pub symbol: &'static str,
    pub name: &'static str,
}

impl Fund {
    /// Display label used for chart titles and table headers, e.g. "Energy (XLE)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }

    /// Look up a fund by ticker symbol (case-insensitive)
    pub fn from_symbol(symbol: &str) -> Result<Fund> {
        let wanted = symbol.trim();
        SECTOR_FUNDS
            .iter()
            .find(|fund| fund.symbol.eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| Error::UnknownFund(wanted.to_string()))
    }
}

impl fmt::Display for Fund {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

/// SPDR S&P 500 sector funds, in sidebar order
pub const SECTOR_FUNDS: [Fund; 11] = [
    Fund { symbol: "XLC", name: "Communication Services" },
    Fund { symbol: "XLY", name: "Consumer Discretionary" },
    Fund { symbol: "XLP", name: "Consumer Staples" },
    Fund { symbol: "XLE", name: "Energy" },
    Fund { symbol: "XLF", name: "Financials" },
    Fund { symbol: "XLV", name: "Health Care" },
    Fund { symbol: "XLI", name: "Industrials" },
    Fund { symbol: "XLK", name: "Information Technology" },
    Fund { symbol: "XLB", name: "Materials" },
    Fund { symbol: "XLRE", name: "Real Estate" },
    Fund { symbol: "XLU", name: "Utilities" },
];

/// Broad-market benchmark shown next to every fund
pub const REFERENCE_INDEX: &str = "^GSPC";
pub const REFERENCE_NAME: &str = "S&P 500";

/// Trailing window for price history
pub const TRAILING_PERIOD: &str = "1y";

/// All fund symbols in sidebar order
pub fn symbols() -> Vec<&'static str> {
    SECTOR_FUNDS.iter().map(|fund| fund.symbol).collect()
}

/// The user's choices for one render cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub primary: Fund,
    pub secondary: Fund,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            primary: SECTOR_FUNDS[0],
            secondary: SECTOR_FUNDS[0],
        }
    }
}

impl Selection {
    pub fn new(primary: Fund, secondary: Fund) -> Self {
        Selection { primary, secondary }
    }

    /// Resolve optional symbols; a missing choice falls back to the first fund
    pub fn from_symbols(primary: Option<&str>, secondary: Option<&str>) -> Result<Self> {
        let default = Selection::default();
        let primary = match primary {
            Some(symbol) => Fund::from_symbol(symbol)?,
            None => default.primary,
        };
        let secondary = match secondary {
            Some(symbol) => Fund::from_symbol(symbol)?,
            None => default.secondary,
        };
        Ok(Selection { primary, secondary })
    }
}
