use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::Result;

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closing prices for one symbol, oldest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        PriceSeries {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Lowest and highest close, if any
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut iter = self.points.iter().map(|p| p.close);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c))))
    }
}

/// Descriptive fields for a fund; any of them may be missing upstream
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FundMetrics {
    pub trailing_pe: Option<f64>,
    pub volume: Option<u64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

/// Rows of the comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PeRatio,
    Volume,
    FiftyTwoWeekHigh,
    FiftyTwoWeekLow,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PeRatio,
        Metric::Volume,
        Metric::FiftyTwoWeekHigh,
        Metric::FiftyTwoWeekLow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::PeRatio => "PE Ratio",
            // The provider's daily `volume` field is shown under this heading
            Metric::Volume => "Average Volume",
            Metric::FiftyTwoWeekHigh => "52-Week High",
            Metric::FiftyTwoWeekLow => "52-Week Low",
        }
    }

    /// Formatted value, or None when the provider left the field out
    pub fn format(&self, metrics: &FundMetrics) -> Option<String> {
        match self {
            Metric::PeRatio => metrics.trailing_pe.map(|v| format!("{:.2}", v)),
            Metric::Volume => metrics.volume.map(|v| v.to_string()),
            Metric::FiftyTwoWeekHigh => metrics.fifty_two_week_high.map(|v| format!("{:.2}", v)),
            Metric::FiftyTwoWeekLow => metrics.fifty_two_week_low.map(|v| format!("{:.2}", v)),
        }
    }
}

/// A headline with its link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub publisher: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        NewsItem {
            title: title.into(),
            link: link.into(),
            publisher: None,
            published_at: None,
        }
    }
}

/// Source of prices, metadata and news for a ticker symbol
pub trait MarketData {
    /// Daily closes over a trailing range such as "1y"
    fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries>;

    fn metrics(&self, symbol: &str) -> Result<FundMetrics>;

    fn news(&self, symbol: &str) -> Result<Vec<NewsItem>>;
}

impl<T: MarketData + ?Sized> MarketData for &T {
    fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries> {
        (**self).price_history(symbol, range)
    }

    fn metrics(&self, symbol: &str) -> Result<FundMetrics> {
        (**self).metrics(symbol)
    }

    fn news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        (**self).news(symbol)
    }
}
