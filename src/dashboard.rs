//! The dashboard controller.
//!
//! Each call to [`Dashboard::render`] is one full render cycle: fetch, then
//! draw charts, comparison table and news feed from whatever the provider
//! returned at that moment. Nothing is kept between cycles.

use std::fmt;

use tracing::{debug, info};

use crate::chart::{self, PriceChart};
use crate::funds::{Fund, Selection, REFERENCE_INDEX, REFERENCE_NAME, TRAILING_PERIOD};
use crate::market::{MarketData, PriceSeries};
use crate::report::{ComparisonTable, NewsFeed, COMPARISON_HEADING, PAGE_TITLE};
use crate::Result;

/// Chart panel dimensions, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub width: u16,
    pub height: u16,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: chart::DEFAULT_WIDTH,
            height: chart::DEFAULT_HEIGHT,
        }
    }
}

/// One-year closes for a fund and the reference index
#[derive(Debug, Clone, PartialEq)]
pub struct PriceComparison {
    pub fund: Fund,
    pub primary: PriceSeries,
    pub reference: PriceSeries,
}

impl PriceComparison {
    pub fn primary_title(&self) -> String {
        format!("{} Closing Price", self.fund.label())
    }

    pub fn reference_title(&self) -> String {
        format!("{} Closing Price", REFERENCE_NAME)
    }

    /// Both charts side by side as text
    pub fn draw(&self, settings: &RenderSettings) -> String {
        let left = PriceChart::new(&self.primary, self.primary_title())
            .legend(self.fund.label())
            .color(chart::TEAL);
        let right = PriceChart::new(&self.reference, self.reference_title())
            .legend(REFERENCE_NAME)
            .color(chart::ORANGE);
        chart::render_side_by_side(left, right, settings.width, settings.height)
    }
}

/// Everything one render cycle produced
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPage {
    pub prices: PriceComparison,
    pub charts: String,
    pub comparison: ComparisonTable,
    pub news: NewsFeed,
}

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", PAGE_TITLE)?;
        writeln!(f)?;
        writeln!(f, "{}", self.charts)?;
        writeln!(f)?;
        writeln!(f, "{}", COMPARISON_HEADING)?;
        writeln!(f)?;
        write!(f, "{}", self.comparison)?;
        writeln!(f)?;
        write!(f, "{}", self.news)
    }
}

pub struct Dashboard<P> {
    provider: P,
    settings: RenderSettings,
}

impl<P: MarketData> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        Self::with_settings(provider, RenderSettings::default())
    }

    pub fn with_settings(provider: P, settings: RenderSettings) -> Self {
        Dashboard { provider, settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Fetch the fund's and the reference index's trailing closes.
    /// An empty answer renders as an empty panel rather than an error.
    pub fn render_price_comparison(&self, fund: &Fund) -> Result<PriceComparison> {
        debug!("Fetching {} history for {} and {}", TRAILING_PERIOD, fund.symbol, REFERENCE_INDEX);
        let primary = self.provider.price_history(fund.symbol, TRAILING_PERIOD)?;
        let reference = self.provider.price_history(REFERENCE_INDEX, TRAILING_PERIOD)?;

        Ok(PriceComparison {
            fund: *fund,
            primary,
            reference,
        })
    }

    /// Metric table for two funds; the same fund twice still yields two columns
    pub fn render_metrics_table(&self, first: &Fund, second: &Fund) -> Result<ComparisonTable> {
        debug!("Fetching metrics for {} and {}", first.symbol, second.symbol);
        let first_metrics = self.provider.metrics(first.symbol)?;
        let second_metrics = self.provider.metrics(second.symbol)?;

        Ok(ComparisonTable::new(
            (first, &first_metrics),
            (second, &second_metrics),
        ))
    }

    pub fn render_news_feed(&self, fund: &Fund) -> Result<NewsFeed> {
        let items = self.provider.news(fund.symbol)?;
        debug!("{} news items for {}", items.len(), fund.symbol);
        Ok(NewsFeed::new(fund, items))
    }

    /// Run a full render cycle for the given selection
    pub fn render(&self, selection: &Selection) -> Result<DashboardPage> {
        info!(
            "Rendering dashboard for {} (compare with {})",
            selection.primary.symbol, selection.secondary.symbol
        );

        let prices = self.render_price_comparison(&selection.primary)?;
        let charts = prices.draw(&self.settings);
        let comparison = self.render_metrics_table(&selection.primary, &selection.secondary)?;
        let news = self.render_news_feed(&selection.primary)?;

        Ok(DashboardPage {
            prices,
            charts,
            comparison,
            news,
        })
    }
}
