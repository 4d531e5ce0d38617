use polars::prelude::*;
use std::fmt::{self, Write as FmtWrite};
use crate::funds::Fund;
use crate::market::{FundMetrics, Metric, NewsItem};
use crate::Result;

pub const PAGE_TITLE: &str = "📊 S&P 500 Sector ETF Dashboard";
pub const COMPARISON_HEADING: &str = "📈 Sector ETF Comparison";
pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_NEWS_MESSAGE: &str = "No news found for this ETF.";

/// Two-column metric comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    pub headers: [String; 2],
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub values: [String; 2],
}

impl ComparisonTable {
    /// Build the table; fields the provider left out show as N/A
    pub fn new(first: (&Fund, &FundMetrics), second: (&Fund, &FundMetrics)) -> Self {
        let rows = Metric::ALL
            .iter()
            .map(|metric| ComparisonRow {
                label: metric.label(),
                values: [
                    metric.format(first.1).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    metric.format(second.1).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ],
            })
            .collect();

        ComparisonTable {
            headers: [first.0.label(), second.0.label()],
            rows,
        }
    }

    pub fn row_labels(&self) -> Vec<&'static str> {
        self.rows.iter().map(|row| row.label).collect()
    }

    pub fn cell(&self, row: &str, column: usize) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == row)
            .and_then(|r| r.values.get(column))
            .map(String::as_str)
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..2)
            .map(|col| {
                self.rows
                    .iter()
                    .map(|r| r.values[col].chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        // Header
        write!(f, "{:<label_width$}", "")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(f, " | {:>width$}", header, width = *width)?;
        }
        writeln!(f)?;

        write!(f, "{}", "-".repeat(label_width))?;
        for width in &widths {
            write!(f, "-+-{}", "-".repeat(*width))?;
        }
        writeln!(f)?;

        // Metric rows
        for row in &self.rows {
            write!(f, "{:<label_width$}", row.label)?;
            for (value, width) in row.values.iter().zip(&widths) {
                write!(f, " | {:>width$}", value, width = *width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Headlines for the primary fund
#[derive(Debug, Clone, PartialEq)]
pub struct NewsFeed {
    pub heading: String,
    pub items: Vec<NewsItem>,
}

impl NewsFeed {
    pub fn new(fund: &Fund, items: Vec<NewsItem>) -> Self {
        NewsFeed {
            heading: format!("📰 {} News Feed", fund.label()),
            items,
        }
    }

    /// Body of the feed without its heading
    pub fn body(&self) -> String {
        if self.items.is_empty() {
            return NO_NEWS_MESSAGE.to_string();
        }

        let mut body = String::new();
        for item in &self.items {
            writeln!(body, "- [{}]({})", item.title, item.link).unwrap();
        }
        body.trim_end().to_string()
    }
}

impl fmt::Display for NewsFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        writeln!(f)?;
        writeln!(f, "{}", self.body())
    }
}

/// Generate a DataFrame summary report
pub fn generate_dataframe_summary(df: &DataFrame) -> Result<String> {
    let mut summary = String::new();

    writeln!(summary, "DataFrame Summary:").unwrap();
    writeln!(summary, "  Shape: {:?}", df.shape()).unwrap();
    writeln!(summary, "  Columns: {:?}", df.get_column_names()).unwrap();
    writeln!(summary).unwrap();

    writeln!(summary, "First 5 rows:").unwrap();
    writeln!(summary, "{}", df.head(Some(5))).unwrap();

    Ok(summary)
}
