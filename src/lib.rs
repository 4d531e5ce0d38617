pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod funds;
pub mod io;
pub mod market;
pub mod report;
pub mod yahoo;

pub use dashboard::{Dashboard, DashboardPage, RenderSettings};
pub use error::{Error, Result};
pub use funds::{Fund, Selection};
pub use market::MarketData;
