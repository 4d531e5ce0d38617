use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Sector ETF to chart and read news for (e.g. XLE); defaults to XLC
    #[arg(short = 'e', long)]
    pub etf: Option<String>,

    /// Second sector ETF for the metric comparison table; defaults to XLC
    #[arg(short = 'c', long)]
    pub compare: Option<String>,

    /// List the available sector ETFs and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Also write the comparison table to this CSV file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also write both one-year price series (CSV, or Parquet for .parquet)
    #[arg(long)]
    pub prices_output: Option<String>,

    /// Total width of the chart panel in columns
    #[arg(long)]
    pub width: Option<u16>,

    /// Height of the chart panel in rows
    #[arg(long)]
    pub height: Option<u16>,

    /// Number of news headlines to request
    #[arg(long)]
    pub news_count: Option<u32>,

    /// Configuration file (TOML); otherwise the default locations are searched
    #[arg(long)]
    pub config: Option<String>,

    /// Force overwrite of existing output files
    #[arg(long)]
    pub force: bool,

    /// Verbose mode (debug logging on stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
