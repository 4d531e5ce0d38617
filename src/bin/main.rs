use anyhow::Context;
use sector_dashboard::config::Config;
use sector_dashboard::yahoo::YahooClient;
use sector_dashboard::{chart, cli, funds, io, report, Dashboard, RenderSettings, Selection};
use tracing::{debug, info};

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let mut args = cli::parse_args();

    // Config values fill whatever the command line left unset
    let config = match &args.config {
        Some(path) => Some(
            Config::from_file(path).with_context(|| format!("Failed to load config file {}", path))?,
        ),
        None => Config::load_default().context("Failed to load config file")?,
    };
    if let Some(config) = &config {
        config.merge_with_cli(&mut args);
    }

    init_logging(args.verbose);
    debug!("Sector dashboard starting...");

    if args.list {
        for fund in funds::SECTOR_FUNDS.iter() {
            println!("{:<5} {}", fund.symbol, fund.name);
        }
        return Ok(());
    }

    let selection = Selection::from_symbols(args.etf.as_deref(), args.compare.as_deref())
        .context("Invalid fund selection")?;

    // Refuse existing outputs before spending time on the network
    for path in [&args.output, &args.prices_output].into_iter().flatten() {
        io::check_overwrite(path, args.force).with_context(|| format!("Cannot write to {}", path))?;
    }

    let mut provider_settings = config
        .as_ref()
        .map(Config::provider_settings)
        .unwrap_or_default();
    if let Some(count) = args.news_count {
        provider_settings.news_count = count;
    }

    let render_settings = RenderSettings {
        width: args.width.unwrap_or(chart::DEFAULT_WIDTH),
        height: args.height.unwrap_or(chart::DEFAULT_HEIGHT),
    };

    info!("Using market data from {}", provider_settings.base_url);
    let client = YahooClient::new(provider_settings).context("Failed to create market data client")?;
    let dashboard = Dashboard::with_settings(client, render_settings);

    let page = dashboard
        .render(&selection)
        .context("Failed to render dashboard")?;
    print!("{}", page);

    if let Some(output_path) = &args.output {
        io::export_comparison(&page.comparison, output_path, args.force)
            .with_context(|| format!("Failed to write comparison table to {}", output_path))?;
        eprintln!("Comparison table saved to: {}", output_path);
    }

    if let Some(prices_path) = &args.prices_output {
        let df = io::export_prices(
            &[&page.prices.primary, &page.prices.reference],
            prices_path,
            args.force,
        )
        .with_context(|| format!("Failed to write price history to {}", prices_path))?;
        debug!("{}", report::generate_dataframe_summary(&df)?);
        eprintln!("Price history saved to: {}", prices_path);
    }

    debug!("Sector dashboard finished.");

    Ok(())
}
