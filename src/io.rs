use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use crate::market::PriceSeries;
use crate::report::ComparisonTable;
use crate::Result;

/// Refuse to clobber an existing file unless forced.
/// Called before any fetch so a refused output path costs no network time.
pub fn check_overwrite<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
    let path = path.as_ref();
    if path.exists() && !force {
        return Err(crate::Error::Other(format!(
            "Output file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    Ok(())
}

/// Stack price series into one DataFrame with columns: symbol, date, close
pub fn prices_to_dataframe(series: &[&PriceSeries]) -> Result<DataFrame> {
    let mut symbols: Vec<&str> = Vec::new();
    let mut dates: Vec<String> = Vec::new();
    let mut closes: Vec<f64> = Vec::new();

    for s in series {
        for point in &s.points {
            symbols.push(s.symbol.as_str());
            dates.push(point.date.format("%Y-%m-%d").to_string());
            closes.push(point.close);
        }
    }

    let df = df! {
        "symbol" => symbols,
        "date" => dates,
        "close" => closes
    }?;

    Ok(df)
}

/// Save DataFrame to CSV file
pub fn save_csv<P: AsRef<Path>>(df: &DataFrame, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .finish(&mut df.clone())?;

    Ok(())
}

/// Save DataFrame to Parquet file
pub fn save_parquet<P: AsRef<Path>>(df: &DataFrame, path: P) -> Result<()> {
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .finish(&mut df.clone())?;

    Ok(())
}

/// Write price history; the ".parquet" extension selects Parquet, anything else CSV
pub fn export_prices<P: AsRef<Path>>(series: &[&PriceSeries], path: P, force: bool) -> Result<DataFrame> {
    let path = path.as_ref();
    check_overwrite(path, force)?;

    let df = prices_to_dataframe(series)?;
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        save_parquet(&df, path)?;
    } else {
        save_csv(&df, path)?;
    }

    Ok(df)
}

/// Write the comparison table as CSV. Headers may repeat when both columns are the same fund.
pub fn export_comparison<P: AsRef<Path>>(table: &ComparisonTable, path: P, force: bool) -> Result<()> {
    let path = path.as_ref();
    check_overwrite(path, force)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Metric", table.headers[0].as_str(), table.headers[1].as_str()])?;
    for row in &table.rows {
        writer.write_record([row.label, row.values[0].as_str(), row.values[1].as_str()])?;
    }
    writer.flush()?;

    Ok(())
}
