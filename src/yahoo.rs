//! Yahoo Finance implementation of [`MarketData`].
//!
//! Three public endpoints are used: the v8 chart API for daily closes, the
//! v10 quote summary for valuation fields (which needs a session crumb), and
//! the v1 search API for news headlines.

use std::cell::RefCell;

use chrono::DateTime;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::market::{FundMetrics, MarketData, NewsItem, PricePoint, PriceSeries};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const DEFAULT_NEWS_COUNT: u32 = 10;

/// Connection settings for the Yahoo endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub cookie_url: String,
    pub user_agent: String,
    pub news_count: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            news_count: DEFAULT_NEWS_COUNT,
        }
    }
}

/// Blocking Yahoo Finance client
pub struct YahooClient {
    settings: ProviderSettings,
    client: Client,
    crumb: RefCell<Option<String>>,
}

impl YahooClient {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            settings,
            client,
            crumb: RefCell::new(None),
        })
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    /// Session crumb for the quote summary endpoint, fetched once per client
    fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.borrow().as_ref() {
            return Ok(crumb.clone());
        }

        debug!("Requesting session cookie from {}", self.settings.cookie_url);
        // The cookie host answers 404 but still sets the session cookie
        self.client.get(&self.settings.cookie_url).send()?;

        let url = format!("{}/v1/test/getcrumb", self.base_url());
        let crumb = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .text()?
            .trim()
            .to_string();

        if crumb.is_empty() || crumb.contains('<') {
            return Err(Error::Provider("Yahoo did not issue a session crumb".to_string()));
        }

        *self.crumb.borrow_mut() = Some(crumb.clone());
        Ok(crumb)
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<(StatusCode, String)> {
        debug!("GET {} {:?}", url, query);
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        let body = response.text()?;
        debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok((status, body))
    }
}

impl MarketData for YahooClient {
    fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url(), encode_symbol(symbol));
        let (status, body) = self.get_text(
            &url,
            &[("range", range.to_string()), ("interval", "1d".to_string())],
        )?;

        match parse_chart(symbol, &body) {
            Ok(series) => Ok(series),
            Err(e) if !status.is_success() => Err(Error::Provider(format!(
                "chart request for {} failed with {}: {}",
                symbol, status, e
            ))),
            Err(e) => Err(e),
        }
    }

    fn metrics(&self, symbol: &str) -> Result<FundMetrics> {
        let crumb = self.crumb()?;
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url(),
            encode_symbol(symbol)
        );
        let (status, body) = self.get_text(
            &url,
            &[("modules", "summaryDetail".to_string()), ("crumb", crumb)],
        )?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Provider(format!(
                "quote summary for {} rejected with {}",
                symbol, status
            )));
        }

        parse_quote_summary(symbol, &body)
    }

    fn news(&self, symbol: &str) -> Result<Vec<NewsItem>> {
        let url = format!("{}/v1/finance/search", self.base_url());
        let (status, body) = self.get_text(
            &url,
            &[
                ("q", symbol.to_string()),
                ("quotesCount", "0".to_string()),
                ("newsCount", self.settings.news_count.to_string()),
            ],
        )?;

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "news search for {} failed with {}",
                symbol, status
            )));
        }

        parse_news(&body)
    }
}

/// Index symbols carry a caret that must be escaped in URL paths
pub fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E")
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl ApiError {
    fn message(&self) -> String {
        match &self.description {
            Some(description) => format!("{}: {}", self.code, description),
            None => self.code.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default, rename = "gmtoffset")]
    gmt_offset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a v8 chart body. A provider-side "no data" answer yields an empty series.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        warn!("No price data for {}: {}", symbol, error.message());
        return Ok(PriceSeries::empty(symbol));
    }

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => {
            warn!("Empty chart result for {}", symbol);
            return Ok(PriceSeries::empty(symbol));
        }
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let offset = result.meta.gmt_offset;
    let points: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PricePoint { date, close })
        })
        .collect();

    debug!("Parsed {} closes for {}", points.len(), symbol);
    Ok(PriceSeries::new(symbol, points))
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(default, rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    volume: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
}

/// Yahoo wraps numbers as {"raw": 1.0, "fmt": "1.00"}, or {} when unknown
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| v.is_finite())
}

/// Parse a v10 quote summary body. Absent fields stay None.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<FundMetrics> {
    let envelope: SummaryEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.quote_summary.error {
        warn!("No summary data for {}: {}", symbol, error.message());
        return Ok(FundMetrics::default());
    }

    let detail = envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.summary_detail);

    let detail = match detail {
        Some(detail) => detail,
        None => {
            warn!("Summary detail missing for {}", symbol);
            return Ok(FundMetrics::default());
        }
    };

    Ok(FundMetrics {
        trailing_pe: raw(detail.trailing_pe),
        volume: raw(detail.volume).filter(|v| *v >= 0.0).map(|v| v.round() as u64),
        fifty_two_week_high: raw(detail.fifty_two_week_high),
        fifty_two_week_low: raw(detail.fifty_two_week_low),
    })
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: Option<String>,
    link: Option<String>,
    publisher: Option<String>,
    provider_publish_time: Option<i64>,
}

/// Parse a v1 search body into headlines; entries without a title or link are skipped
pub fn parse_news(body: &str) -> Result<Vec<NewsItem>> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;

    let items = envelope
        .news
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.filter(|t| !t.trim().is_empty())?;
            let link = entry.link.filter(|l| !l.trim().is_empty())?;
            Some(NewsItem {
                title,
                link,
                publisher: entry.publisher,
                published_at: entry
                    .provider_publish_time
                    .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            })
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{StatusCode as HttpStatus, Uri};
    use axum::Router;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "XLE", "gmtoffset": -14400},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {"quote": [{"close": [84.12, null, 85.5]}]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_encode_symbol() {
        assert_eq!(encode_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(encode_symbol("XLE"), "XLE");
    }

    #[test]
    fn test_parse_chart_drops_null_closes() {
        let series = parse_chart("XLE", CHART_BODY).unwrap();
        assert_eq!(series.symbol, "XLE");
        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].close, 84.12);
        assert_eq!(series.points[1].close, 85.5);
    }

    #[test]
    fn test_parse_chart_uses_exchange_dates() {
        let series = parse_chart("XLE", CHART_BODY).unwrap();
        // 1704205800 is 2024-01-02 14:30 UTC, 09:30 in New York
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.points[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_parse_chart_error_is_empty_series() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let series = parse_chart("XLZ", body).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.symbol, "XLZ");
    }

    #[test]
    fn test_parse_chart_without_timestamps() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart("XLE", body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_chart_rejects_garbage() {
        assert!(matches!(parse_chart("XLE", "<html>"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_quote_summary_full() {
        let body = r#"{"quoteSummary":{"result":[{"summaryDetail":{
            "trailingPE": {"raw": 15.873, "fmt": "15.87"},
            "volume": {"raw": 14523100, "fmt": "14.52M"},
            "fiftyTwoWeekHigh": {"raw": 98.97, "fmt": "98.97"},
            "fiftyTwoWeekLow": {"raw": 78.15, "fmt": "78.15"}
        }}],"error":null}}"#;
        let metrics = parse_quote_summary("XLE", body).unwrap();
        assert_eq!(metrics.trailing_pe, Some(15.873));
        assert_eq!(metrics.volume, Some(14_523_100));
        assert_eq!(metrics.fifty_two_week_high, Some(98.97));
        assert_eq!(metrics.fifty_two_week_low, Some(78.15));
    }

    #[test]
    fn test_parse_quote_summary_missing_fields() {
        let body = r#"{"quoteSummary":{"result":[{"summaryDetail":{
            "trailingPE": {},
            "fiftyTwoWeekHigh": {"raw": 41.2, "fmt": "41.20"}
        }}],"error":null}}"#;
        let metrics = parse_quote_summary("XLRE", body).unwrap();
        assert_eq!(metrics.trailing_pe, None);
        assert_eq!(metrics.volume, None);
        assert_eq!(metrics.fifty_two_week_high, Some(41.2));
        assert_eq!(metrics.fifty_two_week_low, None);
    }

    #[test]
    fn test_parse_quote_summary_error_is_all_missing() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found"}}}"#;
        assert_eq!(parse_quote_summary("XLE", body).unwrap(), FundMetrics::default());
    }

    #[test]
    fn test_parse_news() {
        let body = r#"{"count": 3, "quotes": [], "news": [
            {"uuid": "a", "title": "Energy stocks rally", "publisher": "Reuters",
             "link": "https://example.com/a", "providerPublishTime": 1718000000, "type": "STORY"},
            {"uuid": "b", "title": "No link here"},
            {"uuid": "c", "title": "Oil slips", "link": "https://example.com/c"}
        ]}"#;
        let items = parse_news(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Energy stocks rally");
        assert_eq!(items[0].publisher.as_deref(), Some("Reuters"));
        assert_eq!(items[0].published_at.map(|t| t.timestamp()), Some(1718000000));
        assert_eq!(items[1].link, "https://example.com/c");
        assert_eq!(items[1].published_at, None);
    }

    #[test]
    fn test_parse_news_without_news_key() {
        assert!(parse_news(r#"{"quotes": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_provider_settings_default() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.news_count, 10);
    }

    /// Local HTTP server answering fixed bodies by path, recording every request
    struct CannedServer {
        addr: SocketAddr,
        requests: Arc<Mutex<Vec<String>>>,
    }

    #[derive(Clone)]
    struct Routes {
        responses: Arc<HashMap<String, (u16, String)>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    async fn respond(State(routes): State<Routes>, uri: Uri) -> (HttpStatus, String) {
        routes.requests.lock().unwrap().push(uri.to_string());
        match routes.responses.get(uri.path()) {
            Some((status, body)) => (HttpStatus::from_u16(*status).unwrap(), body.clone()),
            None => (HttpStatus::NOT_FOUND, String::new()),
        }
    }

    impl CannedServer {
        fn start(responses: &[(&str, u16, &str)]) -> Self {
            let routes = Routes {
                responses: Arc::new(
                    responses
                        .iter()
                        .map(|(path, status, body)| (path.to_string(), (*status, body.to_string())))
                        .collect(),
                ),
                requests: Arc::new(Mutex::new(Vec::new())),
            };
            let requests = Arc::clone(&routes.requests);
            let (tx, rx) = mpsc::channel();

            thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                    tx.send(listener.local_addr().unwrap()).unwrap();
                    let app = Router::new().fallback(respond).with_state(routes);
                    axum::serve(listener, app).await.unwrap();
                });
            });

            let addr = rx.recv().unwrap();
            CannedServer { addr, requests }
        }

        fn client(&self) -> YahooClient {
            self.client_with(|_| {})
        }

        fn client_with(&self, adjust: impl FnOnce(&mut ProviderSettings)) -> YahooClient {
            let mut settings = ProviderSettings {
                base_url: format!("http://{}", self.addr),
                cookie_url: format!("http://{}/cookie", self.addr),
                ..ProviderSettings::default()
            };
            adjust(&mut settings);
            YahooClient::new(settings).unwrap()
        }

        fn requests_to(&self, path: &str) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|uri| uri.split('?').next() == Some(path))
                .cloned()
                .collect()
        }
    }

    const CRUMB_PATH: &str = "/v1/test/getcrumb";
    const SUMMARY_BODY: &str = r#"{"quoteSummary":{"result":[{"summaryDetail":{
        "trailingPE": {"raw": 21.4, "fmt": "21.40"}
    }}],"error":null}}"#;

    #[test]
    fn test_reference_symbol_is_escaped_in_chart_path() {
        let server = CannedServer::start(&[("/v8/finance/chart/%5EGSPC", 200, CHART_BODY)]);

        let series = server.client().price_history("^GSPC", "1y").unwrap();

        assert_eq!(series.symbol, "^GSPC");
        assert_eq!(series.len(), 2);
        let requests = server.requests_to("/v8/finance/chart/%5EGSPC");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("range=1y"));
        assert!(requests[0].contains("interval=1d"));
    }

    #[test]
    fn test_chart_failure_with_unreadable_body() {
        let server = CannedServer::start(&[("/v8/finance/chart/XLE", 500, "<html>Internal error</html>")]);

        match server.client().price_history("XLE", "1y") {
            Err(Error::Provider(message)) => {
                assert!(message.contains("500"), "{}", message);
                assert!(message.contains("XLE"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_chart_not_found_body_is_empty_series() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let server = CannedServer::start(&[("/v8/finance/chart/XLZ", 404, body)]);

        let series = server.client().price_history("XLZ", "1y").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_quote_summary_rejected() {
        for status in [401, 403] {
            let server = CannedServer::start(&[
                (CRUMB_PATH, 200, "abc123"),
                ("/v10/finance/quoteSummary/XLE", status, r#"{"finance":{"error":{"code":"Unauthorized"}}}"#),
            ]);

            match server.client().metrics("XLE") {
                Err(Error::Provider(message)) => assert!(message.contains(&status.to_string()), "{}", message),
                other => panic!("expected provider error for {}, got {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_crumb_fetched_once_per_client() {
        let server = CannedServer::start(&[
            (CRUMB_PATH, 200, "abc123\n"),
            ("/v10/finance/quoteSummary/XLE", 200, SUMMARY_BODY),
            ("/v10/finance/quoteSummary/XLU", 200, SUMMARY_BODY),
        ]);
        let client = server.client();

        assert_eq!(client.metrics("XLE").unwrap().trailing_pe, Some(21.4));
        assert_eq!(client.metrics("XLU").unwrap().trailing_pe, Some(21.4));

        assert_eq!(server.requests_to("/cookie").len(), 1);
        assert_eq!(server.requests_to(CRUMB_PATH).len(), 1);
        for path in ["/v10/finance/quoteSummary/XLE", "/v10/finance/quoteSummary/XLU"] {
            let requests = server.requests_to(path);
            assert_eq!(requests.len(), 1);
            assert!(requests[0].contains("modules=summaryDetail"));
            assert!(requests[0].contains("crumb=abc123"));
        }
    }

    #[test]
    fn test_missing_crumb_is_rejected() {
        for crumb in ["", "  ", "<html><body>Too Many Requests</body></html>"] {
            let server = CannedServer::start(&[
                (CRUMB_PATH, 200, crumb),
                ("/v10/finance/quoteSummary/XLE", 200, SUMMARY_BODY),
            ]);

            assert!(matches!(server.client().metrics("XLE"), Err(Error::Provider(_))));
            assert!(server.requests_to("/v10/finance/quoteSummary/XLE").is_empty());
        }
    }

    #[test]
    fn test_news_failure() {
        let server = CannedServer::start(&[("/v1/finance/search", 503, "Service Unavailable")]);

        match server.client().news("XLF") {
            Err(Error::Provider(message)) => assert!(message.contains("503"), "{}", message),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_news_request_uses_configured_count() {
        let body = r#"{"news": [{"title": "Banks rally", "link": "https://example.com/banks"}]}"#;
        let server = CannedServer::start(&[("/v1/finance/search", 200, body)]);

        let items = server
            .client_with(|settings| settings.news_count = 3)
            .news("XLF")
            .unwrap();

        assert_eq!(items.len(), 1);
        let requests = server.requests_to("/v1/finance/search");
        assert!(requests[0].contains("q=XLF"));
        assert!(requests[0].contains("quotesCount=0"));
        assert!(requests[0].contains("newsCount=3"));
    }
}
