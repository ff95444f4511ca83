use crate::config::AppConfig;
use crate::model::ScraperError;

use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Result of asking the catalog for one page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Page(String),
    /// The catalog answered "not found": there are no more pages.
    EndOfCatalog,
}

pub trait Fetcher {
    fn fetch_page(&self, page: u32) -> Result<PageOutcome, ScraperError>;
}

pub struct HttpFetcher {
    client: Client,
    url_template: String,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::with_builder(client_builder(config), config)
    }

    fn with_builder(builder: ClientBuilder, config: &AppConfig) -> Result<Self, ScraperError> {
        let client = builder
            .build()
            .map_err(|e| ScraperError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url_template: config.base_url_template.clone(),
        })
    }

    fn build_url(&self, page: u32) -> String {
        self.url_template.replacen("{}", &page.to_string(), 1)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_page(&self, page: u32) -> Result<PageOutcome, ScraperError> {
        if page == 0 {
            return Err(ScraperError::InvalidPage(page));
        }

        let url = self.build_url(page);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().map_err(transport_error)?;

        if is_end_of_catalog(response.status())? {
            return Ok(PageOutcome::EndOfCatalog);
        }

        response.text().map(PageOutcome::Page).map_err(transport_error)
    }
}

fn client_builder(config: &AppConfig) -> ClientBuilder {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_seconds))
}

/// 404 ends pagination; any other non-2xx status is a failure.
fn is_end_of_catalog(status: StatusCode) -> Result<bool, ScraperError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(true);
    }
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus(status.as_u16()));
    }
    Ok(false)
}

fn transport_error(e: reqwest::Error) -> ScraperError {
    if e.is_timeout() {
        ScraperError::Timeout
    } else {
        ScraperError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves a single connection: reads the request head, writes `response`
    /// (if any), then keeps the socket open for `hold` before closing it.
    /// Returns a catalog URL template pointing at the server.
    fn serve_once(response: &'static str, hold: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            if !response.is_empty() {
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
            thread::sleep(hold);
        });

        format!("http://{}/catalogue/page-{{}}.html", addr)
    }

    fn local_fetcher(url_template: String, timeout_seconds: u64) -> HttpFetcher {
        let config = AppConfig {
            base_url_template: url_template,
            request_timeout_seconds: timeout_seconds,
            ..AppConfig::default()
        };
        HttpFetcher::with_builder(client_builder(&config).no_proxy(), &config).unwrap()
    }

    #[test]
    fn ok_response_returns_the_page_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
            Duration::ZERO,
        );

        let outcome = local_fetcher(url, 5).fetch_page(1).unwrap();
        assert_eq!(outcome, PageOutcome::Page("<html></html>".to_string()));
    }

    #[test]
    fn not_found_response_ends_the_catalog() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::ZERO,
        );

        let outcome = local_fetcher(url, 5).fetch_page(51).unwrap();
        assert_eq!(outcome, PageOutcome::EndOfCatalog);
    }

    #[test]
    fn server_error_response_is_an_unexpected_status() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::ZERO,
        );

        let result = local_fetcher(url, 5).fetch_page(2);
        assert!(matches!(result, Err(ScraperError::UnexpectedStatus(500))));
    }

    #[test]
    fn silent_server_times_out() {
        let url = serve_once("", Duration::from_secs(5));

        let result = local_fetcher(url, 1).fetch_page(2);
        assert!(matches!(result, Err(ScraperError::Timeout)), "{:?}", result);
    }

    #[test]
    fn truncated_body_is_a_transport_failure() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n<html>",
            Duration::ZERO,
        );

        let result = local_fetcher(url, 5).fetch_page(1);
        assert!(matches!(result, Err(ScraperError::Http(_))), "{:?}", result);
    }

    #[test]
    fn not_found_is_the_end_marker() {
        assert!(is_end_of_catalog(StatusCode::NOT_FOUND).unwrap());
        assert!(!is_end_of_catalog(StatusCode::OK).unwrap());
    }

    #[test]
    fn other_error_statuses_fail() {
        assert!(matches!(
            is_end_of_catalog(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ScraperError::UnexpectedStatus(500))
        ));
        assert!(matches!(
            is_end_of_catalog(StatusCode::FORBIDDEN),
            Err(ScraperError::UnexpectedStatus(403))
        ));
    }

    #[test]
    fn page_zero_is_rejected_before_any_request() {
        let fetcher = HttpFetcher::new(&AppConfig::default()).unwrap();
        assert!(matches!(
            fetcher.fetch_page(0),
            Err(ScraperError::InvalidPage(0))
        ));
    }

    #[test]
    fn url_uses_the_configured_template() {
        let config = AppConfig {
            base_url_template: "http://localhost:8080/catalogue/page-{}.html".into(),
            ..AppConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(
            fetcher.build_url(12),
            "http://localhost:8080/catalogue/page-12.html"
        );
    }
}
