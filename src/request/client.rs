use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::config::CONNECT_TIMEOUT;
use crate::data::Coin;
use crate::error::{Result, ScannerError};
use crate::request::api_path::{ADD_PATH, MIN_MCAP_PARAM, REMOVE_PATH, SCAN_PATH};

/// The three backend endpoints the dashboard consumes.
#[async_trait]
pub trait ScannerApi: Send + Sync {
    async fn scan(&self, min_mcap: f64) -> Result<Vec<Coin>>;
    async fn add(&self, ticker: &str) -> Result<()>;
    async fn remove(&self, ticker: &str) -> Result<()>;
}

#[derive(Serialize)]
struct TickerBody<'a> {
    ticker: &'a str,
}

#[derive(Debug, Clone)]
pub struct ScannerClient {
    http: Client,
    base_url: String,
}

impl ScannerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::Status {
                url: response.url().to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn post_ticker(&self, path: &str, ticker: &str) -> Result<()> {
        let url = self.url(path);
        debug!("POST {} ticker={}", url, ticker);
        let response = self
            .http
            .post(&url)
            .json(&TickerBody { ticker })
            .send()
            .await?;
        // Response body is not part of the contract
        Self::check_status(response).map(|_| ())
    }
}

#[async_trait]
impl ScannerApi for ScannerClient {
    async fn scan(&self, min_mcap: f64) -> Result<Vec<Coin>> {
        let url = self.url(SCAN_PATH);
        debug!("GET {} {}={}", url, MIN_MCAP_PARAM, min_mcap);
        let response = self
            .http
            .get(&url)
            .query(&[(MIN_MCAP_PARAM, min_mcap)])
            .send()
            .await?;
        let body = Self::check_status(response)?.text().await?;
        let coins: Vec<Coin> = serde_json::from_str(&body).inspect_err(|e| {
            warn!("Scan response is not a coin array: {}", e);
        })?;
        Ok(coins)
    }

    async fn add(&self, ticker: &str) -> Result<()> {
        self.post_ticker(ADD_PATH, ticker).await
    }

    async fn remove(&self, ticker: &str) -> Result<()> {
        self.post_ticker(REMOVE_PATH, ticker).await
    }
}
