use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::SourceError;
use crate::types::{CardBrief, CardDetails, SetBrief, SetDetails};

pub const DEFAULT_BASE_URL: &str = "https://api.tcgdex.net/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read operations of a remote card-catalog API.
///
/// Detail lookups are per language; callers ask once per language they need.
pub trait CardCatalogApi: Send + Sync {
    /// Minimal id and name for every card.
    fn list_cards(
        &self,
        language: &str,
    ) -> impl Future<Output = Result<Vec<CardBrief>, SourceError>> + Send;

    fn list_sets(
        &self,
        language: &str,
    ) -> impl Future<Output = Result<Vec<SetBrief>, SourceError>> + Send;

    fn card(
        &self,
        id: &str,
        language: &str,
    ) -> impl Future<Output = Result<CardDetails, SourceError>> + Send;

    fn set(
        &self,
        id: &str,
        language: &str,
    ) -> impl Future<Output = Result<SetDetails, SourceError>> + Send;
}

/// HTTP client for the TCGdex v2 REST API.
pub struct TcgdexClient {
    http: reqwest::Client,
    base_url: String,
}

impl TcgdexClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("tcg-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, language: &str, path: &str) -> String {
        format!("{}v2/{}/{}", self.base_url, language, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, SourceError> {
        log::debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound { url });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl CardCatalogApi for TcgdexClient {
    async fn list_cards(&self, language: &str) -> Result<Vec<CardBrief>, SourceError> {
        self.get_json(self.url(language, "cards/")).await
    }

    async fn list_sets(&self, language: &str) -> Result<Vec<SetBrief>, SourceError> {
        self.get_json(self.url(language, "sets/")).await
    }

    async fn card(&self, id: &str, language: &str) -> Result<CardDetails, SourceError> {
        self.get_json(self.url(language, &format!("cards/{id}"))).await
    }

    async fn set(&self, id: &str, language: &str) -> Result<SetDetails, SourceError> {
        self.get_json(self.url(language, &format!("sets/{id}"))).await
    }
}
