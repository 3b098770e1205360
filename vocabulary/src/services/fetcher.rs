//! Remote vocabulary fetcher
//!
//! Issues the single GET the server contract defines and folds every
//! transport outcome into a [`ResponseVocabulary`]. Only a 200 body that
//! cannot be parsed is reported as an error.

use crate::config::{
    AUTH_SEED, CONNECT_TIMEOUT, DEFAULT_SERVER_HOST, LAST_UPDATED_PARAM, READ_TIMEOUT,
    RESOURCE_PATH,
};
use crate::database::ResponseVocabulary;
use crate::error::{ParseError, Result};
use crate::services::parser;
use crate::services::settings::Settings;
use async_trait::async_trait;
use md5::{Digest, Md5};
use reqwest::header::AUTHORIZATION;
use reqwest::Url;

/// Anything that can produce a server response for a given `last_updated`
#[async_trait]
pub trait VocabularySource: Send + Sync {
    async fn fetch(&self, last_updated: &str) -> std::result::Result<ResponseVocabulary, ParseError>;
}

/// Lowercase hex MD5 of the seed, sent verbatim as the `Authorization` header
pub fn authorization_token(seed: &str) -> String {
    format!("{:x}", Md5::digest(seed.as_bytes()))
}

/// Full resource URL for a host such as `10.0.2.2:8080` or `https://example.org`
pub fn resource_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');

    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host, RESOURCE_PATH)
    } else {
        format!("http://{}{}", host, RESOURCE_PATH)
    }
}

/// HTTP implementation of [`VocabularySource`]
#[derive(Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl RemoteFetcher {
    pub fn new(host: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vocabulary/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CONNECT_TIMEOUT + READ_TIMEOUT)
            .build()?;

        let url = resource_url(host);
        tracing::debug!("Remote fetcher base url: {}", url);

        Ok(Self {
            client,
            url,
            authorization: authorization_token(AUTH_SEED),
        })
    }

    /// Fetcher for the host selected by the settings override, then the
    /// configured host, then the built-in default.
    pub fn for_settings(settings: &Settings, configured_host: Option<&str>) -> Result<Self> {
        let host = settings
            .server_override()
            .or(configured_host)
            .unwrap_or(DEFAULT_SERVER_HOST);

        Self::new(host)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl VocabularySource for RemoteFetcher {
    async fn fetch(&self, last_updated: &str) -> std::result::Result<ResponseVocabulary, ParseError> {
        let url = match Url::parse(&self.url) {
            Ok(url) if url.host_str().is_some() => url,
            _ => {
                tracing::warn!("Invalid server url: {}", self.url);
                return Ok(ResponseVocabulary::internal_error(format!(
                    "{} is not a valid host name.",
                    self.url
                )));
            }
        };

        tracing::info!("Fetching vocabularies: url={} last_updated={}", url, last_updated);

        let response = match self
            .client
            .get(url)
            .query(&[(LAST_UPDATED_PARAM, last_updated)])
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to reach vocabulary server: {}", e);
                return Ok(ResponseVocabulary::internal_error(e.to_string()));
            }
        };

        let status = response.status();
        if status.as_u16() != 200 {
            tracing::warn!("Vocabulary server returned status: {}", status);
            return Ok(ResponseVocabulary::status(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read vocabulary response body: {}", e);
                return Ok(ResponseVocabulary::internal_error(e.to_string()));
            }
        };

        if body.trim().is_empty() {
            tracing::info!("Vocabulary server returned an empty body");
            return Ok(ResponseVocabulary::empty());
        }

        let (value, snapshot, recently_added_count) = parser::parse_body(&body)?;

        Ok(ResponseVocabulary::ok(value, snapshot, recently_added_count))
    }
}
