//! fetching remote documents
use {
    crate::error::{Result, TcError},
    async_trait::async_trait,
    reqwest::{Client, header},
    std::time::Duration,
    tracing::{debug, info},
    url::Url,
};

/// something that can fetch a document as text
///
/// the http implementation is [`HttpFetcher`]; tests and embedders can supply their own
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// fetch the document at `url`
    ///
    /// # Errors
    ///
    /// returns an error if the request fails or the response isn't a success
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}

/// settings for the http client
#[derive(Clone, Debug)]
pub struct HttpSettings {
    /// the user agent to send
    pub user_agent: String,
    /// overall request timeout
    pub timeout: Duration,
    /// connection timeout
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// fetches documents over http with reqwest
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    /// the http client
    client: Client,
}

impl HttpFetcher {
    /// build a fetcher from the given settings
    ///
    /// # Errors
    ///
    /// returns an error if the http client can't be built
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .default_headers(headers)
            .build()?;

        info!(user_agent = %settings.user_agent, "initialized http client");
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching");
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(TcError::SourceFetch {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
