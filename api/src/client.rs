use crate::cache::{self, ByteCache, CacheError, DirCache};
use crate::{DataSource, Game, StandingsTables, nhl};
use reqwest::blocking::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// nhl.com page client. Every page goes through the byte cache first.
pub struct NhlSource {
    client: Client,
    timeout: Duration,
    cache: Box<dyn ByteCache>,
}

impl Default for NhlSource {
    fn default() -> Self {
        Self::with_cache(Box::new(DirCache::default()))
    }
}

impl fmt::Debug for NhlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NhlSource").field("timeout", &self.timeout).finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(String, String),
    Cache(CacheError),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(msg, url) => write!(f, "Parse error for {url}: {msg}"),
            ApiError::Cache(e) => write!(f, "Cache error: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) => Some(e),
            ApiError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        ApiError::Cache(e)
    }
}

impl NhlSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: Box<dyn ByteCache>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("nhlsked/0.1 (schedule difficulty)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(15),
            cache,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Page body for `url`, from the cache when present.
    pub fn read(&self, url: &str) -> ApiResult<String> {
        let bytes = cache::read_through(self.cache.as_ref(), url, || self.get(url))?;
        String::from_utf8(bytes)
            .map_err(|e| ApiError::Parsing(format!("page is not UTF-8: {e}"), url.to_owned()))
    }

    fn get(&self, url: &str) -> ApiResult<Vec<u8>> {
        log::info!("fetching {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?;

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| ApiError::Network(e, url.to_owned()))
    }
}

impl DataSource for NhlSource {
    fn fetch_schedule_rows(&self, url: &str) -> ApiResult<Vec<Game>> {
        let games = nhl::parse_schedule(&self.read(url)?);
        if games.is_empty() {
            return Err(ApiError::NotFound(format!("no games on schedule page {url}")));
        }
        log::debug!("{} games on {url}", games.len());
        Ok(games)
    }

    fn fetch_standings_tables(&self, url: &str) -> ApiResult<StandingsTables> {
        let tables = nhl::parse_standings(&self.read(url)?);
        if tables.divisions.is_empty() {
            return Err(ApiError::NotFound(format!("no division tables on standings page {url}")));
        }
        log::debug!("{} division tables on {url}", tables.divisions.len());
        Ok(tables)
    }
}
