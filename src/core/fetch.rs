use crate::config::SourceConfig;
use crate::utils::error::{ReportError, Result};
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Picks an index into the user agent pool.
pub type UserAgentSelector = Arc<dyn Fn(&[String]) -> usize + Send + Sync>;

pub fn random_user_agent(pool: &[String]) -> usize {
    if pool.is_empty() {
        return 0;
    }
    rand::thread_rng().gen_range(0..pool.len())
}

pub fn is_consent_url(url: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| !marker.is_empty() && url.contains(marker.as_str()))
}

pub struct Fetcher {
    client: Client,
    config: SourceConfig,
    selector: UserAgentSelector,
}

impl Fetcher {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            config,
            selector: Arc::new(random_user_agent),
        })
    }

    pub fn with_selector(mut self, selector: UserAgentSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn user_agent(&self) -> Result<&str> {
        let pool: &[String] = &self.config.user_agents;
        let index = (self.selector)(pool);
        pool.get(index)
            .map(String::as_str)
            .ok_or_else(|| ReportError::ConfigError {
                message: format!(
                    "User agent index {} out of range for a pool of {}",
                    index,
                    pool.len()
                ),
            })
    }

    /// Browser-like header set around one user agent.
    pub fn build_headers(user_agent: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| ReportError::InvalidConfigValueError {
                field: "source.user_agents".to_string(),
                value: user_agent.to_string(),
                reason: e.to_string(),
            })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        Ok(headers)
    }

    pub async fn fetch(&self) -> Result<String> {
        let user_agent = self.user_agent()?;
        let headers = Self::build_headers(user_agent)?;

        if self.config.initial_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.initial_delay_ms)).await;
        }

        tracing::info!("🌐 Requesting {}", self.config.url);
        tracing::debug!("Using user agent: {}", user_agent);

        // 單次請求，不重試
        let response = self
            .client
            .get(&self.config.url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();
        tracing::debug!("Response status: {} (final URL: {})", status, final_url);

        if !status.is_success() {
            return Err(ReportError::HttpStatusError {
                status: status.as_u16(),
                url: final_url,
            });
        }

        if is_consent_url(&final_url, &self.config.consent_markers) {
            tracing::warn!("⚠️ Redirected to a consent page: {}", final_url);
            return Err(ReportError::ConsentWallError { url: final_url });
        }

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes of HTML", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(url: String) -> SourceConfig {
        SourceConfig {
            url,
            initial_delay_ms: 0,
            consent_markers: vec!["/consent".to_string()],
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_is_consent_url() {
        let markers = vec!["consent.yahoo.com".to_string()];
        assert!(is_consent_url(
            "https://consent.yahoo.com/v2/collectConsent?sessionId=abc",
            &markers
        ));
        assert!(!is_consent_url("https://finance.yahoo.com/most-active", &markers));
        assert!(!is_consent_url("https://finance.yahoo.com/most-active", &[String::new()]));
    }

    #[test]
    fn test_random_user_agent_stays_in_pool() {
        let pool: Vec<String> = (0..4).map(|i| format!("agent-{}", i)).collect();
        for _ in 0..50 {
            assert!(random_user_agent(&pool) < pool.len());
        }
        assert_eq!(random_user_agent(&[]), 0);
    }

    #[test]
    fn test_build_headers() {
        let headers = Fetcher::build_headers("TestAgent/1.0").unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "TestAgent/1.0");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en;q=0.5");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "max-age=0");
        assert!(Fetcher::build_headers("bad\nagent").is_err());
    }

    #[test]
    fn test_out_of_range_selector_is_config_error() {
        let fetcher = Fetcher::new(test_config("http://localhost/".to_string()))
            .unwrap()
            .with_selector(Arc::new(|pool: &[String]| pool.len()));
        assert!(fetcher.user_agent().is_err());
    }

    #[tokio::test]
    async fn test_fetch_uses_selected_user_agent() {
        let server = MockServer::start();
        let config = test_config(server.url("/most-active"));
        let expected_agent = config.user_agents[2].clone();

        let page_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/most-active")
                .header("user-agent", expected_agent.as_str())
                .header("accept-language", "en-US,en;q=0.5");
            then.status(200)
                .header("Content-Type", "text/html")
                .body("<html><body><table></table></body></html>");
        });

        let fetcher = Fetcher::new(config)
            .unwrap()
            .with_selector(Arc::new(|_: &[String]| 2usize));
        let html = fetcher.fetch().await.unwrap();

        page_mock.assert();
        assert!(html.contains("<table>"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start();
        let page_mock = server.mock(|when, then| {
            when.method(GET).path("/most-active");
            then.status(503);
        });

        let fetcher = Fetcher::new(test_config(server.url("/most-active"))).unwrap();
        let err = fetcher.fetch().await.unwrap_err();

        page_mock.assert();
        match err {
            ReportError::HttpStatusError { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_detects_consent_redirect() {
        let server = MockServer::start();
        let redirect_mock = server.mock(|when, then| {
            when.method(GET).path("/most-active");
            then.status(302).header("Location", "/consent/collect");
        });
        let consent_mock = server.mock(|when, then| {
            when.method(GET).path("/consent/collect");
            then.status(200).body("<html><form>Accept all</form></html>");
        });

        let fetcher = Fetcher::new(test_config(server.url("/most-active"))).unwrap();
        let err = fetcher.fetch().await.unwrap_err();

        redirect_mock.assert();
        consent_mock.assert();
        assert!(matches!(err, ReportError::ConsentWallError { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
