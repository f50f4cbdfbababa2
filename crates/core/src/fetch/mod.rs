use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Storefronts routinely block default HTTP-library user agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build page fetch http client")?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .context("page request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read page body")?;

        // No verdict is possible without content; anything but a plain
        // 200 (redirect already followed, captcha page, rate limit) is
        // fatal for the run.
        if status != StatusCode::OK {
            anyhow::bail!("page fetch HTTP {status}: {text}");
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/product"))
            .and(headers(
                "user-agent",
                vec![
                    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML",
                    "like Gecko) Chrome/124.0.0.0 Safari/537.36",
                ],
            ))
            .and(headers("accept-language", vec!["en-US", "en;q=0.9"]))
            .respond_with(ResponseTemplate::new(200).set_body_string("Add to Cart"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::from_env().unwrap();
        let body = fetcher
            .fetch_page(&format!("{}/product", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "Add to Cart");
    }

    #[tokio::test]
    async fn non_200_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::from_env().unwrap();
        let err = fetcher.fetch_page(&server.uri()).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("503"), "unexpected error: {msg}");
    }
}
