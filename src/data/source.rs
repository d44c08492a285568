//! Network access to catalog providers

use std::time::Duration;

use super::catalog::GroupSource;
use crate::error::FetchError;

/// Anything that can produce raw catalog text for a group
pub trait CatalogSource: Send + Sync {
    fn fetch(&self, source: &GroupSource) -> Result<String, FetchError>;
}

/// HTTP client for direct providers and the authenticated-session relay
pub struct HttpCatalogSource {
    agent: ureq::Agent,
    relay_url: String,
}

impl HttpCatalogSource {
    pub fn new(relay_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            relay_url: relay_url.into(),
        }
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.agent.get(url).call().map_err(|e| map_ureq_error(url, e))?;
        response.into_string().map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// The relay logs in, fetches `url`, logs out, and answers with the body as JSON.
    fn post_relay(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .agent
            .post(&self.relay_url)
            .send_json(serde_json::json!({ "url": url }))
            .map_err(|e| map_ureq_error(&self.relay_url, e))?;

        let body: serde_json::Value = response.into_json().map_err(|e| FetchError::Body {
            url: self.relay_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(relay_body_to_text(body))
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self, source: &GroupSource) -> Result<String, FetchError> {
        match source {
            GroupSource::Direct { url } => self.get(url),
            GroupSource::Relay { url } => self.post_relay(url),
        }
    }
}

fn relay_body_to_text(body: serde_json::Value) -> String {
    match body {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, _) => FetchError::Status {
            url: url.to_string(),
            code,
        },
        ureq::Error::Transport(t) => FetchError::Transport {
            url: url.to_string(),
            reason: t.to_string(),
        },
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts how often it was hit
    pub(crate) struct CountingSource {
        body: Option<String>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        pub(crate) fn ok(body: &str) -> Self {
            Self {
                body: Some(body.to_string()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        /// Every fetch takes `delay` before answering
        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CatalogSource for CountingSource {
        fn fetch(&self, source: &GroupSource) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.body.clone().ok_or_else(|| FetchError::Status {
                url: source.url().to_string(),
                code: 503,
            })
        }
    }

    #[test]
    fn test_relay_string_body_is_raw_text() {
        let body = serde_json::Value::String("0 DEB\n1 x\n2 y\n".into());
        assert_eq!(relay_body_to_text(body), "0 DEB\n1 x\n2 y\n");
    }

    #[test]
    fn test_relay_non_string_body_is_serialized() {
        let body = serde_json::json!({ "error": "Login failed" });
        assert_eq!(relay_body_to_text(body), r#"{"error":"Login failed"}"#);
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let source = HttpCatalogSource::new("http://127.0.0.1:9/relay", Duration::from_millis(200));
        let err = source
            .fetch(&GroupSource::Direct {
                url: "http://127.0.0.1:9/catalog.txt".into(),
            })
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
