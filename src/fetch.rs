//! Content fetcher collaborator: URL → extracted plain text.
//!
//! The scoring core only ever sees the returned string; fetch failures are
//! `CollaboratorError`s handled at the webhook boundary. Timeouts live here,
//! never inside the core.

use std::time::Duration;

use anyhow::Context;
use once_cell::sync::OnceCell;

use crate::error::ClassifyError;

#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return readable plain text.
    async fn fetch_text(&self, url: &str) -> Result<String, ClassifyError>;
}

/// HTTP fetcher with a bounded timeout and HTML-to-text extraction.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("news-emotion-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, ClassifyError> {
        let body = async {
            let resp = self
                .client
                .get(url)
                .send()
                .await
                .context("request failed")?;
            let resp = resp.error_for_status().context("non-2xx status")?;
            resp.text().await.context("body read failed")
        }
        .await
        .map_err(|e| ClassifyError::collaborator("fetch", e))?;

        let text = extract_text(&body);
        if text.is_empty() {
            return Err(ClassifyError::collaborator(
                "fetch",
                format!("no readable text at {url}"),
            ));
        }
        Ok(text)
    }
}

/// Reduce an HTML document to whitespace-normalized text.
pub fn extract_text(html: &str) -> String {
    // 1) Drop script/style blocks wholesale; their content is never prose.
    static RE_NOISE: OnceCell<regex::Regex> = OnceCell::new();
    let re_noise = RE_NOISE.get_or_init(|| {
        regex::Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").unwrap()
    });
    let mut out = re_noise.replace_all(html, " ").to_string();

    // 2) Strip remaining tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) HTML entity decode
    out = html_escape::decode_html_entities(&out).to_string();

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    out
}

// --- Test helper ---
pub struct MockFetcher {
    pub fixed: Result<String, &'static str>,
}

impl MockFetcher {
    pub fn returning(text: &str) -> Self {
        Self {
            fixed: Ok(text.to_string()),
        }
    }

    pub fn failing(reason: &'static str) -> Self {
        Self { fixed: Err(reason) }
    }
}

#[async_trait::async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_text(&self, _url: &str) -> Result<String, ClassifyError> {
        match &self.fixed {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(ClassifyError::collaborator("fetch", reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<html><body><h1>Vecinos</h1><p>ayuda&nbsp;&amp; amor</p></body></html>";
        assert_eq!(extract_text(html), "Vecinos ayuda & amor");
    }

    #[test]
    fn drops_script_and_style_content() {
        let html = "<style>body{color:red}</style><p>texto</p><script>var ayuda=1;</script>";
        assert_eq!(extract_text(html), "texto");
    }

    #[test]
    fn plain_text_passes_through_collapsed() {
        assert_eq!(extract_text("ya   es\n texto plano "), "ya es texto plano");
    }

    #[test]
    fn empty_document_yields_empty_string() {
        assert_eq!(extract_text("<html><head></head></html>"), "");
    }

    #[tokio::test]
    async fn mock_fetcher_round_trip() {
        let ok = MockFetcher::returning("hola");
        assert_eq!(ok.fetch_text("http://x").await.unwrap(), "hola");

        let err = MockFetcher::failing("boom");
        assert!(matches!(
            err.fetch_text("http://x").await.unwrap_err(),
            ClassifyError::Collaborator { who: "fetch", .. }
        ));
    }
}
