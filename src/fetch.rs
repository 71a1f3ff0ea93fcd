//! Single blocking HTTP GET
//!
//! One attempt per call: no retries, no rate limiting, redirects as the
//! client follows them by default. Failures keep their kind so callers can
//! log them precisely before printing and moving on.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::OnceLock;
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bytes inspected for a `<meta charset>` declaration
const SNIFF_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("timed out after {}s fetching {url}", .timeout.as_secs_f32())]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP {code} from {url}")]
    HttpStatus { url: String, code: u16 },

    #[error("could not decode body of {url} as {encoding}")]
    Decode { url: String, encoding: String },
}

/// Source of page bodies
pub trait Fetch {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError>;
}

/// Live fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    user_agent: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: None,
        }
    }

    /// Replace every caller-supplied user agent with `user_agent`
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let user_agent = self.user_agent.as_deref().unwrap_or(user_agent);
        fetch(url, user_agent, self.timeout)
    }
}

/// GET `url` and return the decoded body
pub fn fetch(url: &str, user_agent: &str, timeout: Duration) -> Result<String, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme `{}`", parsed.scheme()),
        });
    }

    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| classify(url, timeout, &e))?;

    debug!(url, user_agent, "GET");
    let response = client
        .get(parsed.as_str())
        .send()
        .map_err(|e| classify(url, timeout, &e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            code: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().map_err(|e| classify(url, timeout, &e))?;
    debug!(url, status = status.as_u16(), bytes = bytes.len(), "fetched");

    decode_body(url, &bytes, content_type.as_deref()).map(Cow::into_owned)
}

/// Decode a body: BOM, then the declared charset, then a `<meta charset>`
/// sniff, then UTF-8
pub fn decode_body<'a>(
    url: &str,
    bytes: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, FetchError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (
            content_type
                .and_then(declared_charset)
                .or_else(|| sniff_meta_charset(bytes))
                .unwrap_or(UTF_8),
            bytes,
        ),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| FetchError::Decode {
            url: url.to_string(),
            encoding: encoding.name().to_string(),
        })
}

fn declared_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let label = value.trim().trim_matches(|c| c == '"' || c == '\'');
        Encoding::for_label(label.as_bytes())
    })
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    static META_CHARSET: OnceLock<Option<Regex>> = OnceLock::new();
    let re = META_CHARSET
        .get_or_init(|| Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?([a-z0-9_:.\-]+)"#).ok())
        .as_ref()?;

    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let label = re.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

fn classify(url: &str, timeout: Duration, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout {
            url: url.to_string(),
            timeout,
        };
    }
    if err.is_decode() {
        return FetchError::Decode {
            url: url.to_string(),
            encoding: "content-encoding".to_string(),
        };
    }
    FetchError::Network {
        url: url.to_string(),
        message: error_chain(err),
    }
}

// reqwest keeps the interesting part (DNS, refused, TLS) in the source chain
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_default() {
        let body = decode_body("u", "héllo".as_bytes(), None).unwrap();
        assert_eq!(body, "héllo");
    }

    #[test]
    fn test_decode_declared_charset() {
        let latin1 = [b'c', b'a', b'f', 0xE9];
        let body = decode_body("u", &latin1, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(body, "café");
    }

    #[test]
    fn test_decode_meta_sniff() {
        let mut page = b"<html><head><meta charset=\"windows-1252\"></head><body>".to_vec();
        page.push(0x93);
        page.extend_from_slice(b"quoted");
        page.push(0x94);
        let body = decode_body("u", &page, Some("text/html")).unwrap();
        assert!(body.contains("\u{201C}quoted\u{201D}"));
    }

    #[test]
    fn test_decode_bom_wins() {
        let mut page = vec![0xEF, 0xBB, 0xBF];
        page.extend_from_slice("ok ✓".as_bytes());
        let body = decode_body("u", &page, Some("text/html; charset=iso-8859-1")).unwrap();
        assert_eq!(body, "ok ✓");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_body("http://x/", &[0x66, 0xFF, 0xFE, 0x66], None).unwrap_err();
        assert!(matches!(err, FetchError::Decode { ref encoding, .. } if encoding == "UTF-8"));
    }

    #[test]
    fn test_invalid_urls() {
        for url in ["not a url", "ftp://example.com/file", "/relative/path"] {
            let err = fetch(url, "test", Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl { .. }), "{url}: {err}");
        }
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        // nothing listens on the discard port locally
        let err = fetch("http://127.0.0.1:9/", "test", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }), "{err}");
    }

    #[test]
    fn test_user_agent_override() {
        let fetcher = HttpFetcher::default().with_user_agent(Some("override".to_string()));
        assert_eq!(fetcher.user_agent.as_deref(), Some("override"));
        assert_eq!(fetcher.timeout, DEFAULT_TIMEOUT);
    }
}
