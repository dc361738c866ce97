//! Publisher: posts the rendered shop image with a caption.
//!
//! [`Publisher`] is the policy (caption, authenticate before posting, read
//! the written image); [`SocialClient`] is the transport. The production
//! transport is [`TwitterClient`], which signs every request with OAuth 1.0a
//! (HMAC-SHA1):
//!
//! 1. `GET  api.twitter.com/1.1/account/verify_credentials.json`
//! 2. `POST upload.twitter.com/1.1/media/upload.json` (multipart `media`)
//! 3. `POST api.twitter.com/2/tweets` (`{"text", "media": {"media_ids"}}`)

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::{Value, json};
use sha1::Sha1;
use std::path::Path;
use thiserror::Error;

use crate::config::TwitterConfig;

pub const CAPTION_PREFIX: &str = "Battle Royale - #Fortnite Item Shop | ";

const VERIFY_URL: &str = "https://api.twitter.com/1.1/account/verify_credentials.json";
const UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
const TWEET_URL: &str = "https://api.twitter.com/2/tweets";

type HmacSha1 = Hmac<Sha1>;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered HTTP {status}: {body}")]
    Status {
        url: &'static str,
        status: u16,
        body: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Caption for a shop image.
pub fn caption(date_label: &str, creator_code: Option<&str>) -> String {
    let mut text = format!("{CAPTION_PREFIX}{date_label}");
    if let Some(code) = creator_code {
        text.push_str(&format!("\n\nUse code: {code} in the item shop!"));
    }
    text
}

/// A social network account that can post an image with text.
pub trait SocialClient {
    /// Check the credentials. Returns the account handle.
    fn verify_credentials(&self) -> Result<String, PublishError>;

    /// Post `text` with one attached JPEG. Returns the post id.
    fn post_update(&self, text: &str, media: &[u8]) -> Result<String, PublishError>;
}

pub struct Publisher {
    client: Box<dyn SocialClient + Send>,
    creator_code: Option<String>,
}

impl Publisher {
    pub fn new(client: Box<dyn SocialClient + Send>, creator_code: Option<String>) -> Self {
        Self {
            client,
            creator_code,
        }
    }

    pub fn caption(&self, date_label: &str) -> String {
        caption(date_label, self.creator_code.as_deref())
    }

    /// Authenticate, then post the image at `image_path`.
    ///
    /// Nothing is posted when authentication fails.
    pub fn publish(&self, date_label: &str, image_path: &Path) -> Result<String, PublishError> {
        let handle = self.client.verify_credentials().map_err(|e| match e {
            PublishError::Auth(_) => e,
            other => PublishError::Auth(other.to_string()),
        })?;
        tracing::info!(account = %handle, "Authenticated");

        let media = std::fs::read(image_path)?;
        let id = self.client.post_update(&self.caption(date_label), &media)?;
        tracing::info!(id = %id, "Published Item Shop");
        Ok(id)
    }
}

// =============================================================================
// OAuth 1.0a
// =============================================================================

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl From<&TwitterConfig> for OAuthCredentials {
    fn from(config: &TwitterConfig) -> Self {
        Self {
            consumer_key: config.api_key.clone(),
            consumer_secret: config.api_secret.clone(),
            token: config.access_token.clone(),
            token_secret: config.access_secret.clone(),
        }
    }
}

impl OAuthCredentials {
    /// Sign a request. `params` holds the `oauth_*` parameters plus any query
    /// or form parameters; JSON and multipart bodies are not signed.
    pub fn signature(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let mut encoded: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        encoded.sort();
        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            percent_encode(url),
            percent_encode(&param_string)
        );
        let key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(&self.token_secret)
        );

        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// `Authorization` header value for one request.
    pub fn authorization(
        &self,
        method: &str,
        url: &str,
        request_params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut all = oauth.clone();
        all.extend_from_slice(request_params);
        let signature = self.signature(method, url, &all);
        oauth.push(("oauth_signature", signature.as_str()));
        oauth.sort();

        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Twitter over its REST API.
pub struct TwitterClient {
    http: reqwest::blocking::Client,
    credentials: OAuthCredentials,
}

impl TwitterClient {
    pub fn new(credentials: OAuthCredentials) -> Result<Self, PublishError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("item-shop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, credentials })
    }

    fn authorization(&self, method: &str, url: &str) -> String {
        self.credentials.authorization(
            method,
            url,
            &[],
            &nonce(),
            chrono::Utc::now().timestamp(),
        )
    }

    fn json_response(
        url: &'static str,
        response: reqwest::blocking::Response,
    ) -> Result<Value, PublishError> {
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(PublishError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| PublishError::Response(format!("{url}: {e}")))
    }

    fn upload_media(&self, media: &[u8]) -> Result<String, PublishError> {
        let part = reqwest::blocking::multipart::Part::bytes(media.to_vec())
            .file_name("itemshop.jpeg")
            .mime_str("image/jpeg")?;
        let form = reqwest::blocking::multipart::Form::new().part("media", part);
        let response = self
            .http
            .post(UPLOAD_URL)
            .header("Authorization", self.authorization("POST", UPLOAD_URL))
            .multipart(form)
            .send()?;

        let body = Self::json_response(UPLOAD_URL, response)?;
        body.get("media_id_string")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PublishError::Response("upload returned no media_id_string".into()))
    }
}

impl SocialClient for TwitterClient {
    fn verify_credentials(&self) -> Result<String, PublishError> {
        let response = self
            .http
            .get(VERIFY_URL)
            .header("Authorization", self.authorization("GET", VERIFY_URL))
            .send()?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PublishError::Auth("credentials rejected".into()));
        }
        let body = Self::json_response(VERIFY_URL, response)?;
        body.get("screen_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PublishError::Response("verify_credentials returned no screen_name".into())
            })
    }

    fn post_update(&self, text: &str, media: &[u8]) -> Result<String, PublishError> {
        let media_id = self.upload_media(media)?;
        let response = self
            .http
            .post(TWEET_URL)
            .header("Authorization", self.authorization("POST", TWEET_URL))
            .json(&json!({ "text": text, "media": { "media_ids": [media_id] } }))
            .send()?;

        let body = Self::json_response(TWEET_URL, response)?;
        body.pointer("/data/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PublishError::Response("tweet response has no data.id".into()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records posts; can be told to reject credentials or fail posting.
    #[derive(Default, Clone)]
    pub struct RecordingClient {
        pub posts: Arc<Mutex<Vec<(String, usize)>>>,
        pub reject_auth: bool,
        pub fail_post: bool,
    }

    impl SocialClient for RecordingClient {
        fn verify_credentials(&self) -> Result<String, PublishError> {
            if self.reject_auth {
                return Err(PublishError::Auth("bad token".into()));
            }
            Ok("itemshopbot".into())
        }

        fn post_update(&self, text: &str, media: &[u8]) -> Result<String, PublishError> {
            if self.fail_post {
                return Err(PublishError::Response("over capacity".into()));
            }
            let mut posts = self.posts.lock().unwrap();
            posts.push((text.to_string(), media.len()));
            Ok(format!("post-{}", posts.len()))
        }
    }

    fn image_file(tmp: &TempDir) -> std::path::PathBuf {
        let path = tmp.path().join("itemshop.jpeg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        path
    }

    // =========================================================================
    // caption
    // =========================================================================

    #[test]
    fn caption_without_creator_code() {
        assert_eq!(
            caption("18 October 2026", None),
            "Battle Royale - #Fortnite Item Shop | 18 October 2026"
        );
    }

    #[test]
    fn caption_with_creator_code() {
        assert_eq!(
            caption("18 October 2026", Some("athena")),
            "Battle Royale - #Fortnite Item Shop | 18 October 2026\n\nUse code: athena in the item shop!"
        );
    }

    // =========================================================================
    // Publisher
    // =========================================================================

    #[test]
    fn publish_posts_caption_and_image() {
        let tmp = TempDir::new().unwrap();
        let client = RecordingClient::default();
        let publisher = Publisher::new(Box::new(client.clone()), None);

        let id = publisher.publish("18 October 2026", &image_file(&tmp)).unwrap();
        assert_eq!(id, "post-1");
        let posts = client.posts.lock().unwrap();
        assert_eq!(
            *posts,
            vec![("Battle Royale - #Fortnite Item Shop | 18 October 2026".to_string(), 4)]
        );
    }

    #[test]
    fn rejected_credentials_post_nothing() {
        let tmp = TempDir::new().unwrap();
        let client = RecordingClient {
            reject_auth: true,
            ..Default::default()
        };
        let publisher = Publisher::new(Box::new(client.clone()), None);
        let result = publisher.publish("date", &image_file(&tmp));
        assert!(matches!(result, Err(PublishError::Auth(_))));
        assert!(client.posts.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_image_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(Box::new(RecordingClient::default()), None);
        let result = publisher.publish("date", &tmp.path().join("nope.jpeg"));
        assert!(matches!(result, Err(PublishError::Io(_))));
    }

    #[test]
    fn post_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let client = RecordingClient {
            fail_post: true,
            ..Default::default()
        };
        let publisher = Publisher::new(Box::new(client), Some("code".into()));
        assert!(matches!(
            publisher.publish("date", &image_file(&tmp)),
            Err(PublishError::Response(_))
        ));
    }

    // =========================================================================
    // OAuth 1.0a
    // =========================================================================

    #[test]
    fn percent_encoding_is_rfc3986() {
        assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(percent_encode("!*'()"), "%21%2A%27%28%29");
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    fn reference_credentials() -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    const REFERENCE_PARAMS: &[(&str, &str)] = &[
        ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ("include_entities", "true"),
    ];
    const REFERENCE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const REFERENCE_NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";

    #[test]
    fn signature_matches_reference_request() {
        let creds = reference_credentials();
        let mut params = vec![
            ("oauth_consumer_key", creds.consumer_key.as_str()),
            ("oauth_nonce", REFERENCE_NONCE),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", creds.token.as_str()),
            ("oauth_version", "1.0"),
        ];
        params.extend_from_slice(REFERENCE_PARAMS);
        assert_eq!(
            creds.signature("POST", REFERENCE_URL, &params),
            "hCtSmYh+iHYCEqBWrE7C7hYmtUk="
        );
    }

    #[test]
    fn authorization_header_carries_signature() {
        let header = reference_credentials().authorization(
            "POST",
            REFERENCE_URL,
            REFERENCE_PARAMS,
            REFERENCE_NONCE,
            1318622958,
        );
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        // Request parameters are signed but not sent in the header
        assert!(!header.contains("status"));
    }

    #[test]
    fn nonces_differ() {
        let a = nonce();
        assert_eq!(a.len(), 32);
        assert_ne!(a, nonce());
    }

    #[test]
    fn credentials_from_config() {
        let config = TwitterConfig {
            enabled: true,
            api_key: "ck".into(),
            api_secret: "cs".into(),
            access_token: "t".into(),
            access_secret: "ts".into(),
        };
        let creds = OAuthCredentials::from(&config);
        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.token_secret, "ts");
    }
}
