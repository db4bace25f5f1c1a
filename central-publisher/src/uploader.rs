//! The publisher client: one synchronous-feeling call that validates its
//! input, streams the bundle as a multipart POST, and interprets the
//! response.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::info;
use url::Url;

use crate::constants::{
    BUNDLE_CONTENT_TYPE, BUNDLE_FIELD_NAME, DEFAULT_USER_AGENT, PUBLISHER_UPLOAD_URL,
    UPLOAD_ACCEPTED,
};
use crate::credentials::Credentials;
use crate::errors::{BuildError, ConfigError, Error, Result};
use crate::multipart::FilePart;

/// One bundle upload: the path to the finished zip and the credentials to
/// publish it under.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    bundle: PathBuf,
    credentials: Credentials,
}

impl UploadRequest {
    /// Creates an upload request. Validation happens in
    /// [`PublisherClient::upload`], before any network traffic.
    pub fn new<P: Into<PathBuf>>(bundle: P, credentials: Credentials) -> Self {
        Self {
            bundle: bundle.into(),
            credentials,
        }
    }

    /// The bundle path as given.
    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    /// Filename sent in the `Content-Disposition` header: the bundle's base
    /// name.
    fn file_name(&self) -> String {
        self.bundle
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle.zip".to_owned())
    }
}

/// The publisher's answer to an accepted upload.
///
/// Created once per invocation and meant to be consumed immediately; the
/// body is whatever diagnostic text the portal returned and is not parsed
/// further.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Always [`UPLOAD_ACCEPTED`] (201) for a receipt.
    pub status: StatusCode,
    /// The response body, verbatim.
    pub body: String,
}

#[derive(Debug, Clone, Default)]
#[must_use]
/// Configures a [`PublisherClient`] before construction.
///
/// Most code obtains this via [`PublisherClient::builder()`], which simply
/// returns `PublisherClientBuilder::default()`.
///
/// # Defaults
/// - Endpoint: [`PUBLISHER_UPLOAD_URL`]
/// - HTTP request timeout: reqwest default (no global timeout) unless set via
///   [`Self::request_timeout`]
/// - User-agent: `central-publisher@<crate-version>` plus any
///   [`Self::user_agent_extra`]
pub struct PublisherClientBuilder {
    endpoint: Option<String>,
    request_timeout: Option<Duration>,

    /// Optional user-agent segment appended to the default UA.
    user_agent_extra: Option<String>,
}

impl PublisherClientBuilder {
    /// Overrides the upload endpoint. Production code never needs this; tests
    /// point it at a local mock server.
    pub fn endpoint<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Set HTTP request timeout. An upload blocks for as long as the transfer
    /// takes, so size this to bundle size and uplink bandwidth.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Append an extra user-agent segment after the default
    /// `central-publisher@<version>`.
    /// Example: `.user_agent_extra("my-release-pipeline/1.2.3")`
    pub fn user_agent_extra<S: Into<String>>(&mut self, extra: S) -> &mut Self {
        self.user_agent_extra = Some(extra.into());
        self
    }

    /// Build [`PublisherClient`]
    pub fn build(&self) -> std::result::Result<PublisherClient, BuildError> {
        let endpoint = Url::parse(self.endpoint.as_deref().unwrap_or(PUBLISHER_UPLOAD_URL))?;

        // Compose user agent with optional extra part.
        let user_agent = match &self.user_agent_extra {
            Some(extra) if !extra.trim().is_empty() => {
                format!("{DEFAULT_USER_AGENT} {}", extra.trim())
            }
            _ => DEFAULT_USER_AGENT.to_owned(),
        };

        let mut http_builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = self.request_timeout {
            http_builder = http_builder.timeout(timeout);
        }

        Ok(PublisherClient {
            http: http_builder.build()?,
            endpoint,
        })
    }
}

/// Client for the Central Portal publisher upload API.
///
/// Owns a single reqwest client; the connection pool lives exactly as long
/// as this value, so repeated CI invocations that build one client per run
/// cannot leak sockets across runs. Each [`upload`](Self::upload) call is an
/// independent, stateless operation with no dependency on prior or
/// concurrent uploads.
///
/// ### Construction
/// Use [`PublisherClient::builder()`] to tweak the timeout, user-agent, or
/// endpoint; or pick the defaults via [`PublisherClient::new()`].
///
/// ### Example
/// ```no_run
/// # use central_publisher::{Credentials, PublisherClient, UploadRequest};
/// # async fn run() -> central_publisher::Result<()> {
/// let client = PublisherClient::new()?;
/// let request = UploadRequest::new(
///     "build/publication.zip",
///     Credentials::new("account-id", "account-token"),
/// );
/// let receipt = client.upload(&request).await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct PublisherClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl PublisherClient {
    /// Creates a client against the production publisher endpoint.
    pub fn new() -> std::result::Result<Self, BuildError> {
        Self::builder().build()
    }

    /// Returns a builder to edit settings before creating [`PublisherClient`].
    pub fn builder() -> PublisherClientBuilder {
        PublisherClientBuilder::default()
    }

    /// The endpoint uploads go to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads a bundle and waits for the portal's verdict.
    ///
    /// Validates credentials and the bundle file first; a
    /// [`ConfigError`] is returned before any connection is attempted. The
    /// bundle is then streamed as a single multipart field named `bundle`
    /// with a fresh random boundary. Exactly one attempt is made: a non-201
    /// answer or a transport failure is returned as-is, never retried, since
    /// a duplicate POST against a publishing endpoint risks a duplicate
    /// release.
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt> {
        request.credentials.validate()?;

        let metadata = tokio::fs::metadata(&request.bundle)
            .await
            .map_err(|_| ConfigError::MissingBundle(request.bundle.clone()))?;
        if !metadata.is_file() {
            return Err(ConfigError::MissingBundle(request.bundle.clone()).into());
        }
        if metadata.len() == 0 {
            return Err(ConfigError::EmptyBundle(request.bundle.clone()).into());
        }

        let part = FilePart::new(BUNDLE_FIELD_NAME, request.file_name(), BUNDLE_CONTENT_TYPE);
        let content_length = part.content_length(metadata.len());
        let content_type = format!("multipart/form-data; boundary={}", part.boundary());
        let bearer = request.credentials.bearer_token();

        info!(
            bundle = %request.bundle.display(),
            size = metadata.len(),
            "uploading bundle to publisher"
        );

        let file = tokio::fs::File::open(&request.bundle).await?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .body(part.into_body(file))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string()
        });

        if status != UPLOAD_ACCEPTED {
            return Err(Error::Protocol { status, body });
        }

        info!(%status, "publisher accepted bundle");
        Ok(UploadReceipt { status, body })
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use httpmock::prelude::*;

    use super::*;

    const UPLOAD_PATH: &str = "/api/v1/publisher/upload";

    fn client_for(server: &MockServer) -> PublisherClient {
        PublisherClient::builder()
            .endpoint(server.url(format!("{UPLOAD_PATH}?publishingType=USER_MANAGED")))
            .build()
            .unwrap()
    }

    fn bundle_in(dir: &tempfile::TempDir, content: &[u8]) -> PathBuf {
        let path = dir.path().join("publication.zip");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn reports_success_on_201() {
        let server = MockServer::start_async().await;
        let expected_auth = format!("Bearer {}", STANDARD.encode("user:pass"));
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(UPLOAD_PATH)
                    .query_param("publishingType", "USER_MANAGED")
                    .header("authorization", expected_auth.as_str())
                    .matches(|req| {
                        // The outer Content-Type must carry the generated
                        // 32-char alphanumeric boundary.
                        req.headers.as_ref().into_iter().flatten().any(|(name, value)| {
                            name.eq_ignore_ascii_case("content-type")
                                && value
                                    .strip_prefix("multipart/form-data; boundary=")
                                    .is_some_and(|boundary| {
                                        boundary.len() == 32
                                            && boundary.chars().all(|c| c.is_ascii_alphanumeric())
                                    })
                        })
                    })
                    .body_contains("name=\"bundle\"");
                then.status(201).body("deployment-id-123");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"PK\x03\x04 zipped artifacts");
        let request = UploadRequest::new(&bundle, Credentials::new("user", "pass"));

        let receipt = client_for(&server).upload(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(receipt.status, StatusCode::CREATED);
        assert_eq!(receipt.body, "deployment-id-123");
    }

    #[tokio::test]
    async fn surfaces_401_with_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(401).body("invalid credentials");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"zip");
        let request = UploadRequest::new(&bundle, Credentials::new("user", "wrong"));

        let err = client_for(&server).upload(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { status, .. } if status == StatusCode::UNAUTHORIZED
        ));
        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid credentials"));
    }

    #[tokio::test]
    async fn surfaces_500_with_exact_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(500).body("internal error");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"zip");
        let request = UploadRequest::new(&bundle, Credentials::new("user", "pass"));

        let message = client_for(&server)
            .upload(&request)
            .await
            .unwrap_err()
            .to_string();
        assert!(message.contains("500"));
        assert!(message.contains("internal error"));
    }

    #[tokio::test]
    async fn other_2xx_is_still_a_protocol_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(200).body("ok-but-not-created");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"zip");
        let request = UploadRequest::new(&bundle, Credentials::new("user", "pass"));

        let err = client_for(&server).upload(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol { status, .. } if status == StatusCode::OK
        ));
    }

    #[tokio::test]
    async fn missing_bundle_fails_before_any_connection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(201);
            })
            .await;

        let request = UploadRequest::new(
            "/nonexistent/publication.zip",
            Credentials::new("user", "pass"),
        );

        let err = client_for(&server).upload(&request).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingBundle(_))
        ));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn empty_bundle_fails_before_any_connection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(201);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"");
        let request = UploadRequest::new(&bundle, Credentials::new("user", "pass"));

        let err = client_for(&server).upload(&request).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::EmptyBundle(_))));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn empty_credentials_fail_before_any_connection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(UPLOAD_PATH);
                then.status(201);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, b"zip");

        let err = client_for(&server)
            .upload(&UploadRequest::new(&bundle, Credentials::new("", "pass")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::EmptyAccountId)));

        let err = client_for(&server)
            .upload(&UploadRequest::new(&bundle, Credentials::new("user", "")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::EmptyAccountToken)
        ));

        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn sends_filename_and_field_name_in_the_part_headers() {
        // Byte-exact framing is covered by the multipart unit tests; this
        // checks what actually arrives over the wire.
        let content: Vec<u8> = b"PK\x03\x04\r\n--tricky\r\n\x00\xffpayload".to_vec();

        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(UPLOAD_PATH)
                    .body_contains("filename=\"publication.zip\"");
                then.status(201);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_in(&dir, &content);
        let request = UploadRequest::new(&bundle, Credentials::new("user", "pass"));

        client_for(&server).upload(&request).await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn retryable_classification_is_explicit_but_never_acted_on() {
        let retryable = Error::Protocol {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        assert!(retryable.is_retryable());

        let permanent = Error::Protocol {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn default_endpoint_is_the_production_portal() {
        let client = PublisherClient::new().unwrap();
        assert_eq!(client.endpoint().as_str(), PUBLISHER_UPLOAD_URL);
    }
}
