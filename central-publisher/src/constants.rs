use reqwest::StatusCode;

/// Production upload endpoint of the Central Portal publisher API.
///
/// `publishingType=USER_MANAGED` stages the bundle for manual release review
/// instead of publishing it automatically.
pub const PUBLISHER_UPLOAD_URL: &str =
    "https://central.sonatype.com/api/v1/publisher/upload?publishingType=USER_MANAGED";

/// The only status the portal returns for an accepted bundle. Anything else,
/// including other 2xx codes, is a protocol failure.
pub const UPLOAD_ACCEPTED: StatusCode = StatusCode::CREATED;

/// Multipart field name the publisher expects the bundle under.
pub const BUNDLE_FIELD_NAME: &str = "bundle";

/// Content type of the bundle part.
pub const BUNDLE_CONTENT_TYPE: &str = "application/octet-stream";

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("central-publisher", "@", env!("CARGO_PKG_VERSION"),);
