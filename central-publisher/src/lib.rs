#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod constants;
mod credentials;
pub mod errors;
mod multipart;
mod uploader;

// --- PUBLIC API EXPORTS ---
// The one operation this crate exists for
pub use uploader::{PublisherClient, PublisherClientBuilder, UploadReceipt, UploadRequest};

// Inputs
pub use credentials::{AccountToken, Credentials};

// Multipart framing, exposed for callers that need to inspect or reuse it
pub use multipart::{Boundary, FilePart};

// Errors
pub use errors::{BuildError, ConfigError, Error, Result};

// Environment constants
pub use constants::{
    BUNDLE_CONTENT_TYPE, BUNDLE_FIELD_NAME, PUBLISHER_UPLOAD_URL, UPLOAD_ACCEPTED,
};

// Re-exports
pub use reqwest::StatusCode;
