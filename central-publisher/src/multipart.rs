//! A small, explicit `multipart/form-data` body builder for one file field.
//!
//! The publisher upload is always a single file part, so this module models
//! exactly that: a [`FilePart`] with a field name, filename, and content
//! type, framed by a freshly generated random [`Boundary`]. The file content
//! is streamed between the preamble and the closing boundary, never buffered
//! whole, so the peak memory of an upload stays flat regardless of bundle
//! size.

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use rand::distr::Alphanumeric;
use rand::RngExt;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Length of the generated boundary token. 32 alphanumeric characters carry
/// ~190 bits of entropy; a collision with bundle content is negligible.
const BOUNDARY_LEN: usize = 32;

/// A random multipart boundary token.
///
/// Alphanumeric only, so it contains none of the characters that are
/// reserved in multipart framing and needs no quoting in the
/// `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// Generates a fresh boundary, unique to one upload.
    pub fn generate() -> Self {
        let token = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(BOUNDARY_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// The raw token, as it appears in the `Content-Type` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single `multipart/form-data` file field.
///
/// Produces, in order: the CRLF-terminated boundary marker, the
/// `Content-Disposition` and `Content-Type` header lines, a blank line, the
/// raw content bytes (streamed), and the closing `--boundary--` marker.
#[derive(Debug, Clone)]
pub struct FilePart {
    boundary: Boundary,
    field_name: String,
    file_name: String,
    content_type: String,
}

impl FilePart {
    /// Creates a part with a freshly generated boundary.
    pub fn new<N, F, C>(field_name: N, file_name: F, content_type: C) -> Self
    where
        N: Into<String>,
        F: Into<String>,
        C: Into<String>,
    {
        Self {
            boundary: Boundary::generate(),
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// The boundary framing this part, for the outer `Content-Type` header.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Everything before the content bytes.
    fn preamble(&self) -> Vec<u8> {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.boundary, self.field_name, self.file_name, self.content_type
        )
        .into_bytes()
    }

    /// Everything after the content bytes.
    fn epilogue(&self) -> Vec<u8> {
        format!("\r\n--{}--\r\n", self.boundary).into_bytes()
    }

    /// Exact body length for a content of `content_len` bytes, so the
    /// request can carry a `Content-Length` header despite being streamed.
    pub fn content_length(&self, content_len: u64) -> u64 {
        self.preamble().len() as u64 + content_len + self.epilogue().len() as u64
    }

    /// Assembles the full body as a byte stream: preamble, then the content
    /// read incrementally from `content`, then the closing boundary.
    pub fn body_stream<R>(&self, content: R) -> impl Stream<Item = std::io::Result<Bytes>> + Send
    where
        R: AsyncRead + Send + 'static,
    {
        let head = Bytes::from(self.preamble());
        let tail = Bytes::from(self.epilogue());
        stream::once(async move { Ok(head) })
            .chain(ReaderStream::new(content))
            .chain(stream::once(async move { Ok(tail) }))
    }

    /// Like [`body_stream`](Self::body_stream), wrapped for reqwest.
    pub fn into_body<R>(self, content: R) -> reqwest::Body
    where
        R: AsyncRead + Send + 'static,
    {
        reqwest::Body::wrap_stream(self.body_stream(content))
    }
}
