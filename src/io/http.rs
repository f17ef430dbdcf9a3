use async_trait::async_trait;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, LAST_MODIFIED, RANGE};
use reqwest::{Client, Response, StatusCode};

use super::BackingStore;
use crate::config::RemoteConfig;
use crate::error::{HandleError, Result};

/// Forward gaps up to this many bytes are skipped on the open connection
/// instead of reconnecting.
const SKIP_AHEAD_LIMIT: u64 = 64 * 1024;

/// What a probe learned about a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// Declared content length.
    pub length: u64,
    /// Server advertised `Accept-Ranges: bytes`.
    pub accepts_ranges: bool,
    /// Raw `Last-Modified` header, if any.
    pub last_modified: Option<String>,
}

/// Read-only HTTP store
///
/// Keeps the most recent response body open so sequential reads continue on
/// the same connection. Reads anywhere else reconnect, with a ranged request
/// when the server supports it.
pub struct HttpStore {
    client: Client,
    url: String,
    metadata: RemoteMetadata,
    stream: Option<BodyStream>,
    transferred_bytes: u64,
    connections_opened: u64,
}

impl HttpStore {
    /// Open a remote resource.
    ///
    /// This will send a HEAD request to get the file size, falling back to a
    /// GET whose body is kept as the first stream.
    pub async fn open(url: impl Into<String>, config: &RemoteConfig) -> Result<Self> {
        let url = url.into();
        let client = config.build_client(&url)?;
        let (metadata, response) = probe_with(&client, &url).await?;
        tracing::debug!(
            url = %url,
            length = metadata.length,
            ranges = metadata.accepts_ranges,
            "opened remote resource"
        );

        let connections_opened = if response.is_some() { 1 } else { 0 };
        Ok(Self {
            client,
            url,
            metadata,
            stream: response.map(|response| BodyStream::new(response, 0)),
            transferred_bytes: 0,
            connections_opened,
        })
    }

    /// Check that a resource is reachable and fetch its metadata without
    /// keeping a connection.
    pub async fn probe(url: &str, config: &RemoteConfig) -> Result<RemoteMetadata> {
        let client = config.build_client(url)?;
        let (metadata, _) = probe_with(&client, url).await?;
        Ok(metadata)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn metadata(&self) -> &RemoteMetadata {
        &self.metadata
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    /// Number of GET requests issued so far.
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened
    }

    /// Make sure the open stream is positioned at `offset`.
    async fn position_stream(&mut self, offset: u64) -> Result<()> {
        if let Some(stream) = self.stream.as_mut() {
            if stream.position == offset {
                return Ok(());
            }
            if stream.position < offset && offset - stream.position <= SKIP_AHEAD_LIMIT {
                let gap = offset - stream.position;
                let skipped = stream
                    .skip(gap)
                    .await
                    .map_err(|e| HandleError::remote(&self.url, e))?;
                self.transferred_bytes += skipped;
                if skipped == gap {
                    return Ok(());
                }
            }
        }

        self.stream = None;
        let stream = self.connect(offset).await?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn connect(&mut self, offset: u64) -> Result<BodyStream> {
        tracing::debug!(url = %self.url, offset, "connecting to remote resource");
        let mut request = self.client.get(&self.url);
        if offset > 0 && self.metadata.accepts_ranges {
            request = request.header(RANGE, format!("bytes={}-", offset));
        }
        let response = request
            .send()
            .await
            .map_err(|e| HandleError::remote(&self.url, e))?;
        self.connections_opened += 1;

        let status = response.status();
        let mut stream = if status == StatusCode::PARTIAL_CONTENT {
            BodyStream::new(response, offset)
        } else if status.is_success() {
            // Full body: the server ignored or was never sent a Range header
            BodyStream::new(response, 0)
        } else {
            return Err(HandleError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        };

        if stream.position < offset {
            let gap = offset - stream.position;
            let skipped = stream
                .skip(gap)
                .await
                .map_err(|e| HandleError::remote(&self.url, e))?;
            self.transferred_bytes += skipped;
        }
        Ok(stream)
    }
}

#[async_trait]
impl BackingStore for HttpStore {
    async fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.metadata.length {
            return Ok(0);
        }

        let available = (self.metadata.length - offset).min(buf.len() as u64) as usize;
        self.position_stream(offset).await?;

        let Some(stream) = self.stream.as_mut() else {
            return Ok(0);
        };
        if stream.position != offset {
            // body ended before reaching the offset
            self.stream = None;
            return Ok(0);
        }

        let received = stream
            .read(&mut buf[..available])
            .await
            .map_err(|e| HandleError::remote(&self.url, e))?;
        self.transferred_bytes += received as u64;
        if received < available {
            self.stream = None;
        }
        Ok(received)
    }

    fn size(&self) -> u64 {
        self.metadata.length
    }

    async fn close(&mut self) -> Result<()> {
        self.stream = None;
        Ok(())
    }
}

/// A response body being consumed front to back.
struct BodyStream {
    response: Response,
    position: u64,
    pending: Vec<u8>,
    consumed: usize,
}

impl BodyStream {
    fn new(response: Response, position: u64) -> Self {
        Self {
            response,
            position,
            pending: Vec::new(),
            consumed: 0,
        }
    }

    /// Ensure unconsumed bytes are pending. Returns false at end of body.
    async fn fill(&mut self) -> reqwest::Result<bool> {
        if self.consumed < self.pending.len() {
            return Ok(true);
        }
        match self.response.chunk().await? {
            Some(chunk) => {
                self.pending.clear();
                self.pending.extend_from_slice(&chunk);
                self.consumed = 0;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> reqwest::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() && self.fill().await? {
            let n = (self.pending.len() - self.consumed).min(buf.len() - filled);
            buf[filled..filled + n]
                .copy_from_slice(&self.pending[self.consumed..self.consumed + n]);
            self.consumed += n;
            filled += n;
        }
        self.position += filled as u64;
        Ok(filled)
    }

    async fn skip(&mut self, count: u64) -> reqwest::Result<u64> {
        let mut skipped = 0;
        while skipped < count && self.fill().await? {
            let n = ((self.pending.len() - self.consumed) as u64).min(count - skipped);
            self.consumed += n as usize;
            skipped += n;
        }
        self.position += skipped;
        Ok(skipped)
    }
}

/// HEAD first; fall back to GET when HEAD is refused or carries no length.
async fn probe_with(client: &Client, url: &str) -> Result<(RemoteMetadata, Option<Response>)> {
    let head = client
        .head(url)
        .send()
        .await
        .map_err(|e| HandleError::remote(url, e))?;

    if head.status().is_success() {
        if let Some(length) = header_length(&head) {
            return Ok((metadata_from(&head, length), None));
        }
    } else {
        tracing::debug!(url, status = %head.status(), "HEAD refused, falling back to GET");
    }

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HandleError::remote(url, e))?;
    if !response.status().is_success() {
        return Err(HandleError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    let length = header_length(&response)
        .or_else(|| response.content_length())
        .ok_or_else(|| HandleError::UnknownLength {
            url: url.to_string(),
        })?;
    Ok((metadata_from(&response, length), Some(response)))
}

fn header_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
}

fn metadata_from(response: &Response, length: u64) -> RemoteMetadata {
    let headers = response.headers();
    let accepts_ranges = headers
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("bytes"));
    let last_modified = headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    RemoteMetadata {
        length,
        accepts_ranges,
        last_modified,
    }
}
