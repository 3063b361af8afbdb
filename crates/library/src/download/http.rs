use crate::download::error::{ErrorKind, Result};
use crate::download::transport::{Transport, TransportEvent};
use async_stream::try_stream;
use exn::ResultExt;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// [`Transport`] over HTTP(S), streaming the response body to disk.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn fetch_to_file<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxStream<'a, Result<TransportEvent>> {
        let transport = || ErrorKind::Transport(url.to_string());
        try_stream! {
            let response = self.client.get(url).send().await.or_raise(transport)?;
            let response = response.error_for_status().or_raise(transport)?;
            let total = response.content_length();
            tracing::debug!(url, ?total, "Downloading");

            let mut file = File::create(dest).await.or_raise(|| ErrorKind::Io(dest.to_path_buf()))?;
            let mut received = 0u64;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.or_raise(transport)?;
                file.write_all(&chunk).await.or_raise(|| ErrorKind::Io(dest.to_path_buf()))?;
                received += chunk.len() as u64;
                yield TransportEvent::Progress { received, total };
            }
            file.flush().await.or_raise(|| ErrorKind::Io(dest.to_path_buf()))?;
            yield TransportEvent::Finished { path: dest.to_path_buf() };
        }
        .boxed()
    }
}
