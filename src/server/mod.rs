//! TCP line protocol server.
//!
//! One tokio task per connection. Each question is answered on the blocking
//! pool under the configured lookup timeout; failures are turned into their
//! fixed client messages.

pub mod protocol;
pub mod registry;

pub use protocol::{read_request, write_reply, Request, TERMINATOR};
pub use registry::{IndexRegistry, SharedIndex};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{QaError, Result};
use crate::model::Language;
use crate::qa::{Engine, PredicateCatalog};

/// Question answering server shared by all connections.
pub struct QaServer {
    registry: Arc<IndexRegistry>,
    catalog: Arc<PredicateCatalog>,
    language: Language,
    timeout: Duration,
}

impl QaServer {
    pub fn new(registry: IndexRegistry, catalog: PredicateCatalog, language: Language, timeout: Duration) -> Self {
        Self {
            registry: Arc::new(registry),
            catalog: Arc::new(catalog),
            language,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            IndexRegistry::from_config(config),
            config.catalog(),
            config.language(),
            config.lookup_timeout(),
        )
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    /// Answer `question` against the index named `index_name`.
    ///
    /// Opening the index counts against the timeout like the lookups do.
    pub async fn answer(&self, question: &str, index_name: &str) -> Result<String> {
        let registry = self.registry.clone();
        let catalog = self.catalog.clone();
        let language = self.language.clone();
        let question = question.to_string();
        let index_name = index_name.to_string();
        run_with_timeout(self.timeout, move || {
            let index = registry.get(&index_name)?;
            Engine::with_catalog(index, catalog, language).answer(&question)
        })
        .await
    }

    /// Reply text for a request: the answer, or the fixed message of its failure.
    pub async fn reply(&self, request: &Request) -> String {
        match self.answer(&request.question, &request.index).await {
            Ok(text) => text,
            Err(e) => {
                match &e {
                    QaError::Database(_) | QaError::Io(_) | QaError::Timeout(_) => {
                        log::warn!("Request on {} failed: {}", request.index, e)
                    }
                    _ => log::debug!("Request on {} failed: {}", request.index, e),
                }
                e.user_message().to_string()
            }
        }
    }

    /// Bind `addr` and serve until the listener fails.
    pub async fn serve(self: Arc<Self>, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("FactQA server listening on {}", listener.local_addr()?);
        self.run(listener).await
    }

    /// Accept connections on an already bound listener.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = self.clone();
            tokio::spawn(async move {
                let request_id = Uuid::new_v4();
                if let Err(e) = server.handle_connection(stream, peer, request_id).await {
                    log::warn!("[{}] connection from {} failed: {}", request_id, peer, e);
                }
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream, peer: SocketAddr, request_id: Uuid) -> Result<()> {
        log::debug!("[{}] connection established from {}", request_id, peer);
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let reply = match read_request(&mut reader).await {
            Ok(request) => {
                log::info!("[{}] index={} question={:?}", request_id, request.index, request.question.trim_end());
                self.reply(&request).await
            }
            Err(e) => {
                log::warn!("[{}] unreadable request: {}", request_id, e);
                e.user_message().to_string()
            }
        };
        write_reply(&mut write_half, &reply).await?;

        let mut ack = String::new();
        match tokio::time::timeout(self.timeout, reader.read_line(&mut ack)).await {
            Ok(Ok(0)) => log::debug!("[{}] client closed without acknowledgement", request_id),
            Ok(Ok(_)) => log::debug!("[{}] client acknowledged: {}", request_id, ack.trim_end()),
            Ok(Err(e)) => log::debug!("[{}] failed to read acknowledgement: {}", request_id, e),
            Err(_) => log::debug!("[{}] no acknowledgement within {:?}", request_id, self.timeout),
        }
        Ok(())
    }
}

/// Run blocking work on tokio's blocking pool, bounded by `timeout`.
///
/// The work is not cancelled on timeout; its result is discarded.
pub async fn run_with_timeout<T, F>(timeout: Duration, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(QaError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("question task failed: {}", e),
        ))),
        Err(_) => Err(QaError::Timeout(timeout.as_millis() as u64)),
    }
}
