//! Process composition root: builds every subsystem's concrete dependencies
//! and runs them to completion under one shutdown signal.

pub mod config;
pub mod extractor;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use harvester_common::{internal, logging, Signal};
use harvester_tracing::traced;
use harvester_control::{ControlServer, ControlState};
use harvester_credential::{CredentialRefresher, HttpCredentialProvider};
use harvester_crawl::CrawlHandler;
use harvester_health::{HealthChecker, HealthServer};
use harvester_queue::backends::MemoryQueueClient;
use harvester_queue::{ConsumerEngine, IdempotencyStore, QueueClient, Router};
use harvester_state::backends::{
    MemoryCrawlStateStore, MemoryObjectStore, MemoryProcessedUrlStore, MemoryTaskStore,
};
use tokio::sync::broadcast;

pub use config::HarvesterConfig;
use extractor::FetchExtractor;

/// Global shutdown broadcast, subscribed to by every long-lived loop.
pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!("CTRL+C entered -- Enter it again to force shutdown");
        }
        _ = terminate.recv() => {
            internal!("Terminate signal received, shutting down");
        }
    }

    let mut receiver = SHUTDOWN_BROADCAST.subscribe();

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    loop {
        tokio::select! {
            sig = receiver.recv() => {
                match sig {
                    Ok(s) => tracing::debug!("Received {s:?}"),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(e) => tracing::debug!("Received: {e:?}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    Ok(())
}

/// Periodically mirrors subsystem state into the health checker. None of
/// the subsystems call back into health directly; this keeps them
/// decoupled from the health crate.
async fn health_poll(
    consumer: Arc<ConsumerEngine>,
    queue: Arc<dyn QueueClient>,
    credential: Arc<CredentialRefresher>,
    health_checker: Arc<HealthChecker>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    loop {
        ticker.tick().await;

        health_checker.set_consumer_ready(consumer.is_running() && !consumer.is_paused());
        health_checker.set_scheduler_ready(true);
        health_checker.set_credential_ready(credential.current().await.is_ok());

        if let Ok(attrs) = queue.queue_attributes().await {
            health_checker.set_queue_size(attrs.approximate_number_of_messages);
        }
    }
}

/// Owns every subsystem for the lifetime of the process.
pub struct Harvester {
    config: HarvesterConfig,
}

impl Harvester {
    #[must_use]
    pub const fn new(config: HarvesterConfig) -> Self {
        Self { config }
    }

    /// Builds concrete adapters, wires every subsystem together, and runs
    /// them until a shutdown signal arrives.
    ///
    /// # Errors
    /// Returns an error if any server fails to bind, or if a subsystem loop
    /// exits with an unrecoverable error.
    #[traced(instrument(level = harvester_common::tracing::Level::TRACE, skip_all, err), timing(precision = "s"))]
    pub async fn run(self) -> anyhow::Result<()> {
        logging::init();
        internal!("Harvester starting");

        if let Err(e) = harvester_metrics::init_metrics(&self.config.metrics) {
            tracing::warn!("Metrics initialization failed, continuing without metrics: {e}");
        }

        let queue: Arc<dyn QueueClient> = Arc::new(MemoryQueueClient::new());
        let tasks: Arc<dyn harvester_state::TaskStore> = Arc::new(MemoryTaskStore::new());
        let processed_urls: Arc<dyn harvester_state::ProcessedUrlStore> =
            Arc::new(MemoryProcessedUrlStore::new());
        let crawl_state: Arc<dyn harvester_state::CrawlStateStore> =
            Arc::new(MemoryCrawlStateStore::new());
        let object_store: Arc<dyn harvester_state::ObjectStore> =
            Arc::new(MemoryObjectStore::new());

        let http_client = reqwest::Client::new();
        let extractor: Arc<dyn harvester_crawl::ArticleExtractor> =
            Arc::new(FetchExtractor::new(http_client.clone()));

        let crawl_handler = Arc::new(CrawlHandler::new(
            extractor.clone(),
            object_store,
            crawl_state,
        ));
        let router = Arc::new(Router::new().with_handler("crawl-single-url", crawl_handler));
        let idempotency = Arc::new(IdempotencyStore::new());

        let consumer = Arc::new(self.config.consumer);
        let scheduler = Arc::new(self.config.scheduler);

        let credential_provider = Arc::new(HttpCredentialProvider::new(
            http_client,
            self.config.credential_endpoint.clone(),
        ));
        let credential = Arc::new(CredentialRefresher::new(credential_provider));

        let health_checker = Arc::new(HealthChecker::new(self.config.health.max_queue_size));
        let health_server = if self.config.health.enabled {
            Some(HealthServer::new(self.config.health, health_checker.clone()).await?)
        } else {
            None
        };

        let control_state = ControlState {
            consumer: consumer.clone(),
            queue: queue.clone(),
            tasks: tasks.clone(),
            credential: credential.clone(),
            extractor,
        };
        let control_server =
            ControlServer::new(&self.config.control_listen_address, control_state).await?;

        internal!("All subsystems wired, entering serve loop");

        tokio::select! {
            r = consumer.clone().serve(queue.clone(), router, idempotency, SHUTDOWN_BROADCAST.subscribe()) => {
                r.map_err(anyhow::Error::from)
            }
            r = scheduler.serve(tasks, processed_urls, queue.clone(), SHUTDOWN_BROADCAST.subscribe()) => {
                r.map_err(anyhow::Error::from)
            }
            r = credential.clone().serve(SHUTDOWN_BROADCAST.subscribe()) => {
                r.map_err(anyhow::Error::from)
            }
            r = control_server.serve(SHUTDOWN_BROADCAST.subscribe()) => {
                r.map_err(anyhow::Error::from)
            }
            r = async {
                match health_server {
                    Some(server) => server.serve(SHUTDOWN_BROADCAST.subscribe()).await.map_err(anyhow::Error::from),
                    None => std::future::pending::<Result<(), anyhow::Error>>().await,
                }
            } => {
                r
            }
            () = health_poll(consumer, queue, credential, health_checker) => {
                Ok(())
            }
            r = shutdown() => {
                r
            }
        }?;

        internal!("Harvester shutting down");

        Ok(())
    }
}
