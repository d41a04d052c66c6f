//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive skills and progression.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use rpg_content::ContentBundle;
use rpg_core::Roster;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventStream, Topic};
use crate::repository::ClassPathRepository;
use crate::workers::{Command, PersistenceWorker, ProgressUpdate, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Wall-clock period of one logical clock step.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub persistence_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            event_buffer_size: 100,
            command_buffer_size: 32,
            persistence_buffer_size: 64,
        }
    }
}

/// Main runtime that orchestrates the skill simulation
///
/// Runtime owns workers and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
    persistence_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Workers stop once every handle clone has been dropped; pending
    /// progress updates are flushed before this returns.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        if let Some(persistence_handle) = self.persistence_worker_handle {
            persistence_handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        info!(target: "runtime", "runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Roster,
    content: ContentBundle,
    repository: Option<Arc<dyn ClassPathRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: Roster::new(),
            content: ContentBundle::default(),
            repository: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide the actors present at startup
    pub fn world(mut self, world: Roster) -> Self {
        self.world = world;
        self
    }

    /// Provide skills, class paths and skill settings
    pub fn content(mut self, content: ContentBundle) -> Self {
        self.content = content;
        self
    }

    /// Persist class path progress through `repository` (optional)
    ///
    /// Without a repository progress lives only as long as the runtime.
    pub fn repository(mut self, repository: Arc<dyn ClassPathRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let stream = EventStream::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, stream.clone());

        let (persistence_tx, persistence_worker_handle) = match &self.repository {
            Some(repository) => {
                let (update_tx, update_rx) =
                    mpsc::channel::<ProgressUpdate>(self.config.persistence_buffer_size);
                let worker = PersistenceWorker::new(Arc::clone(repository), update_rx);
                let join = tokio::spawn(async move {
                    worker.run().await;
                });
                (Some(update_tx), Some(join))
            }
            None => (None, None),
        };

        let sim_worker = SimulationWorker::new(
            self.world,
            self.content,
            self.config.tick_interval,
            command_rx,
            stream,
            self.repository,
            persistence_tx,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        info!(
            target: "runtime",
            tick_ms = self.config.tick_interval.as_millis() as u64,
            persistence = persistence_worker_handle.is_some(),
            "runtime started"
        );

        Ok(Runtime {
            handle,
            sim_worker_handle,
            persistence_worker_handle,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
