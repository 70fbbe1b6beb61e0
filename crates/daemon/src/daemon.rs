// SPDX-License-Identifier: MIT

//! [`Daemon`]: process-scope glue (spec §4.4) — owns the bus connections,
//! the exported-object registry, the `Service` instance, the cache-root
//! path, and a deferred `quit_error`. It is deliberately thin: "Service and
//! TaskEngine depend on its registry and bus handles" is the whole reason it
//! exists, grounded on the teacher's `lifecycle::DaemonState` holding the
//! same kind of shared handles for its own listener/runtime.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use reportd_bus::{BusClient, ObjectServer};
use reportd_core::{WorkflowCatalogue, WorkflowLoadError};
use reportd_runner::{EventRunner, EventTable, EventTableLoadError};
use reportd_service::{RunnerBuilder, Service};

use crate::cli::BusKind;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("XDG_RUNTIME_DIR is not set; cannot locate the per-user cache root")]
    NoRuntimeDir,

    #[error("creating cache root {path}: {source}")]
    CacheRootCreate { path: String, #[source] source: std::io::Error },

    #[error("loading workflow catalogue: {0}")]
    WorkflowLoad(#[from] WorkflowLoadError),

    #[error("loading event table: {0}")]
    EventLoad(#[from] EventTableLoadError),
}

/// Process-scope context (spec §4.4). Generic over the bus and event-runner
/// collaborators, the same way [`Service`] is — this crate only adds the
/// lifetime/registry glue around it.
pub struct Daemon<B: BusClient, R: EventRunner> {
    bus_kind: BusKind,
    cache_root: PathBuf,
    service: Arc<Service<B, R>>,
    shutdown: CancellationToken,
    quit_error: Mutex<Option<String>>,
}

impl<B: BusClient + 'static, R: EventRunner + 'static> Daemon<B, R> {
    /// Acquire the system connection (ProblemCache always needs it), create
    /// the cache root with mode 0700 (spec §4.1), load the workflow
    /// catalogue and event table, and build the `Service` façade bound to
    /// them.
    pub fn connect(
        bus_kind: BusKind,
        bus_client: Arc<B>,
        object_server: Arc<dyn ObjectServer>,
        workflows_dir: &std::path::Path,
        events_dir: &std::path::Path,
        runner_builder: RunnerBuilder<R>,
    ) -> Result<Self, DaemonError> {
        let cache_root = crate::env::cache_root()?;
        ensure_private_dir(&cache_root)?;

        let catalogue = WorkflowCatalogue::load_dir(workflows_dir)?;
        let events = EventTable::load_dir(events_dir)?;

        let service = Arc::new(Service::new(
            cache_root.clone(),
            bus_client,
            object_server,
            catalogue,
            events,
            runner_builder,
        ));

        Ok(Self {
            bus_kind,
            cache_root,
            service,
            shutdown: CancellationToken::new(),
            quit_error: Mutex::new(None),
        })
    }

    pub fn bus_kind(&self) -> BusKind {
        self.bus_kind
    }

    pub fn cache_root(&self) -> &std::path::Path {
        &self.cache_root
    }

    pub fn service(&self) -> &Arc<Service<B, R>> {
        &self.service
    }

    /// Records the first fatal error and stops the main loop; a no-op once
    /// the loop has already exited (spec §4.4: "becoming a no-op after the
    /// loop has exited").
    pub fn quit(&self, error: Option<String>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        if let Some(error) = error {
            self.quit_error.lock().get_or_insert(error);
        }
        self.shutdown.cancel();
    }

    /// Block until `quit` is called, either from a caught `SIGINT`/`SIGTERM`
    /// (spec §6) or from a fatal error recorded elsewhere. Returns the first
    /// recorded error, if any.
    pub async fn run(&self) -> Result<(), String> {
        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            _ = wait_for_quit_signal() => {
                self.quit(None);
            }
        }
        match self.quit_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn ensure_private_dir(path: &std::path::Path) -> Result<(), DaemonError> {
    std::fs::create_dir_all(path)
        .map_err(|source| DaemonError::CacheRootCreate { path: path.display().to_string(), source })?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|source| DaemonError::CacheRootCreate { path: path.display().to_string(), source })
}

#[cfg(unix)]
async fn wait_for_quit_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigint = signal(SignalKind::interrupt());
    let sigterm = signal(SignalKind::terminate());
    let (mut sigint, mut sigterm) = match (sigint, sigterm) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(%err, "installing signal handler, quit signals will be ignored");
            loop {
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = sigint.recv() => tracing::info!("caught SIGINT, shutting down"),
        _ = sigterm.recv() => tracing::info!("caught SIGTERM, shutting down"),
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
