//! Supervision of the controller's long-running tasks.
//!
//! The worker, pod watcher and HTTP server are expected to run until shutdown
//! is requested. If any of them stops on its own the controller is no longer
//! doing its job, so the remaining tasks are cancelled and the process exits
//! with an error instead of answering health checks indefinitely.

use std::future::Future;

use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A supervised task ended before shutdown was requested.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{task} stopped unexpectedly")]
    Stopped { task: &'static str },

    #[error("{task} failed: {source}")]
    Failed {
        task: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("task panicked: {0}")]
    Panicked(#[from] JoinError),
}

type TaskExit = (&'static str, Result<(), BoxError>);

/// A set of named tasks sharing one shutdown token.
#[derive(Debug)]
pub struct Supervisor {
    tasks: JoinSet<TaskExit>,
    shutdown: CancellationToken,
}

impl Supervisor {
    pub fn new(shutdown: CancellationToken) -> Self {
        Supervisor {
            tasks: JoinSet::new(),
            shutdown,
        }
    }

    /// Spawns a task that only ends when cancelled.
    pub fn spawn<F>(&mut self, task: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(async move {
            future.await;
            (task, Ok(()))
        });
    }

    /// Spawns a task that may fail.
    pub fn spawn_fallible<F, E>(&mut self, task: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.tasks.spawn(async move { (task, future.await.map_err(Into::into)) });
    }

    /// Runs until `signal` resolves or a task ends, then cancels the shutdown
    /// token and waits for every task.
    ///
    /// # Errors
    ///
    /// Returns the first task that ended before `signal` resolved.
    pub async fn run_until<S>(mut self, signal: S) -> Result<(), TaskError>
    where
        S: Future<Output = ()>,
    {
        let early_exit = tokio::select! {
            _ = signal => {
                info!("Shutdown requested");
                None
            }
            Some(joined) = self.tasks.join_next() => Some(unexpected_exit(joined)),
        };

        if let Some(e) = &early_exit {
            error!(error = %e, "Stopping controller");
        }
        self.shutdown.cancel();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((task, Err(e))) => warn!(task, error = %e, "Task failed during shutdown"),
                Err(e) => warn!(error = %e, "Task panicked during shutdown"),
            }
        }

        match early_exit {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn unexpected_exit(joined: Result<TaskExit, JoinError>) -> TaskError {
    match joined {
        Ok((task, Ok(()))) => TaskError::Stopped { task },
        Ok((task, Err(source))) => TaskError::Failed { task, source },
        Err(e) => TaskError::Panicked(e),
    }
}
