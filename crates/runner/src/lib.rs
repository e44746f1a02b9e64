//! Concurrent runner for long-lived processes with graceful shutdown.
//!
//! All processes share one `CancellationToken`. SIGINT/SIGTERM, or the first process
//! error, cancels it. Once every process has returned, closers run under a timeout.
//!
//! # Example
//!
//! ```no_run
//! use climon_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Runner::new()
//!         .with_named_process("heartbeat", |ctx| async move {
//!             loop {
//!                 tokio::select! {
//!                     _ = ctx.cancelled() => break,
//!                     _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                         tracing::info!("still alive");
//!                     }
//!                 }
//!             }
//!             Ok(())
//!         })
//!         .with_closer(|| async move { Ok(()) })
//!         .run()
//!         .await;
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A boxed app process: takes the shared cancellation token, runs until it is
/// cancelled or fails.
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxedTask + Send>;

/// A boxed cleanup function run after all processes stop.
pub type Closer = Box<dyn FnOnce() -> BoxedTask + Send>;

pub type BoxedTask = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

fn box_process<F, Fut>(process: F) -> AppProcess
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
{
    Box::new(move |token| -> BoxedTask { Box::pin(process(token)) })
}

pub struct Runner {
    app_processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Closer timeout defaults to 10 seconds.
    pub fn new() -> Self {
        Self {
            app_processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds an unnamed app process. It is logged as `process-{index}`.
    pub fn with_app_process<F, Fut>(self, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        let name = format!("process-{}", self.app_processes.len());
        self.with_boxed_process(name, box_process(process))
    }

    /// Adds an app process under a name used in logs.
    pub fn with_named_process<F, Fut>(self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.with_boxed_process(name.into(), box_process(process))
    }

    /// Adds an already boxed process, as produced by `into_runner_process` helpers.
    pub fn with_boxed_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.app_processes.push((name.into(), process));
        self
    }

    /// Adds a closer. Every closer runs even if others fail.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers
            .push(Box::new(move || -> BoxedTask { Box::pin(closer()) }));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Uses an externally owned token, so callers can trigger shutdown.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs until shutdown, then exits the process (code 1 if a process failed).
    pub async fn run(self) {
        match self.run_until_stopped().await {
            Ok(()) => {
                tracing::info!("application exiting normally");
                std::process::exit(0);
            }
            Err(err) => {
                tracing::error!(error = %format!("{:#}", err), "application exiting with error");
                std::process::exit(1);
            }
        }
    }

    /// Runs all processes until they finish, a signal arrives or one of them fails,
    /// then runs closers. Returns the first process error.
    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for (name, process) in self.app_processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                tracing::debug!(process = %name, "starting app process");
                let result = process(process_token).await;
                (name, result)
            });
        }

        spawn_signal_handlers(token.clone());

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    tracing::debug!(process = %name, "app process completed");
                }
                Ok((name, Err(err))) => {
                    if !token.is_cancelled() {
                        tracing::error!(
                            process = %name,
                            error = %format!("{:#}", err),
                            "app process failed"
                        );
                        first_error = Some(err);
                        token.cancel();
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "app process panicked");
                    if !token.is_cancelled() {
                        first_error = Some(anyhow::anyhow!("app process panicked: {}", err));
                        token.cancel();
                    }
                }
            }
        }

        if !self.closers.is_empty() {
            tracing::info!(timeout = ?self.closer_timeout, "running closers");
            match tokio::time::timeout(self.closer_timeout, run_closers(self.closers)).await {
                Ok(()) => tracing::info!("all closers completed"),
                Err(_) => tracing::error!(timeout = ?self.closer_timeout, "closers timed out"),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("received shutdown signal");
                ctrl_c_token.cancel();
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for ctrl-c"),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("received SIGTERM signal");
                token.cancel();
            }
            Err(err) => tracing::error!(error = %err, "failed to set up SIGTERM handler"),
        }
    });
}

async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();
    for closer in closers {
        closer_set.spawn(async move { closer().await });
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => tracing::debug!("closer completed"),
            Ok(Err(err)) => tracing::error!(error = %format!("{:#}", err), "closer failed"),
            Err(err) => tracing::error!(error = %err, "closer panicked"),
        }
    }
}
