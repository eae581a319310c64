//! One-shot initialization of the foreign runtime.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Why the foreign runtime never became ready. Every waiter receives the
/// same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("foreign runtime failed to initialize: {message}")]
pub struct InitFailure {
    message: String,
}

impl InitFailure {
    /// Create a failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message, including its context chain.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for InitFailure {
    fn from(error: anyhow::Error) -> Self {
        Self::new(format!("{:#}", error))
    }
}

type Readiness<R> = Shared<BoxFuture<'static, Result<Arc<R>, InitFailure>>>;

/// Process-wide handle to a runtime that initializes exactly once.
///
/// The initializer runs the first time anyone waits on the gate (or when
/// [`start`](Self::start) drives it eagerly). Every other caller waits on
/// the same future and observes the same outcome, success or failure.
///
/// # Example
///
/// ```
/// use cmdbridge::runtime::RuntimeGate;
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// rt.block_on(async {
///     let gate = RuntimeGate::new(async { Ok::<_, anyhow::Error>(42u32) });
///     let (a, b) = tokio::join!(gate.ready(), gate.ready());
///     assert_eq!(*a.unwrap(), 42);
///     assert_eq!(*b.unwrap(), 42);
/// });
/// ```
pub struct RuntimeGate<R> {
    readiness: Readiness<R>,
}

impl<R> Clone for RuntimeGate<R> {
    fn clone(&self) -> Self {
        Self {
            readiness: self.readiness.clone(),
        }
    }
}

impl<R: Send + Sync + 'static> RuntimeGate<R> {
    /// A gate whose runtime is produced by `init`.
    pub fn new<F>(init: F) -> Self
    where
        F: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        let readiness = async move {
            tracing::info!("initializing foreign runtime");
            match init.await {
                Ok(runtime) => {
                    tracing::info!("foreign runtime ready");
                    Ok(Arc::new(runtime))
                }
                Err(e) => {
                    let failure = InitFailure::from(e);
                    tracing::warn!(error = %failure, "foreign runtime initialization failed");
                    Err(failure)
                }
            }
        }
        .boxed()
        .shared();
        Self { readiness }
    }

    /// A gate that is already open.
    pub fn ready_with(runtime: Arc<R>) -> Self {
        Self {
            readiness: futures_util::future::ready(Ok(runtime)).boxed().shared(),
        }
    }

    /// Wait until the runtime is ready or has failed.
    pub async fn ready(&self) -> Result<Arc<R>, InitFailure> {
        self.readiness.clone().await
    }

    /// The outcome, if initialization has finished.
    pub fn outcome(&self) -> Option<Result<Arc<R>, InitFailure>> {
        self.readiness.peek().cloned()
    }

    /// Whether the runtime is ready for use.
    pub fn is_ready(&self) -> bool {
        matches!(self.readiness.peek(), Some(Ok(_)))
    }

    /// Drive initialization on a background task without waiting for it.
    pub fn start(&self) {
        let readiness = self.readiness.clone();
        tokio::spawn(async move {
            let _ = readiness.await;
        });
    }
}

impl<R> fmt::Debug for RuntimeGate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.readiness.peek() {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("RuntimeGate").field("state", &state).finish()
    }
}
