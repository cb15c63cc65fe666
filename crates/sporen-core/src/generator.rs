//! Adapter around the external diagram generator.
//!
//! The generator needs a one-time asynchronous initialization before `generate` may be called.
//! [`GeneratorAdapter`] starts that initialization lazily on the first request and memoizes it:
//! every request issued while it is still pending awaits the same shared future, and each of
//! them still produces its own generation call once it resolves.

use crate::error::GenerationError;
use crate::markup::TrustedSvg;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::{Cell, RefCell};
use std::fmt;

/// Error reported by a [`DiagramGenerator`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GeneratorFailure {
    pub message: String,
}

impl GeneratorFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The external capability turning a spore descriptor into vector markup.
pub trait DiagramGenerator {
    /// One-time initialization. The adapter calls this at most once per successful attempt.
    fn init(&self) -> LocalBoxFuture<'static, Result<(), GeneratorFailure>>;

    /// Renders the reference diagram, scaled so the frame height spans `height_um` micrometers.
    fn generate(
        &self,
        measurements: &str,
        shape: &str,
        label: &str,
        height_um: f64,
    ) -> Result<String, GeneratorFailure>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Issue order; only the outcome of the latest request is applied.
    pub seq: u64,
    pub measurements: String,
    pub shape: String,
    pub label: String,
    pub height_um: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub seq: u64,
    pub result: Result<TrustedSvg, GenerationError>,
}

type InitFuture = Shared<LocalBoxFuture<'static, Result<(), GeneratorFailure>>>;

pub struct GeneratorAdapter<G> {
    generator: G,
    init: RefCell<Option<InitFuture>>,
    init_attempts: Cell<usize>,
}

impl<G> fmt::Debug for GeneratorAdapter<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorAdapter")
            .field("init_attempts", &self.init_attempts.get())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl<G> GeneratorAdapter<G> {
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Number of times the generator's `init` has been started.
    pub fn init_attempts(&self) -> usize {
        self.init_attempts.get()
    }

    pub fn is_ready(&self) -> bool {
        self.init
            .borrow()
            .as_ref()
            .is_some_and(|fut| matches!(fut.peek(), Some(Ok(()))))
    }
}

impl<G: DiagramGenerator> GeneratorAdapter<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            init: RefCell::new(None),
            init_attempts: Cell::new(0),
        }
    }

    fn init_future(&self) -> InitFuture {
        let mut slot = self.init.borrow_mut();
        if let Some(fut) = slot.as_ref() {
            // A failed attempt is not cached; the next request starts a fresh one.
            if !matches!(fut.peek(), Some(Err(_))) {
                return fut.clone();
            }
        }

        let attempt = self.init_attempts.get() + 1;
        self.init_attempts.set(attempt);
        tracing::debug!(attempt, "starting diagram generator initialization");

        let fut = self
            .generator
            .init()
            .inspect(move |result| match result {
                Ok(()) => tracing::info!(attempt, "diagram generator ready"),
                Err(err) => tracing::warn!(attempt, %err, "diagram generator initialization failed"),
            })
            .boxed_local()
            .shared();
        *slot = Some(fut.clone());
        fut
    }

    /// Resolves once the generator is initialized.
    pub async fn ready(&self) -> Result<(), GenerationError> {
        let fut = self.init_future();
        fut.await.map_err(|failure| GenerationError::Init {
            message: failure.message,
        })
    }

    /// Waits for initialization, then performs the generation call for `request`.
    pub async fn run(&self, request: GenerationRequest) -> GenerationOutcome {
        let result = match self.ready().await {
            Ok(()) => self.generate_now(&request),
            Err(err) => Err(err),
        };
        GenerationOutcome {
            seq: request.seq,
            result,
        }
    }

    fn generate_now(&self, request: &GenerationRequest) -> Result<TrustedSvg, GenerationError> {
        self.generator
            .generate(
                &request.measurements,
                &request.shape,
                &request.label,
                request.height_um,
            )
            .map(TrustedSvg::trust)
            .map_err(|failure| GenerationError::Generate {
                label: request.label.clone(),
                message: failure.message,
            })
    }
}
