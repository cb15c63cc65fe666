#![forbid(unsafe_code)]

//! Spore viewer session core (headless).
//!
//! Browse a species catalog, select a species, and keep a reference diagram of its spores in
//! sync with the chosen physical scale, optionally overlaid with a microscope photograph.
//!
//! Design goals:
//! - single-threaded, executor-agnostic async (no specific runtime required)
//! - outcomes of superseded requests are discarded, never applied out of order
//! - generator output stays a distinct trusted-markup type end to end

pub mod catalog;
pub mod config;
pub mod drag;
pub mod error;
pub mod generator;
pub mod ingest;
pub mod markup;
pub mod search;
pub mod selection;
pub mod session;
pub mod view;

pub use catalog::{Catalog, SpeciesRecord};
pub use config::{SessionSettings, SiteConfig};
pub use drag::{DragEvent, DragHoverState, DragState};
pub use error::{CatalogLoadError, Error, GenerationError, IngestionError, Result};
pub use generator::{
    DiagramGenerator, GenerationOutcome, GenerationRequest, GeneratorAdapter, GeneratorFailure,
};
pub use ingest::{CanonicalImage, DroppedFile, IngestJob, IngestOutcome, IngestionMode};
pub use markup::TrustedSvg;
pub use search::{EmptyQueryPolicy, SearchFilter};
pub use selection::{DiagramHeight, SelectionController};
pub use session::{GenerationStatus, Session, SessionSnapshot, regenerate};
pub use view::{CompositeInput, ImageOpacity};

#[cfg(test)]
mod tests;
