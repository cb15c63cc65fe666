pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    CatalogLoad(#[from] CatalogLoadError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error("Unknown species: {name}")]
    UnknownSpecies { name: String },

    #[error("Invalid diagram height: {value} (expected a positive number of micrometers)")]
    InvalidHeight { value: f64 },
}

/// Raised by the catalog loader before a session is created.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog entry #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Duplicate species name in catalog: {name}")]
    DuplicateName { name: String },
}

/// The diagram generator failed to initialize or to produce markup.
///
/// Recovered inside the session: the previous diagram stays visible and the failure is
/// reported through [`crate::session::GenerationStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Diagram generator failed to initialize: {message}")]
    Init { message: String },

    #[error("Diagram generation failed for {label}: {message}")]
    Generate { label: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("Dropped item is not an image (media type: {media_type:?})")]
    NotAnImage { media_type: String },

    #[error("No file was provided")]
    Empty,

    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    #[error("Image too large to rescale: {width}x{height} pixels")]
    TooLarge { width: u32, height: u32 },

    #[error("Failed to encode canonical image: {message}")]
    Encode { message: String },
}

impl IngestionError {
    /// Rejections that are dropped without telling the user (non-image drops, empty drops).
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::NotAnImage { .. } | Self::Empty)
    }
}
