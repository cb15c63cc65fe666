use crate::drag::DragHoverState;
use crate::error::{GenerationError, IngestionError};
use crate::ingest::CanonicalImage;
use crate::markup::TrustedSvg;

/// Overlay opacity in percent, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImageOpacity(u8);

impl ImageOpacity {
    pub const DEFAULT: Self = Self(30);

    /// Values above 100 are clamped.
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// The opacity as a `0.0..=1.0` alpha value.
    pub fn alpha(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for ImageOpacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything the composite view needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct CompositeInput<'a> {
    pub markup: Option<&'a TrustedSvg>,
    pub image: Option<&'a CanonicalImage>,
    pub opacity: ImageOpacity,
    pub citation: &'a str,
    pub hover: DragHoverState,
    /// Set while the latest generation request failed; the previous markup is still shown.
    pub failure: Option<&'a GenerationError>,
    pub notice: Option<&'a IngestionError>,
}

impl CompositeInput<'_> {
    /// Caption line under the frame; `None` when there is no citation.
    pub fn caption(&self, prefix: &str) -> Option<String> {
        if self.citation.is_empty() {
            return None;
        }
        Some(format!("{prefix}{}", self.citation))
    }

    /// The "drop or choose a file" prompt replaces the image layer while no image is loaded.
    pub fn shows_call_to_action(&self) -> bool {
        self.image.is_none()
    }
}
