//! Session state container.
//!
//! A [`Session`] owns all mutable state of one viewer: the search box, the selection, the
//! current diagram, the calibration image, overlay opacity and drag feedback. Views read an
//! immutable [`SessionSnapshot`]; input handlers call the update methods.
//!
//! Asynchronous work (generator initialization, image decoding) never runs while the session
//! is borrowed. Update methods hand out a [`GenerationRequest`] or an [`IngestJob`]; the caller
//! runs it and feeds the outcome back through [`Session::apply_generation`] /
//! [`Session::finish_ingest`], which drop anything superseded in the meantime.

use crate::catalog::{Catalog, SpeciesRecord};
use crate::config::SessionSettings;
use crate::drag::{DragEvent, DragHoverState, DragState};
use crate::error::{Error, GenerationError, IngestionError, Result};
use crate::generator::{DiagramGenerator, GenerationOutcome, GenerationRequest, GeneratorAdapter};
use crate::ingest::{CanonicalImage, DroppedFile, IngestJob, IngestOutcome, Ingestor};
use crate::markup::TrustedSvg;
use crate::search::SearchFilter;
use crate::selection::{DiagramHeight, SelectionController};
use crate::view::{CompositeInput, ImageOpacity};
use std::cell::RefCell;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Pending {
        seq: u64,
    },
    Failed {
        seq: u64,
        error: GenerationError,
    },
}

impl GenerationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The error of the latest request, if it failed.
    pub fn failure(&self) -> Option<&GenerationError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    settings: SessionSettings,
    search: SearchFilter,
    selection: SelectionController,
    markup: Option<TrustedSvg>,
    citation: String,
    status: GenerationStatus,
    ingestor: Ingestor,
    image: Option<CanonicalImage>,
    notice: Option<IngestionError>,
    opacity: ImageOpacity,
    drag: DragState,
}

/// Read-only view of a [`Session`] for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot<'a> {
    pub query: &'a str,
    pub visible: Vec<&'a SpeciesRecord>,
    pub selected: Option<&'a SpeciesRecord>,
    pub height: DiagramHeight,
    pub markup: Option<&'a TrustedSvg>,
    pub citation: &'a str,
    pub status: &'a GenerationStatus,
    pub image: Option<&'a CanonicalImage>,
    pub opacity: ImageOpacity,
    pub hover: DragHoverState,
    pub notice: Option<&'a IngestionError>,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_settings(catalog, SessionSettings::default())
    }

    pub fn with_settings(catalog: Catalog, settings: SessionSettings) -> Self {
        let search = SearchFilter::new(&catalog, settings.empty_query);
        Self {
            search,
            selection: SelectionController::new(settings.initial_height),
            markup: None,
            citation: String::new(),
            status: GenerationStatus::Idle,
            ingestor: Ingestor::new(settings.picker_mode, settings.frame_edge),
            image: None,
            notice: None,
            opacity: settings.initial_opacity,
            drag: DragState::default(),
            catalog,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search.set_query(&self.catalog, query);
    }

    pub fn visible_species(&self) -> Vec<&SpeciesRecord> {
        self.search.visible(&self.catalog)
    }

    pub fn selected(&self) -> Option<&SpeciesRecord> {
        self.selection.selected()
    }

    pub fn height(&self) -> DiagramHeight {
        self.selection.height()
    }

    pub fn markup(&self) -> Option<&TrustedSvg> {
        self.markup.as_ref()
    }

    pub fn citation(&self) -> &str {
        &self.citation
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    pub fn image(&self) -> Option<&CanonicalImage> {
        self.image.as_ref()
    }

    pub fn notice(&self) -> Option<&IngestionError> {
        self.notice.as_ref()
    }

    pub fn opacity(&self) -> ImageOpacity {
        self.opacity
    }

    pub fn hover(&self) -> DragHoverState {
        self.drag.hover()
    }

    /// Selects a species by name. The calibration image and opacity are kept.
    pub fn select_species(&mut self, name: &str) -> Result<GenerationRequest> {
        let Some(record) = self.catalog.get(name) else {
            return Err(Error::UnknownSpecies {
                name: name.to_string(),
            });
        };
        let request = self.selection.select(record);
        self.status = GenerationStatus::Pending { seq: request.seq };
        Ok(request)
    }

    /// Sets the diagram height. Returns a request when a species is selected.
    pub fn set_height(&mut self, micrometers: f64) -> Result<Option<GenerationRequest>> {
        let Some(height) = DiagramHeight::new(micrometers) else {
            return Err(Error::InvalidHeight { value: micrometers });
        };
        let request = self.selection.set_height(height);
        if let Some(request) = &request {
            self.status = GenerationStatus::Pending { seq: request.seq };
        }
        Ok(request)
    }

    /// Applies a generation outcome. Returns `false` when it was superseded by a newer request.
    pub fn apply_generation(&mut self, outcome: GenerationOutcome) -> bool {
        if !self.selection.is_current(outcome.seq) {
            tracing::debug!(
                seq = outcome.seq,
                latest = ?self.selection.latest_seq(),
                "discarding stale diagram"
            );
            return false;
        }

        match outcome.result {
            Ok(markup) => {
                self.markup = Some(markup);
                self.citation = self
                    .selection
                    .selected()
                    .map(|record| record.citation().to_string())
                    .unwrap_or_default();
                self.status = GenerationStatus::Idle;
            }
            Err(error) => {
                tracing::warn!(seq = outcome.seq, %error, "diagram generation failed");
                self.status = GenerationStatus::Failed {
                    seq: outcome.seq,
                    error,
                };
            }
        }
        true
    }

    pub fn set_opacity(&mut self, percent: u8) {
        self.opacity = ImageOpacity::new(percent);
    }

    pub fn drag(&mut self, event: DragEvent) -> DragHoverState {
        self.drag.handle(event)
    }

    /// Handles a drop: hover returns to idle, and an image job is issued if the first item is
    /// an image. Anything else is ignored without a notice.
    pub fn begin_drop(&mut self, files: &[DroppedFile]) -> Option<IngestJob> {
        self.drag.handle(DragEvent::Drop);
        match self.ingestor.accept_drop(files) {
            Ok(job) => Some(job),
            Err(err) => {
                tracing::debug!(%err, "ignoring drop");
                None
            }
        }
    }

    /// Handles a file picked through the file chooser. No media-type check is made.
    pub fn begin_pick(&mut self, bytes: Vec<u8>) -> Option<IngestJob> {
        match self.ingestor.accept_pick(bytes) {
            Ok(job) => Some(job),
            Err(err) => {
                tracing::debug!(%err, "ignoring empty pick");
                None
            }
        }
    }

    /// Applies a finished ingestion. The image is replaced as a whole; decode failures keep the
    /// previous image and raise a notice. Returns `false` for superseded jobs.
    pub fn finish_ingest(&mut self, outcome: IngestOutcome) -> bool {
        if !self.ingestor.is_current(outcome.ticket) {
            tracing::debug!(ticket = outcome.ticket, "discarding superseded image");
            return false;
        }

        match outcome.result {
            Ok(image) => {
                tracing::debug!(
                    width = image.width(),
                    height = image.height(),
                    "calibration image replaced"
                );
                self.image = Some(image);
                self.notice = None;
            }
            Err(err) if err.is_silent() => {}
            Err(err) => {
                tracing::warn!(%err, "calibration image rejected");
                self.notice = Some(err);
            }
        }
        true
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn composite_input(&self) -> CompositeInput<'_> {
        CompositeInput {
            markup: self.markup.as_ref(),
            image: self.image.as_ref(),
            opacity: self.opacity,
            citation: &self.citation,
            hover: self.drag.hover(),
            failure: self.status.failure(),
            notice: self.notice.as_ref(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            query: self.search.query(),
            visible: self.search.visible(&self.catalog),
            selected: self.selection.selected(),
            height: self.selection.height(),
            markup: self.markup.as_ref(),
            citation: &self.citation,
            status: &self.status,
            image: self.image.as_ref(),
            opacity: self.opacity,
            hover: self.drag.hover(),
            notice: self.notice.as_ref(),
        }
    }
}

/// Runs `request` on `adapter` and applies the outcome to the shared session.
///
/// The session is only borrowed after the generator has answered, so other handlers may
/// update it while initialization is pending.
pub async fn regenerate<G: DiagramGenerator>(
    session: &RefCell<Session>,
    adapter: &GeneratorAdapter<G>,
    request: GenerationRequest,
) -> bool {
    let outcome = adapter.run(request).await;
    session.borrow_mut().apply_generation(outcome)
}
