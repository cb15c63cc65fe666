use crate::catalog::SpeciesRecord;
use crate::generator::GenerationRequest;

/// Physical height of the diagram frame in micrometers. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DiagramHeight(f64);

impl DiagramHeight {
    pub const DEFAULT: Self = Self(166.0);

    pub fn new(micrometers: f64) -> Option<Self> {
        (micrometers.is_finite() && micrometers > 0.0).then_some(Self(micrometers))
    }

    pub fn micrometers(self) -> f64 {
        self.0
    }
}

impl Default for DiagramHeight {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Current species + diagram height, and the sequence of regeneration requests derived from
/// them.
///
/// Every change of either value issues a new [`GenerationRequest`] with a higher sequence
/// number. Outcomes are matched against [`SelectionController::is_current`] so a slow response
/// for an older pair can never overwrite the diagram of a newer one.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: Option<SpeciesRecord>,
    height: DiagramHeight,
    last_issued: u64,
}

impl SelectionController {
    pub fn new(height: DiagramHeight) -> Self {
        Self {
            selected: None,
            height,
            last_issued: 0,
        }
    }

    pub fn selected(&self) -> Option<&SpeciesRecord> {
        self.selected.as_ref()
    }

    pub fn height(&self) -> DiagramHeight {
        self.height
    }

    /// Sequence number of the most recently issued request, if any.
    pub fn latest_seq(&self) -> Option<u64> {
        (self.last_issued > 0).then_some(self.last_issued)
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.last_issued > 0 && seq == self.last_issued
    }

    pub fn select(&mut self, record: &SpeciesRecord) -> GenerationRequest {
        self.selected = Some(record.clone());
        self.request_for(record)
    }

    /// Updates the height. A request is only issued while a species is selected.
    pub fn set_height(&mut self, height: DiagramHeight) -> Option<GenerationRequest> {
        self.height = height;
        let record = self.selected.clone()?;
        Some(self.request_for(&record))
    }

    fn request_for(&mut self, record: &SpeciesRecord) -> GenerationRequest {
        self.last_issued += 1;
        GenerationRequest {
            seq: self.last_issued,
            measurements: record.spore_measurements.clone(),
            shape: record.shape.clone(),
            label: record.name.clone(),
            height_um: self.height.micrometers(),
        }
    }
}
