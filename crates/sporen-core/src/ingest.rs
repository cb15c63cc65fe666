//! Calibration image ingestion.
//!
//! Images arrive either by drag-and-drop or through the file picker. Both produce an
//! [`IngestJob`]; running the job decodes the bytes and yields an [`IngestOutcome`] that the
//! session applies wholesale, so a half-processed image is never observable.
//!
//! Canonicalization fixes the image height to the frame edge and derives the width from the
//! aspect ratio. It does not crop: the composite view fits the result into the square frame
//! with a cover fit, clipping excess width symmetrically.

use crate::error::IngestionError;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use std::io::Cursor;
use std::str::FromStr;

/// Edge length of the square display frame, in pixels.
pub const DEFAULT_FRAME_EDGE: u32 = 800;

/// Largest accepted frame edge.
pub const MAX_FRAME_EDGE: u32 = 8192;

/// Upper bound for the RGBA buffer of a rescaled image, matching `image::Limits::default()`.
pub const MAX_CANONICAL_BYTES: u64 = 512 * 1024 * 1024;

/// A file handed over by a drop event, with the media type the platform declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    Drop,
    Picker,
}

/// How picker uploads are processed. Drops are always canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestionMode {
    /// Picker uploads get the same rescale as drops.
    #[default]
    Canonical,
    /// Picker uploads are embedded as-is (legacy web client behavior).
    Compatible,
}

impl FromStr for IngestionMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canonical" => Ok(Self::Canonical),
            "compatible" | "passthrough" => Ok(Self::Compatible),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalImage {
    media_type: String,
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    source: IngestSource,
}

impl CanonicalImage {
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> IngestSource {
        self.source
    }

    /// `data:` URI embedding the encoded bytes.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Width of the rescaled raster: the frame edge becomes the height, the width follows the
/// aspect ratio. Fractional widths are truncated, as a canvas width would be.
pub fn scaled_width(natural_width: u32, natural_height: u32, frame_edge: u32) -> u32 {
    if natural_height == 0 {
        return frame_edge.max(1);
    }
    let width = f64::from(natural_width) / f64::from(natural_height) * f64::from(frame_edge);
    (width as u32).max(1)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, IngestionError> {
    let decoded = image::load_from_memory(bytes).map_err(|err| IngestionError::Decode {
        message: err.to_string(),
    })?;
    let (w, h) = decoded.dimensions();
    if w == 0 || h == 0 {
        return Err(IngestionError::Decode {
            message: "image has no pixels".to_string(),
        });
    }
    Ok(decoded)
}

/// Decodes `bytes` and rescales them to `frame_edge` pixels high, re-encoded as PNG.
pub fn canonicalize(
    bytes: &[u8],
    frame_edge: u32,
    source: IngestSource,
) -> Result<CanonicalImage, IngestionError> {
    let decoded = decode(bytes)?;
    let (w, h) = decoded.dimensions();
    let frame_edge = frame_edge.clamp(1, MAX_FRAME_EDGE);
    let width = scaled_width(w, h, frame_edge);
    if u64::from(width) * u64::from(frame_edge) * 4 > MAX_CANONICAL_BYTES {
        return Err(IngestionError::TooLarge {
            width,
            height: frame_edge,
        });
    }

    let scaled = decoded.resize_exact(width, frame_edge, FilterType::Triangle);
    let scaled = DynamicImage::ImageRgba8(scaled.to_rgba8());

    let mut out = Cursor::new(Vec::new());
    scaled
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|err| IngestionError::Encode {
            message: err.to_string(),
        })?;

    Ok(CanonicalImage {
        media_type: "image/png".to_string(),
        bytes: out.into_inner(),
        width,
        height: frame_edge,
        source,
    })
}

/// Validates that `bytes` decode as an image and keeps them unchanged.
pub fn passthrough(bytes: &[u8], source: IngestSource) -> Result<CanonicalImage, IngestionError> {
    let format = image::guess_format(bytes).map_err(|err| IngestionError::Decode {
        message: err.to_string(),
    })?;
    let decoded = decode(bytes)?;
    let (width, height) = decoded.dimensions();
    Ok(CanonicalImage {
        media_type: format.to_mime_type().to_string(),
        bytes: bytes.to_vec(),
        width,
        height,
        source,
    })
}

/// Pending decode of one ingested file.
#[derive(Debug, Clone)]
pub struct IngestJob {
    ticket: u64,
    source: IngestSource,
    mode: IngestionMode,
    frame_edge: u32,
    bytes: Vec<u8>,
}

impl IngestJob {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn source(&self) -> IngestSource {
        self.source
    }

    pub fn run(self) -> IngestOutcome {
        let result = match (self.source, self.mode) {
            (IngestSource::Picker, IngestionMode::Compatible) => {
                passthrough(&self.bytes, self.source)
            }
            _ => canonicalize(&self.bytes, self.frame_edge, self.source),
        };
        IngestOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub ticket: u64,
    pub result: Result<CanonicalImage, IngestionError>,
}

/// Accepts drops/picks and hands out ticketed jobs; the latest ticket wins.
#[derive(Debug, Clone)]
pub struct Ingestor {
    mode: IngestionMode,
    frame_edge: u32,
    last_ticket: u64,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestionMode::default(), DEFAULT_FRAME_EDGE)
    }
}

impl Ingestor {
    pub fn new(mode: IngestionMode, frame_edge: u32) -> Self {
        Self {
            mode,
            frame_edge: frame_edge.clamp(1, MAX_FRAME_EDGE),
            last_ticket: 0,
        }
    }

    pub fn mode(&self) -> IngestionMode {
        self.mode
    }

    pub fn frame_edge(&self) -> u32 {
        self.frame_edge
    }

    /// Only the first dropped item is considered, and only if it declares an `image/*` type.
    pub fn accept_drop(&mut self, files: &[DroppedFile]) -> Result<IngestJob, IngestionError> {
        let Some(file) = files.first() else {
            return Err(IngestionError::Empty);
        };
        if !file.is_image() {
            return Err(IngestionError::NotAnImage {
                media_type: file.media_type.clone(),
            });
        }
        Ok(self.job(IngestSource::Drop, file.bytes.clone()))
    }

    /// The picker path skips the media-type check.
    pub fn accept_pick(&mut self, bytes: Vec<u8>) -> Result<IngestJob, IngestionError> {
        if bytes.is_empty() {
            return Err(IngestionError::Empty);
        }
        Ok(self.job(IngestSource::Picker, bytes))
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.last_ticket > 0 && ticket == self.last_ticket
    }

    fn job(&mut self, source: IngestSource, bytes: Vec<u8>) -> IngestJob {
        self.last_ticket += 1;
        IngestJob {
            ticket: self.last_ticket,
            source,
            mode: self.mode,
            frame_edge: self.frame_edge,
            bytes,
        }
    }
}
