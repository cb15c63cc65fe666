//! Reference outline generator.
//!
//! A minimal [`DiagramGenerator`] for headless use: draws the smallest and largest spore
//! outline described by a measurement string such as `8-10x6-8` (length range x width range,
//! micrometers) at the requested physical scale, with a label and a scale bar.

use crate::svg::{escape_xml, fmt_number};
use futures::future::{FutureExt, LocalBoxFuture};
use regex::Regex;
use sporen_core::generator::{DiagramGenerator, GeneratorFailure};
use sporen_core::ingest::DEFAULT_FRAME_EDGE;
use std::fmt::Write as _;
use std::sync::OnceLock;

const SCALE_BAR_STEPS_UM: [f64; 9] = [0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SporeDimensions {
    pub length_min: f64,
    pub length_max: f64,
    pub width_min: f64,
    pub width_max: f64,
}

fn measurement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let num = r"(\d+(?:[.,]\d+)?)";
        let range = format!(r"{num}(?:\s*[-–]\s*{num})?");
        Regex::new(&format!(
            r"(?i)^\s*{range}(?:\s*[x×]\s*{range})?\s*(?:µm|um|μm)?\s*$"
        ))
        .expect("valid regex")
    })
}

/// Parses `L1-L2xW1-W2`; either range may be a single value, and a missing width means the
/// spore is as wide as it is long.
pub fn parse_measurements(text: &str) -> Option<SporeDimensions> {
    let caps = measurement_re().captures(text)?;
    let num = |idx: usize| -> Option<f64> {
        caps.get(idx)
            .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
    };

    let length_min = num(1)?;
    let length_max = num(2).unwrap_or(length_min);
    let (width_min, width_max) = match num(3) {
        Some(w) => (w, num(4).unwrap_or(w)),
        None => (length_min, length_max),
    };

    let dims = SporeDimensions {
        length_min: length_min.min(length_max),
        length_max: length_min.max(length_max),
        width_min: width_min.min(width_max),
        width_max: width_min.max(width_max),
    };
    (dims.length_min > 0.0 && dims.width_min > 0.0).then_some(dims)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SporeShape {
    Ellipsoid,
    Globose,
    Cylindrical,
    Fusiform,
}

impl SporeShape {
    /// Maps a catalog shape tag; unknown tags are drawn as ellipsoids.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_lowercase();
        if tag.contains("glob") || tag.contains("spher") || tag.contains("rund") {
            Self::Globose
        } else if tag.contains("cylind") || tag.contains("zylind") || tag.contains("allant") {
            Self::Cylindrical
        } else if tag.contains("fusi") || tag.contains("spindel") || tag.contains("spindle") {
            Self::Fusiform
        } else {
            Self::Ellipsoid
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutlineGenerator {
    /// Output size in pixels; the diagram height maps onto this edge.
    pub frame_edge: u32,
}

impl Default for OutlineGenerator {
    fn default() -> Self {
        Self {
            frame_edge: DEFAULT_FRAME_EDGE,
        }
    }
}

impl OutlineGenerator {
    pub fn new(frame_edge: u32) -> Self {
        Self {
            frame_edge: frame_edge.max(1),
        }
    }
}

impl DiagramGenerator for OutlineGenerator {
    fn init(&self) -> LocalBoxFuture<'static, Result<(), GeneratorFailure>> {
        futures::future::ready(Ok(())).boxed_local()
    }

    fn generate(
        &self,
        measurements: &str,
        shape: &str,
        label: &str,
        height_um: f64,
    ) -> Result<String, GeneratorFailure> {
        if !(height_um.is_finite() && height_um > 0.0) {
            return Err(GeneratorFailure::new(format!(
                "invalid diagram height: {height_um}"
            )));
        }
        let Some(dims) = parse_measurements(measurements) else {
            return Err(GeneratorFailure::new(format!(
                "unrecognized spore measurements: {measurements:?}"
            )));
        };
        let shape = SporeShape::from_tag(shape);
        tracing::debug!(?dims, ?shape, height_um, "drawing spore outline");
        Ok(render_outline(
            &dims,
            shape,
            label,
            measurements,
            height_um,
            f64::from(self.frame_edge),
        ))
    }
}

fn render_outline(
    dims: &SporeDimensions,
    shape: SporeShape,
    label: &str,
    measurements: &str,
    height_um: f64,
    edge: f64,
) -> String {
    let px_per_um = edge / height_um;
    let (cx, cy) = (edge / 2.0, edge / 2.0);
    let edge_s = fmt_number(edge);

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{edge_s}" height="{edge_s}" viewBox="0 0 {edge_s} {edge_s}">"#
    );

    out.push_str(r##"<g class="spore-outline" fill="none" stroke="#1f2937">"##);
    let outlines = [
        (dims.length_max, dims.width_max, "spore-max", ""),
        (
            dims.length_min,
            dims.width_min,
            "spore-min",
            r#" stroke-dasharray="6 4""#,
        ),
    ];
    for (length, width, class, extra) in outlines {
        let ry = length / 2.0 * px_per_um;
        let rx = width / 2.0 * px_per_um;
        push_shape(&mut out, shape, cx, cy, rx, ry, class, extra);
    }
    out.push_str("</g>");

    let _ = write!(
        &mut out,
        r##"<text class="spore-label" x="24" y="36" font-family="sans-serif" font-size="18" font-style="italic" fill="#111827">{}</text>"##,
        escape_xml(label)
    );
    let _ = write!(
        &mut out,
        r##"<text class="spore-measurements" x="24" y="60" font-family="sans-serif" font-size="14" fill="#4b5563">{} µm</text>"##,
        escape_xml(measurements.trim())
    );

    let bar_um = SCALE_BAR_STEPS_UM
        .iter()
        .rev()
        .copied()
        .find(|um| um * px_per_um <= edge * 0.3)
        .unwrap_or(SCALE_BAR_STEPS_UM[0]);
    let bar_px = bar_um * px_per_um;
    let bar_y = edge - 32.0;
    let _ = write!(
        &mut out,
        r##"<g class="scale-bar"><line x1="24" y1="{y}" x2="{x2}" y2="{y}" stroke="#111827" stroke-width="3"/><text x="24" y="{ty}" font-family="sans-serif" font-size="14" fill="#111827">{} µm</text></g>"##,
        fmt_number(bar_um),
        y = fmt_number(bar_y),
        x2 = fmt_number(24.0 + bar_px),
        ty = fmt_number(bar_y - 10.0),
    );

    out.push_str("</svg>");
    out
}

#[allow(clippy::too_many_arguments)]
fn push_shape(
    out: &mut String,
    shape: SporeShape,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    class: &str,
    extra: &str,
) {
    let f = fmt_number;
    let _ = match shape {
        SporeShape::Ellipsoid => write!(
            out,
            r#"<ellipse class="{class}" cx="{}" cy="{}" rx="{}" ry="{}" stroke-width="2"{extra}/>"#,
            f(cx),
            f(cy),
            f(rx),
            f(ry)
        ),
        SporeShape::Globose => write!(
            out,
            r#"<circle class="{class}" cx="{}" cy="{}" r="{}" stroke-width="2"{extra}/>"#,
            f(cx),
            f(cy),
            f((rx + ry) / 2.0)
        ),
        SporeShape::Cylindrical => write!(
            out,
            r#"<rect class="{class}" x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" stroke-width="2"{extra}/>"#,
            f(cx - rx),
            f(cy - ry),
            f(rx * 2.0),
            f(ry * 2.0),
            f(rx),
            f(rx)
        ),
        SporeShape::Fusiform => {
            // Control points at 4/3 rx put the widest point of each cubic half at rx.
            let k = rx * 4.0 / 3.0;
            write!(
                out,
                r#"<path class="{class}" d="M{},{} C{},{} {},{} {},{} C{},{} {},{} {},{} Z" stroke-width="2"{extra}/>"#,
                f(cx),
                f(cy - ry),
                f(cx + k),
                f(cy - ry / 2.0),
                f(cx + k),
                f(cy + ry / 2.0),
                f(cx),
                f(cy + ry),
                f(cx - k),
                f(cy + ry / 2.0),
                f(cx - k),
                f(cy - ry / 2.0),
                f(cx),
                f(cy - ry)
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_length_and_width_ranges() {
        let dims = parse_measurements("8-10x6-8").unwrap();
        assert_eq!(
            dims,
            SporeDimensions {
                length_min: 8.0,
                length_max: 10.0,
                width_min: 6.0,
                width_max: 8.0,
            }
        );
    }

    #[test]
    fn accepts_comma_decimals_and_unit_suffix() {
        let dims = parse_measurements("7,5 – 9 × 5,5 µm").unwrap();
        assert_eq!(dims.length_min, 7.5);
        assert_eq!(dims.length_max, 9.0);
        assert_eq!(dims.width_min, 5.5);
        assert_eq!(dims.width_max, 5.5);
    }

    #[test]
    fn missing_width_mirrors_length() {
        let dims = parse_measurements("3.5-4.5").unwrap();
        assert_eq!((dims.width_min, dims.width_max), (3.5, 4.5));
    }

    #[test]
    fn rejects_garbage_and_zero() {
        assert!(parse_measurements("").is_none());
        assert!(parse_measurements("large").is_none());
        assert!(parse_measurements("0x4").is_none());
    }

    #[test]
    fn shape_tags_fall_back_to_ellipsoid() {
        assert_eq!(SporeShape::from_tag("Globose"), SporeShape::Globose);
        assert_eq!(SporeShape::from_tag("zylindrisch"), SporeShape::Cylindrical);
        assert_eq!(SporeShape::from_tag("fusiform"), SporeShape::Fusiform);
        assert_eq!(SporeShape::from_tag("amygdaliform"), SporeShape::Ellipsoid);
    }

    #[test]
    fn scale_follows_diagram_height() {
        let generator = OutlineGenerator::new(800);
        let svg = generator
            .generate("10x8", "ellipsoid", "Test", 100.0)
            .unwrap();
        // 8 px per µm: the 10 µm long spore has ry = 40.
        assert!(svg.contains(r#"ry="40""#), "{svg}");
        // Largest bar within 240 px is 20 µm.
        assert!(svg.contains(">20 µm</text>"), "{svg}");
    }

    #[test]
    fn generation_fails_on_bad_input() {
        let generator = OutlineGenerator::default();
        assert!(generator.generate("n/a", "", "X", 166.0).is_err());
        assert!(generator.generate("8x6", "", "X", 0.0).is_err());
        assert!(generator.generate("8x6", "", "X", f64::NAN).is_err());
    }
}
