//! Layered composite frame.
//!
//! The frame is a square of `frame_edge` pixels with two full-frame layers: the generated
//! diagram at the bottom and the calibration photograph on top, blended by the overlay
//! opacity. Without a photograph the top layer is replaced by the drop/choose prompt. A band
//! under the frame carries the citation caption and any failure messages.

use crate::svg::{escape_xml, fmt_number};
use sporen_core::config::DEFAULT_CAPTION_PREFIX;
use sporen_core::ingest::DEFAULT_FRAME_EDGE;
use sporen_core::{CompositeInput, DragHoverState, SessionSettings};
use std::fmt::Write as _;

const BAND_LINE_HEIGHT: f64 = 28.0;
const BAND_PADDING: f64 = 12.0;

#[derive(Debug, Clone)]
pub struct CompositeOptions {
    pub frame_edge: u32,
    pub caption_prefix: String,
    /// Prompt shown while no calibration image is loaded.
    pub drop_prompt: String,
    /// Clickable part of the prompt that opens the file chooser.
    pub choose_label: String,
    pub generation_failed_prefix: String,
    pub ingestion_failed_prefix: String,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            frame_edge: DEFAULT_FRAME_EDGE,
            caption_prefix: DEFAULT_CAPTION_PREFIX.to_string(),
            drop_prompt: "Bild hier ablegen oder".to_string(),
            choose_label: "auswählen".to_string(),
            generation_failed_prefix: "Abbildung konnte nicht erzeugt werden: ".to_string(),
            ingestion_failed_prefix: "Bild konnte nicht geladen werden: ".to_string(),
        }
    }
}

impl CompositeOptions {
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            frame_edge: settings.frame_edge,
            caption_prefix: settings.caption_prefix.clone(),
            ..Default::default()
        }
    }
}

/// Renders the composite frame as a standalone SVG document.
///
/// The diagram markup is inserted verbatim; it is trusted generator output.
pub fn render_composite_svg(input: &CompositeInput<'_>, options: &CompositeOptions) -> String {
    let edge = f64::from(options.frame_edge.max(1));
    let edge_s = fmt_number(edge);

    let mut band_lines: Vec<(String, &str)> = Vec::new();
    if let Some(caption) = input.caption(&options.caption_prefix) {
        band_lines.push((caption, "caption"));
    }
    if let Some(err) = input.failure {
        band_lines.push((
            format!("{}{err}", options.generation_failed_prefix),
            "generation-error",
        ));
    }
    if let Some(err) = input.notice {
        band_lines.push((
            format!("{}{err}", options.ingestion_failed_prefix),
            "ingestion-error",
        ));
    }
    let band = if band_lines.is_empty() {
        0.0
    } else {
        BAND_PADDING + BAND_LINE_HEIGHT * band_lines.len() as f64
    };
    let total_h = fmt_number(edge + band);

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{edge_s}" height="{total_h}" viewBox="0 0 {edge_s} {total_h}">"#
    );
    out.push_str(r#"<defs><clipPath id="sporen-frame-clip">"#);
    let _ = write!(
        &mut out,
        r#"<rect x="0" y="0" width="{edge_s}" height="{edge_s}"/></clipPath></defs>"#
    );

    let _ = write!(
        &mut out,
        r##"<rect class="frame" x="0" y="0" width="{edge_s}" height="{edge_s}" rx="8" fill="#ffffff"/>"##
    );

    out.push_str(r#"<g class="layers" clip-path="url(#sporen-frame-clip)">"#);

    // Layer 1: diagram
    let _ = write!(
        &mut out,
        r#"<svg class="diagram-layer" x="0" y="0" width="{edge_s}" height="{edge_s}">"#
    );
    if let Some(markup) = input.markup {
        out.push_str(markup.embeddable());
    }
    out.push_str("</svg>");

    // Layer 2: calibration image, or the drop prompt
    match input.image {
        Some(image) => {
            let _ = write!(
                &mut out,
                r#"<image class="calibration-layer" x="0" y="0" width="{edge_s}" height="{edge_s}" preserveAspectRatio="xMidYMid slice" opacity="{}" xlink:href="{}"/>"#,
                fmt_number(input.opacity.alpha()),
                image.data_uri()
            );
        }
        None => render_drop_prompt(&mut out, edge, input.hover, options),
    }
    out.push_str("</g>");

    let (ring_color, ring_width) = match input.hover {
        DragHoverState::Hovering => ("#3b82f6", 4.0),
        DragHoverState::Idle => ("#e5e7eb", 1.0),
    };
    let _ = write!(
        &mut out,
        r#"<rect class="frame-ring" x="0.5" y="0.5" width="{}" height="{}" rx="8" fill="none" stroke="{ring_color}" stroke-width="{}"/>"#,
        fmt_number(edge - 1.0),
        fmt_number(edge - 1.0),
        fmt_number(ring_width)
    );

    for (idx, (text, class)) in band_lines.iter().enumerate() {
        let y = edge + BAND_PADDING + BAND_LINE_HEIGHT * (idx as f64 + 0.5);
        let (fill, style) = match *class {
            "caption" => ("#4b5563", r#" font-style="italic""#),
            _ => ("#b91c1c", ""),
        };
        let _ = write!(
            &mut out,
            r#"<text class="{class}" x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-size="14" fill="{fill}"{style}>{}</text>"#,
            fmt_number(edge / 2.0),
            fmt_number(y),
            escape_xml(text)
        );
    }

    out.push_str("</svg>");
    out
}

fn render_drop_prompt(
    out: &mut String,
    edge: f64,
    hover: DragHoverState,
    options: &CompositeOptions,
) {
    let class = match hover {
        DragHoverState::Hovering => "drop-prompt hovering",
        DragHoverState::Idle => "drop-prompt",
    };
    let _ = write!(
        out,
        r##"<text class="{class}" x="{c}" y="{c}" text-anchor="middle" dominant-baseline="central" font-family="sans-serif" font-size="16" fill="#6b7280">{} <tspan class="choose-file" fill="#3b82f6" text-decoration="underline">{}</tspan></text>"##,
        escape_xml(&options.drop_prompt),
        escape_xml(&options.choose_label),
        c = fmt_number(edge / 2.0),
    );
}
