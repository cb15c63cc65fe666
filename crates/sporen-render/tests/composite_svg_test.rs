use image::{DynamicImage, ImageFormat, RgbaImage};
use sporen_core::ingest::{IngestSource, canonicalize};
use sporen_core::{
    CompositeInput, DragHoverState, GenerationError, ImageOpacity, IngestionError, TrustedSvg,
};
use sporen_render::{CompositeOptions, render_composite_svg};
use std::io::Cursor;

fn diagram() -> TrustedSvg {
    TrustedSvg::trust(
        r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="800" height="800"><ellipse id="spore" cx="400" cy="400" rx="30" ry="40"/></svg>"#,
    )
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([120, 80, 40, 255]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

fn base_input<'a>(markup: Option<&'a TrustedSvg>) -> CompositeInput<'a> {
    CompositeInput {
        markup,
        image: None,
        opacity: ImageOpacity::DEFAULT,
        citation: "",
        hover: DragHoverState::Idle,
        failure: None,
        notice: None,
    }
}

fn assert_well_formed(svg: &str) {
    roxmltree::Document::parse(svg).unwrap_or_else(|err| panic!("invalid svg ({err}):\n{svg}"));
}

#[test]
fn diagram_markup_is_embedded_without_prolog() {
    let markup = diagram();
    let svg = render_composite_svg(&base_input(Some(&markup)), &CompositeOptions::default());

    assert_well_formed(&svg);
    assert!(svg.contains(r#"<ellipse id="spore""#));
    assert!(!svg.contains("<?xml"));
    assert!(svg.contains(r#"class="diagram-layer""#));
}

#[test]
fn image_layer_uses_overlay_opacity() {
    let markup = diagram();
    let image = canonicalize(&png(40, 20), 800, IngestSource::Drop).expect("canonicalize");

    for (percent, expected) in [(0u8, r#"opacity="0""#), (30, r#"opacity="0.3""#), (100, r#"opacity="1""#)] {
        let input = CompositeInput {
            image: Some(&image),
            opacity: ImageOpacity::new(percent),
            ..base_input(Some(&markup))
        };
        let svg = render_composite_svg(&input, &CompositeOptions::default());
        assert_well_formed(&svg);
        assert!(svg.contains(expected), "{percent}%: {svg}");
        // The diagram stays in the document even when it is fully covered.
        assert!(svg.contains(r#"<ellipse id="spore""#));
        assert!(svg.contains("data:image/png;base64,"));
        assert!(!svg.contains("choose-file"));
    }
}

#[test]
fn image_layer_is_drawn_after_diagram() {
    let markup = diagram();
    let image = canonicalize(&png(10, 10), 800, IngestSource::Picker).expect("canonicalize");
    let input = CompositeInput {
        image: Some(&image),
        ..base_input(Some(&markup))
    };
    let svg = render_composite_svg(&input, &CompositeOptions::default());

    let diagram_at = svg.find("diagram-layer").expect("diagram layer");
    let image_at = svg.find("calibration-layer").expect("image layer");
    assert!(diagram_at < image_at);
}

#[test]
fn caption_requires_citation() {
    let markup = diagram();
    let with_cite = CompositeInput {
        citation: "Smith 1990",
        ..base_input(Some(&markup))
    };
    let svg = render_composite_svg(&with_cite, &CompositeOptions::default());
    assert_well_formed(&svg);
    assert!(svg.contains("Sporenmaße nach: Smith 1990"), "{svg}");

    let svg = render_composite_svg(&base_input(Some(&markup)), &CompositeOptions::default());
    assert!(!svg.contains("Sporenmaße nach:"));
    assert!(!svg.contains(r#"class="caption""#));
}

#[test]
fn caption_prefix_is_configurable_and_escaped() {
    let input = CompositeInput {
        citation: "Moser & Jülich 1985",
        ..base_input(None)
    };
    let options = CompositeOptions {
        caption_prefix: "After: ".to_string(),
        ..Default::default()
    };
    let svg = render_composite_svg(&input, &options);
    assert_well_formed(&svg);
    assert!(svg.contains("After: Moser &amp; Jülich 1985"));
}

#[test]
fn call_to_action_shown_without_image() {
    let svg = render_composite_svg(&base_input(None), &CompositeOptions::default());
    assert_well_formed(&svg);
    assert!(svg.contains("Bild hier ablegen oder"));
    assert!(svg.contains(r#"class="choose-file""#));
    assert!(!svg.contains("calibration-layer"));
}

#[test]
fn hover_highlights_frame() {
    let idle = render_composite_svg(&base_input(None), &CompositeOptions::default());
    let hovering = render_composite_svg(
        &CompositeInput {
            hover: DragHoverState::Hovering,
            ..base_input(None)
        },
        &CompositeOptions::default(),
    );

    assert!(idle.contains(r##"stroke="#e5e7eb""##));
    assert!(hovering.contains(r##"stroke="#3b82f6""##));
    assert!(hovering.contains("drop-prompt hovering"));
}

#[test]
fn failures_are_listed_under_frame() {
    let markup = diagram();
    let failure = GenerationError::Generate {
        label: "Amanita muscaria".to_string(),
        message: "bad <input>".to_string(),
    };
    let notice = IngestionError::Decode {
        message: "truncated".to_string(),
    };
    let input = CompositeInput {
        failure: Some(&failure),
        notice: Some(&notice),
        citation: "Smith 1990",
        ..base_input(Some(&markup))
    };
    let svg = render_composite_svg(&input, &CompositeOptions::default());

    assert_well_formed(&svg);
    // Previous diagram is still shown next to the failure.
    assert!(svg.contains(r#"<ellipse id="spore""#));
    assert!(svg.contains(r#"class="generation-error""#));
    assert!(svg.contains("bad &lt;input&gt;"));
    assert!(svg.contains(r#"class="ingestion-error""#));
    // 800 + 12 + 3 * 28
    assert!(svg.contains(r#"height="896""#), "{svg}");
}

#[test]
fn frame_edge_follows_options() {
    let options = CompositeOptions {
        frame_edge: 400,
        ..Default::default()
    };
    let svg = render_composite_svg(&base_input(None), &options);
    let doc = roxmltree::Document::parse(&svg).expect("parse");
    let root = doc.root_element();
    assert_eq!(root.attribute("width"), Some("400"));
    assert_eq!(root.attribute("height"), Some("400"));
}
