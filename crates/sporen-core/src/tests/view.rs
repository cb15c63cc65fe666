use super::*;

#[test]
fn drag_state_transitions() {
    let mut drag = DragState::default();
    assert_eq!(drag.hover(), DragHoverState::Idle);
    assert_eq!(drag.handle(DragEvent::Over), DragHoverState::Hovering);
    assert_eq!(drag.handle(DragEvent::Enter), DragHoverState::Hovering);
    assert!(drag.is_hovering());
    assert_eq!(drag.handle(DragEvent::Leave), DragHoverState::Idle);
    assert_eq!(drag.handle(DragEvent::Leave), DragHoverState::Idle);
    assert_eq!(drag.handle(DragEvent::Drop), DragHoverState::Idle);
}

#[test]
fn diagram_height_rejects_non_positive_values() {
    assert!(DiagramHeight::new(0.0).is_none());
    assert!(DiagramHeight::new(-5.0).is_none());
    assert!(DiagramHeight::new(f64::INFINITY).is_none());
    assert_eq!(DiagramHeight::new(12.5).unwrap().micrometers(), 12.5);
    assert_eq!(DiagramHeight::default().micrometers(), 166.0);
}

#[test]
fn selection_issues_increasing_sequence_numbers() {
    let mut selection = SelectionController::new(DiagramHeight::DEFAULT);
    assert_eq!(selection.latest_seq(), None);
    assert!(selection.set_height(DiagramHeight::new(90.0).unwrap()).is_none());
    assert!(!selection.is_current(0));

    let first = selection.select(&amanita());
    assert_eq!(first.height_um, 90.0);
    let second = selection
        .set_height(DiagramHeight::new(120.0).unwrap())
        .unwrap();
    assert!(second.seq > first.seq);
    assert!(selection.is_current(second.seq));
    assert!(!selection.is_current(first.seq));
}

#[test]
fn embeddable_markup_strips_prolog() {
    let markup = TrustedSvg::trust(
        "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"x\">\n<svg/>",
    );
    assert_eq!(markup.embeddable(), "<svg/>");
    assert!(!markup.is_empty());
    assert!(TrustedSvg::trust("  ").is_empty());
    assert_eq!(TrustedSvg::trust("<?xml").embeddable(), "");
}

#[test]
fn caption_is_prefixed_citation() {
    let input = CompositeInput {
        markup: None,
        image: None,
        opacity: ImageOpacity::new(250),
        citation: "Smith 1990",
        hover: DragHoverState::Idle,
        failure: None,
        notice: None,
    };
    assert_eq!(input.opacity.percent(), 100);
    assert_eq!(
        input.caption("Sporenmaße nach: ").as_deref(),
        Some("Sporenmaße nach: Smith 1990")
    );
    assert!(input.shows_call_to_action());
    let uncited = CompositeInput { citation: "", ..input };
    assert_eq!(uncited.caption("Sporenmaße nach: "), None);
}
