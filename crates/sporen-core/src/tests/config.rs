use super::*;
use crate::ingest::DEFAULT_FRAME_EDGE;
use serde_json::json;

#[test]
fn default_settings_match_viewer_defaults() {
    let settings = SessionSettings::from_config(&SiteConfig::default());
    assert_eq!(settings, SessionSettings::default());
    assert_eq!(settings.initial_height.micrometers(), 166.0);
    assert_eq!(settings.initial_opacity.percent(), 30);
    assert_eq!(settings.frame_edge, DEFAULT_FRAME_EDGE);
    assert_eq!(settings.caption_prefix, "Sporenmaße nach: ");
}

#[test]
fn overrides_merge_onto_defaults() {
    let cfg = SiteConfig::with_overrides(&json!({
        "search": { "emptyQuery": "spaced" },
        "overlay": { "opacity": 250 },
        "ingest": { "pickerMode": "compatible" }
    }));
    assert_eq!(cfg.get_f64("diagram.heightUm"), Some(166.0));

    let settings = SessionSettings::from_config(&cfg);
    assert_eq!(settings.empty_query, EmptyQueryPolicy::NamesWithSpace);
    assert_eq!(settings.initial_opacity.percent(), 100);
    assert_eq!(settings.picker_mode, IngestionMode::Compatible);
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let cfg = SiteConfig::with_overrides(&json!({
        "diagram": { "heightUm": -3 },
        "frame": { "edge": 0 },
        "search": { "emptyQuery": "fuzzy" }
    }));
    let settings = SessionSettings::from_config(&cfg);
    assert_eq!(settings.initial_height, DiagramHeight::DEFAULT);
    assert_eq!(settings.frame_edge, DEFAULT_FRAME_EDGE);
    assert_eq!(settings.empty_query, EmptyQueryPolicy::ShowAll);
}

#[test]
fn set_value_creates_intermediate_objects() {
    let mut cfg = SiteConfig::from_value(json!("not an object"));
    cfg.set_value("caption.prefix", json!("After: "));
    assert_eq!(cfg.get_str("caption.prefix"), Some("After: "));
    assert_eq!(cfg.as_value(), &json!({ "caption": { "prefix": "After: " } }));
}

#[test]
fn oversized_frame_edge_falls_back_to_default() {
    let cfg = SiteConfig::from_json_str(r#"{ "frame": { "edge": 100000 } }"#).unwrap();
    assert_eq!(cfg.get_u64("frame.edge"), Some(100_000));
    let settings = SessionSettings::from_config(&SiteConfig::with_overrides(cfg.as_value()));
    assert_eq!(settings.frame_edge, DEFAULT_FRAME_EDGE);

    let cfg = SiteConfig::with_overrides(&json!({ "frame": { "edge": 4096 } }));
    assert_eq!(SessionSettings::from_config(&cfg).frame_edge, 4096);
}

#[test]
fn malformed_config_text_is_an_error() {
    assert!(SiteConfig::from_json_str("{ frame: ").is_err());
}
