use crate::ingest::{DEFAULT_FRAME_EDGE, IngestionMode, MAX_FRAME_EDGE};
use crate::search::EmptyQueryPolicy;
use crate::selection::DiagramHeight;
use crate::view::ImageOpacity;
use serde_json::{Map, Value, json};

pub const DEFAULT_CAPTION_PREFIX: &str = "Sporenmaße nach: ";

/// Site-level settings as a JSON object, addressed with dotted paths
/// (`diagram.heightUm`, `overlay.opacity`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig(Value);

impl Default for SiteConfig {
    fn default() -> Self {
        Self(default_site_config_value())
    }
}

fn default_site_config_value() -> Value {
    json!({
        "diagram": { "heightUm": DiagramHeight::DEFAULT.micrometers() },
        "overlay": { "opacity": ImageOpacity::DEFAULT.percent() },
        "frame": { "edge": DEFAULT_FRAME_EDGE },
        "search": { "emptyQuery": "all" },
        "ingest": { "pickerMode": "canonical" },
        "caption": { "prefix": DEFAULT_CAPTION_PREFIX },
    })
}

impl SiteConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.lookup(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.lookup(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // `from_value` accepts any JSON; coerce non-objects so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur
                .entry(seg)
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    /// Merges `other` over this config; objects merge key by key, everything else replaces.
    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

/// Typed view of a [`SiteConfig`]. Missing or invalid entries fall back to the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub initial_height: DiagramHeight,
    pub initial_opacity: ImageOpacity,
    pub frame_edge: u32,
    pub empty_query: EmptyQueryPolicy,
    pub picker_mode: IngestionMode,
    pub caption_prefix: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            initial_height: DiagramHeight::DEFAULT,
            initial_opacity: ImageOpacity::DEFAULT,
            frame_edge: DEFAULT_FRAME_EDGE,
            empty_query: EmptyQueryPolicy::default(),
            picker_mode: IngestionMode::default(),
            caption_prefix: DEFAULT_CAPTION_PREFIX.to_string(),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        let defaults = Self::default();
        Self {
            initial_height: config
                .get_f64("diagram.heightUm")
                .and_then(DiagramHeight::new)
                .unwrap_or(defaults.initial_height),
            initial_opacity: config
                .get_u64("overlay.opacity")
                .map(|v| ImageOpacity::new(v.min(100) as u8))
                .unwrap_or(defaults.initial_opacity),
            frame_edge: config
                .get_u64("frame.edge")
                .and_then(|v| u32::try_from(v).ok())
                .filter(|&v| (1..=MAX_FRAME_EDGE).contains(&v))
                .unwrap_or(defaults.frame_edge),
            empty_query: config
                .get_str("search.emptyQuery")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.empty_query),
            picker_mode: config
                .get_str("ingest.pickerMode")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.picker_mode),
            caption_prefix: config
                .get_str("caption.prefix")
                .map(str::to_string)
                .unwrap_or(defaults.caption_prefix),
        }
    }
}
