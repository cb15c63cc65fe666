#![forbid(unsafe_code)]

//! Headless SVG rendering for the spore viewer: the layered composite frame and a reference
//! outline generator.

pub mod composite;
pub mod outline;
pub mod svg;

pub use composite::{CompositeOptions, render_composite_svg};
pub use outline::{OutlineGenerator, SporeDimensions, SporeShape, parse_measurements};
