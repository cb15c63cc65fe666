mod config;
mod view;

use crate::*;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};

pub(crate) fn amanita() -> SpeciesRecord {
    SpeciesRecord::new("Amanita muscaria", "8-10x6-8", "ellipsoid").with_cite("Smith 1990")
}

pub(crate) fn sample_catalog() -> Catalog {
    Catalog::from_records([
        amanita(),
        SpeciesRecord::new("Boletus edulis", "14-17x4.5-5.5", "fusiform"),
        SpeciesRecord::new("Lycoperdon", "3.5-4.5", "globose"),
        SpeciesRecord::new("Amanita phalloides", "8-10x7-9", "globose").with_cite("Breitenbach 1995"),
    ])
    .expect("valid catalog")
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub measurements: String,
    pub shape: String,
    pub label: String,
    pub height_um: f64,
}

/// Generator double that records its calls. Initialization can be held open with a gate.
#[derive(Default)]
pub(crate) struct RecordingGenerator {
    pub calls: RefCell<Vec<Call>>,
    pub init_calls: Cell<usize>,
    pub fail_init: Cell<bool>,
    pub fail_generate: Cell<bool>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl RecordingGenerator {
    pub fn gated() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let generator = Self {
            gate: RefCell::new(Some(rx)),
            ..Default::default()
        };
        (generator, tx)
    }
}

impl DiagramGenerator for RecordingGenerator {
    fn init(&self) -> LocalBoxFuture<'static, std::result::Result<(), GeneratorFailure>> {
        self.init_calls.set(self.init_calls.get() + 1);
        let gate = self.gate.borrow_mut().take();
        let fail = self.fail_init.get();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if fail {
                Err(GeneratorFailure::new("module failed to load"))
            } else {
                Ok(())
            }
        }
        .boxed_local()
    }

    fn generate(
        &self,
        measurements: &str,
        shape: &str,
        label: &str,
        height_um: f64,
    ) -> std::result::Result<String, GeneratorFailure> {
        self.calls.borrow_mut().push(Call {
            measurements: measurements.to_string(),
            shape: shape.to_string(),
            label: label.to_string(),
            height_um,
        });
        if self.fail_generate.get() {
            return Err(GeneratorFailure::new("unsupported shape"));
        }
        Ok(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" data-label="{label}" data-height="{height_um}"/>"#
        ))
    }
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
