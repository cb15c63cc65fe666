#![forbid(unsafe_code)]

//! `sporen` is a headless spore viewer.
//!
//! It keeps a species catalog searchable, turns the selected species into a reference diagram
//! drawn at a chosen physical scale, and overlays a microscope photograph on top of it so the
//! two can be compared at the same scale.
//!
//! # Features
//!
//! - `render`: enable SVG composition (`sporen::render`)
//! - `raster`: enable PNG/JPG output via pure-Rust SVG rasterization

pub use sporen_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use sporen_render::{
        CompositeOptions, OutlineGenerator, SporeDimensions, SporeShape, parse_measurements,
        render_composite_svg,
    };

    #[cfg(feature = "raster")]
    pub mod raster;

    use sporen_core::{
        Catalog, DragEvent, DragHoverState, DroppedFile, GeneratorAdapter, IngestJob, Session,
        SessionSettings, SiteConfig, regenerate,
    };
    use std::cell::{Ref, RefCell};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Session(#[from] sporen_core::Error),
        #[error(transparent)]
        Ingestion(#[from] sporen_core::IngestionError),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Convenience wrapper that bundles a [`Session`], the outline generator and composite
    /// options for headless use.
    ///
    /// Async methods never hold the session borrow across an await, so several of them may be
    /// in flight on one local executor; the `_sync` variants block on the current thread.
    #[derive(Debug)]
    pub struct HeadlessViewer {
        session: RefCell<Session>,
        adapter: GeneratorAdapter<OutlineGenerator>,
        options: CompositeOptions,
    }

    impl HeadlessViewer {
        pub fn new(catalog: Catalog) -> Self {
            Self::with_settings(catalog, SessionSettings::default())
        }

        pub fn with_site_config(catalog: Catalog, site_config: &SiteConfig) -> Self {
            Self::with_settings(catalog, SessionSettings::from_config(site_config))
        }

        pub fn with_settings(catalog: Catalog, settings: SessionSettings) -> Self {
            let options = CompositeOptions::from_settings(&settings);
            let adapter = GeneratorAdapter::new(OutlineGenerator::new(settings.frame_edge));
            Self {
                session: RefCell::new(Session::with_settings(catalog, settings)),
                adapter,
                options,
            }
        }

        pub fn with_composite_options(mut self, options: CompositeOptions) -> Self {
            self.options = options;
            self
        }

        pub fn session(&self) -> Ref<'_, Session> {
            self.session.borrow()
        }

        pub fn adapter(&self) -> &GeneratorAdapter<OutlineGenerator> {
            &self.adapter
        }

        pub fn options(&self) -> &CompositeOptions {
            &self.options
        }

        pub fn set_query(&self, query: &str) -> usize {
            let mut session = self.session.borrow_mut();
            session.set_query(query);
            session.visible_species().len()
        }

        /// Selects `name` and waits for its diagram. Returns `false` when a newer request
        /// superseded this one before it finished.
        pub async fn select(&self, name: &str) -> Result<bool> {
            let request = self.session.borrow_mut().select_species(name)?;
            Ok(regenerate(&self.session, &self.adapter, request).await)
        }

        /// Changes the diagram height; regenerates when a species is selected.
        pub async fn set_height(&self, micrometers: f64) -> Result<bool> {
            let request = self.session.borrow_mut().set_height(micrometers)?;
            match request {
                Some(request) => Ok(regenerate(&self.session, &self.adapter, request).await),
                None => Ok(false),
            }
        }

        pub fn select_sync(&self, name: &str) -> Result<bool> {
            futures::executor::block_on(self.select(name))
        }

        pub fn set_height_sync(&self, micrometers: f64) -> Result<bool> {
            futures::executor::block_on(self.set_height(micrometers))
        }

        pub fn set_opacity(&self, percent: u8) {
            self.session.borrow_mut().set_opacity(percent);
        }

        pub fn drag(&self, event: DragEvent) -> DragHoverState {
            self.session.borrow_mut().drag(event)
        }

        /// Loads an image as if it was chosen through the file picker.
        pub fn pick_image(&self, bytes: Vec<u8>) -> Result<bool> {
            let job = self.session.borrow_mut().begin_pick(bytes);
            self.finish(job)
        }

        /// Loads the first dropped file if it is an image.
        pub fn drop_files(&self, files: &[DroppedFile]) -> Result<bool> {
            let job = self.session.borrow_mut().begin_drop(files);
            self.finish(job)
        }

        fn finish(&self, job: Option<IngestJob>) -> Result<bool> {
            let Some(job) = job else {
                return Ok(false);
            };
            let outcome = job.run();
            let mut session = self.session.borrow_mut();
            if !session.finish_ingest(outcome) {
                return Ok(false);
            }
            match session.notice() {
                Some(err) => Err(err.clone().into()),
                None => Ok(true),
            }
        }

        /// Renders the current composite frame.
        pub fn render_svg(&self) -> String {
            let session = self.session.borrow();
            render_composite_svg(&session.composite_input(), &self.options)
        }

        #[cfg(feature = "raster")]
        pub fn render_png(&self, raster: &raster::RasterOptions) -> raster::Result<Vec<u8>> {
            raster::svg_to_png(&self.render_svg(), raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg(&self, raster: &raster::RasterOptions) -> raster::Result<Vec<u8>> {
            raster::svg_to_jpeg(&self.render_svg(), raster)
        }
    }
}
