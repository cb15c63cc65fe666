use sporen::render::raster::{self, RasterOptions};
use sporen::render::{HeadlessError, HeadlessViewer};
use sporen::{
    Catalog, CatalogLoadError, DroppedFile, EmptyQueryPolicy, IngestionError, SessionSettings,
    SiteConfig,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Catalog(CatalogLoadError),
    Json(serde_json::Error),
    Headless(HeadlessError),
    Raster(raster::RasterError),
    UnknownSpecies(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Catalog(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::UnknownSpecies(name) => write!(f, "Unknown species: {name}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CatalogLoadError> for CliError {
    fn from(value: CatalogLoadError) -> Self {
        Self::Catalog(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        match value {
            HeadlessError::Session(sporen::Error::UnknownSpecies { name }) => {
                Self::UnknownSpecies(name)
            }
            other => Self::Headless(other),
        }
    }
}

impl From<IngestionError> for CliError {
    fn from(value: IngestionError) -> Self {
        Self::Headless(HeadlessError::Ingestion(value))
    }
}

impl From<raster::RasterError> for CliError {
    fn from(value: raster::RasterError) -> Self {
        Self::Raster(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Search,
    Render,
    Ingest,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    catalog: Option<String>,
    config: Option<String>,
    empty_query: Option<EmptyQueryPolicy>,
    query: Option<String>,
    species: Option<String>,
    height: Option<f64>,
    opacity: Option<u8>,
    image: Option<String>,
    pick: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "sporen-cli\n\
\n\
USAGE:\n\
  sporen-cli [search] [--catalog <path>|-] [--config <path>] [--empty-query all|spaced] [<query>]\n\
  sporen-cli render --species <name> [--catalog <path>|-] [--config <path>] [--height <um>] [--opacity <0-100>] [--image <path>] [--pick] [--format svg|png|jpg] [--scale <n>] [--background <css-color>] [--out <path>]\n\
  sporen-cli ingest [--config <path>] [--pick] [--out <path>] <image>\n\
\n\
NOTES:\n\
  - The catalog defaults to ./species.json; '-' reads it from stdin.\n\
  - search prints one matching species name per line.\n\
  - render prints SVG to stdout by default; PNG/JPG default to ./<species>.png|jpg.\n\
  - --image loads the calibration photo as a drop; --pick loads it through the file chooser path.\n\
  - Log output goes to stderr and is controlled by SPOREN_LOG (default: warn).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut positional: Option<String> = None;
    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "search" => args.command = Command::Search,
            "render" => args.command = Command::Render,
            "ingest" => args.command = Command::Ingest,
            "--pick" => args.pick = true,
            "--catalog" => args.catalog = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--species" => args.species = Some(next_value(&mut it)?.clone()),
            "--image" => args.image = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--empty-query" => {
                let policy = next_value(&mut it)?
                    .parse::<EmptyQueryPolicy>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.empty_query = Some(policy);
            }
            "--height" => {
                let h = next_value(&mut it)?
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(usage()))?;
                args.height = Some(h);
            }
            "--opacity" => {
                let v = next_value(&mut it)?
                    .parse::<u8>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if v > 100 {
                    return Err(CliError::Usage(usage()));
                }
                args.opacity = Some(v);
            }
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if positional.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    positional = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            value => {
                if positional.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                positional = Some(value.to_string());
            }
        }
    }

    match args.command {
        Command::Search => args.query = positional,
        Command::Render => {
            if positional.is_some() || args.species.is_none() {
                return Err(CliError::Usage(usage()));
            }
        }
        Command::Ingest => {
            if positional.is_none() {
                return Err(CliError::Usage(usage()));
            }
            args.image = positional;
        }
    }

    Ok(args)
}

fn load_catalog(path: Option<&str>) -> Result<Catalog, CliError> {
    match path.unwrap_or("species.json") {
        "-" => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(Catalog::from_json_str(&buf)?)
        }
        path => Ok(Catalog::from_reader(std::fs::File::open(path)?)?),
    }
}

fn load_site_config(path: Option<&str>) -> Result<SiteConfig, CliError> {
    let Some(path) = path else {
        return Ok(SiteConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let overrides = SiteConfig::from_json_str(&text)?;
    Ok(SiteConfig::with_overrides(overrides.as_value()))
}

/// Declared media type for a dropped file, as a browser would derive it from the extension.
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn default_out_path(species: &str, ext: &str) -> PathBuf {
    let stem: String = species
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    let stem = if stem.is_empty() { "out" } else { stem };
    PathBuf::from(format!("{stem}.{ext}"))
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run_search(args: &Args) -> Result<(), CliError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let config = load_site_config(args.config.as_deref())?;
    let mut settings = SessionSettings::from_config(&config);
    if let Some(policy) = args.empty_query {
        settings.empty_query = policy;
    }

    let viewer = HeadlessViewer::with_settings(catalog, settings);
    let count = viewer.set_query(args.query.as_deref().unwrap_or(""));
    tracing::debug!(count, "search finished");

    let session = viewer.session();
    let mut out = String::new();
    for record in session.visible_species() {
        out.push_str(&record.name);
        out.push('\n');
    }
    write_text(&out, args.out.as_deref())
}

fn run_render(args: &Args) -> Result<(), CliError> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let config = load_site_config(args.config.as_deref())?;
    let viewer = HeadlessViewer::with_site_config(catalog, &config);

    let species = args.species.as_deref().ok_or(CliError::Usage(usage()))?;
    if let Some(height) = args.height {
        viewer.set_height_sync(height)?;
    }
    viewer.select_sync(species)?;
    if let Some(opacity) = args.opacity {
        viewer.set_opacity(opacity);
    }

    if let Some(path) = args.image.as_deref() {
        let path = Path::new(path);
        let bytes = std::fs::read(path)?;
        let loaded = if args.pick {
            viewer.pick_image(bytes)?
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            viewer.drop_files(&[DroppedFile::new(name, media_type_for(path), bytes)])?
        };
        if !loaded {
            tracing::warn!(path = %path.display(), "calibration image ignored");
        }
    }

    if let Some(error) = viewer.session().status().failure() {
        tracing::warn!(%error, "rendering without an up-to-date diagram");
    }

    let raster = RasterOptions {
        scale: args.render_scale,
        background: args.background.clone(),
        ..Default::default()
    };
    match args.render_format {
        RenderFormat::Svg => write_text(&viewer.render_svg(), args.out.as_deref()),
        RenderFormat::Png => {
            let bytes = viewer.render_png(&raster)?;
            let out = args
                .out
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| default_out_path(species, "png"));
            std::fs::write(out, bytes)?;
            Ok(())
        }
        RenderFormat::Jpeg => {
            let bytes = viewer.render_jpeg(&raster)?;
            let out = args
                .out
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| default_out_path(species, "jpg"));
            std::fs::write(out, bytes)?;
            Ok(())
        }
    }
}

fn run_ingest(args: &Args) -> Result<(), CliError> {
    let config = load_site_config(args.config.as_deref())?;
    let viewer = HeadlessViewer::with_site_config(Catalog::default(), &config);

    let path = Path::new(args.image.as_deref().ok_or(CliError::Usage(usage()))?);
    let bytes = std::fs::read(path)?;
    let loaded = if args.pick {
        viewer.pick_image(bytes)?
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        viewer.drop_files(&[DroppedFile::new(name, media_type_for(path), bytes)])?
    };
    if !loaded {
        return Err(IngestionError::NotAnImage {
            media_type: media_type_for(path).to_string(),
        }
        .into());
    }

    let session = viewer.session();
    let Some(image) = session.image() else {
        return Err(IngestionError::Empty.into());
    };
    let out = match args.out.as_deref() {
        Some(out) => PathBuf::from(out),
        None => {
            let ext = if image.media_type() == "image/png" { "png" } else { "img" };
            path.with_extension(format!("canonical.{ext}"))
        }
    };
    eprintln!(
        "{}x{} {} -> {}",
        image.width(),
        image.height(),
        image.media_type(),
        out.display()
    );
    std::fs::write(out, image.bytes())?;
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Search => run_search(&args),
        Command::Render => run_render(&args),
        Command::Ingest => run_ingest(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SPOREN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::UnknownSpecies(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
