//! cert-template CLI
//!
//! Usage:
//!   cert-template [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render   Serialize a layout (TOML) into a template document
//!   fill     Substitute recipient values into a template document
//!   check    Report placeholder problems and layout warnings
//!   save     Store a layout's document and background in a storage directory
//!   preview  Load a stored template, fill it and prepare it for display
//!   scale    Show the display scale for a canvas inside a container
//!
//! Options:
//!   -c, --config <FILE>  Editor configuration (TOML format)
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cert_template::layout::{compute_scale, AspectRatio, ContainerSize};
use cert_template::preview::{PreviewLoader, PreviewState, UNAVAILABLE_TITLE};
use cert_template::storage::FsBackend;
use cert_template::{
    parse, serialize_layout, substitute, EditorConfig, EditorSession, FieldValues, ResourceId,
    TemplateLayout,
};

#[derive(Parser)]
#[command(name = "cert-template")]
#[command(about = "Author and render certificate templates")]
struct Cli {
    /// Editor configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serialize a layout into a template document
    Render {
        /// Layout file (reads from stdin if not provided)
        layout: Option<PathBuf>,

        /// Fill the placeholders with sample values
        #[arg(long)]
        sample: bool,
    },

    /// Substitute recipient values into a template document
    Fill {
        /// Template document (reads from stdin if not provided)
        document: Option<PathBuf>,

        /// Field value, e.g. --set UserName="Jane Doe"
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        values: Vec<String>,
    },

    /// Report placeholder problems in a document, or layout warnings for a .toml layout
    Check {
        file: PathBuf,
    },

    /// Store a layout in a storage directory
    Save {
        /// Storage directory containing resources.toml
        #[arg(short, long)]
        root: PathBuf,

        /// Resource the template belongs to
        #[arg(long)]
        resource: u64,

        layout: PathBuf,
    },

    /// Load a stored template and prepare it for display
    Preview {
        /// Storage directory containing resources.toml
        #[arg(short, long)]
        root: PathBuf,

        #[arg(long)]
        resource: u64,

        /// Field value, e.g. --set UserName="Jane Doe"; sample values fill the rest
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        values: Vec<String>,
    },

    /// Show the display scale for a canvas inside a container
    Scale {
        /// Canvas aspect ratio (4:3 or 16:9)
        #[arg(long, default_value = "4:3")]
        aspect: AspectRatio,

        /// Container size, e.g. 1280x720
        container: ContainerSize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cert_template=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EditorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Render { layout, sample } => {
            let layout = load_layout(layout.as_deref());
            match serialize_layout(&layout, &config.document) {
                Ok(html) if sample => println!("{}", substitute(&html, &FieldValues::sample())),
                Ok(html) => println!("{}", html),
                Err(e) => fail(e),
            }
        }
        Command::Fill { document, values } => {
            let source = read_input(document.as_deref());
            let values = parse_values(FieldValues::new(), &values);
            let doc = parse(&source);
            for diagnostic in doc.diagnostics() {
                eprint!("{}", diagnostic.format(&source, &display_name(document.as_deref())));
            }
            println!("{}", substitute(&source, &values));
        }
        Command::Check { file } => check(&file),
        Command::Save {
            root,
            resource,
            layout,
        } => {
            let layout = load_layout(Some(layout.as_path()));
            let backend = FsBackend::new(root);
            let session = match EditorSession::open(&backend, ResourceId(resource), config).await {
                Ok(s) => s,
                Err(e) => fail(e),
            };
            let mut session = match session.with_layout(&layout) {
                Ok(s) => s,
                Err(e) => fail(e),
            };
            let result = session.save(&backend).await;
            for note in session.drain_notifications() {
                eprintln!("{}", note);
            }
            match result {
                Ok(report) => {
                    let complete = report.is_complete();
                    if let Some(artifact) = report.fallback {
                        match fs::write(&artifact.filename, &artifact.content) {
                            Ok(()) => eprintln!("Local copy written to {}", artifact.filename),
                            Err(e) => eprintln!("Error writing '{}': {}", artifact.filename, e),
                        }
                    }
                    if let Some(stored) = report.document {
                        println!("{}", stored);
                    }
                    if !complete {
                        std::process::exit(1);
                    }
                }
                Err(e) => fail(e),
            }
        }
        Command::Preview {
            root,
            resource,
            values,
        } => {
            let values = parse_values(FieldValues::sample(), &values);
            let backend = FsBackend::new(root);
            let loader = PreviewLoader::new(&backend);
            match loader.load(ResourceId(resource), &values).await {
                Ok(PreviewState::Ready(preview)) => println!("{}", preview.html),
                Ok(PreviewState::Unavailable { reason }) => {
                    eprintln!("{}: {}", UNAVAILABLE_TITLE, reason);
                    std::process::exit(1);
                }
                Err(e) => fail(e),
            }
        }
        Command::Scale { aspect, container } => {
            let canvas = aspect.canvas();
            let scale = compute_scale(canvas, Some(container), &config.scale);
            println!(
                "canvas {}x{} in {}x{}: scale {:.4} ({:.1}x{:.1} on screen)",
                canvas.width,
                canvas.height,
                container.width,
                container.height,
                scale,
                canvas.width as f64 * scale,
                canvas.height as f64 * scale,
            );
        }
    }
}

fn check(path: &Path) {
    let source = read_input(Some(path));
    let name = display_name(Some(path));

    if path.extension().is_some_and(|ext| ext == "toml") {
        let layout = parse_layout(&source);
        let (settings, elements) = match (layout.settings(), layout.elements()) {
            (Ok(s), Ok(e)) => (s, e),
            (Err(e), _) | (_, Err(e)) => fail(e),
        };
        let warnings = cert_template::layout::lint::check(settings.canvas(), &elements);
        for warning in &warnings {
            println!("{}", warning);
        }
        println!("{}: {} element(s), {} warning(s)", name, elements.len(), warnings.len());
        return;
    }

    let doc = parse(&source);
    for diagnostic in doc.diagnostics() {
        eprint!("{}", diagnostic.format(&source, &name));
    }
    let fields: Vec<String> = doc.fields().iter().map(|f| f.to_string()).collect();
    println!(
        "{}: fields [{}], {} background reference(s), {} problem(s)",
        name,
        fields.join(", "),
        doc.background_refs().count(),
        doc.diagnostics().len()
    );
}

fn load_layout(path: Option<&Path>) -> TemplateLayout {
    parse_layout(&read_input(path))
}

fn parse_layout(source: &str) -> TemplateLayout {
    match TemplateLayout::from_toml(source) {
        Ok(layout) => layout,
        Err(e) => fail(e),
    }
}

fn parse_values(mut values: FieldValues, assignments: &[String]) -> FieldValues {
    for assignment in assignments {
        if let Err(e) = values.insert_assignment(assignment) {
            fail(e);
        }
    }
    values
}

fn display_name(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string())
}

fn read_input(path: Option<&Path>) -> String {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
