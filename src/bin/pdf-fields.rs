//! PDF Fields CLI tool
//!
//! A command-line tool for flattening text and image fields onto a PDF.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use log::info;

use pdf_fields::diagnostics;
use pdf_fields::pdf::{
    extract_metadata, flatten, image_data_uri_from_path, save_flattened, FlattenOptions,
    SourceDocument,
};
use pdf_fields::preset::{self, Preset};
use pdf_fields::{FieldId, FieldModel, Surface};

/// PDF Fields - Place text and image fields on a PDF and flatten them
#[derive(Parser)]
#[command(name = "pdf-fields")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Flatten the built-in template onto a contract
    pdf-fields flatten --source contract.pdf

    # Flatten a preset, filling in a text field and a signature image
    pdf-fields flatten --source contract.pdf --preset fields.json --text 1=\"Jane Doe\" --image 3=signature.png

    # Print the fields a preset would produce
    pdf-fields dump --preset fields.json")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw fields onto the first page of a PDF and save it as eSign.pdf
    Flatten {
        /// Source PDF (defaults to a blank US Letter page)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Preset JSON file (defaults to the built-in template)
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Directory to write eSign.pdf into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Editor surface size as WIDTHxHEIGHT (defaults to the page size)
        #[arg(long)]
        surface: Option<String>,

        /// Set a text field's content: ID=TEXT (repeatable)
        #[arg(long = "text", value_name = "ID=TEXT")]
        texts: Vec<String>,

        /// Attach an image file to an image field: ID=PATH (repeatable)
        #[arg(long = "image", value_name = "ID=PATH")]
        images: Vec<String>,

        /// Log the field list before flattening
        #[arg(long)]
        dump: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Print the JSON dump of a preset's fields
    Dump {
        /// Preset JSON file (defaults to the built-in template)
        #[arg(short, long)]
        preset: Option<PathBuf>,
    },

    /// Print the built-in template preset as JSON
    Template,

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let result = match cli.command {
        Commands::Flatten { source, preset, out_dir, surface, texts, images, dump, open } => {
            cmd_flatten(source, preset, out_dir, surface, texts, images, dump, open)
        }
        Commands::Dump { preset } => cmd_dump(preset),
        Commands::Template => cmd_template(),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_preset(path: Option<&Path>) -> anyhow::Result<Preset> {
    match path {
        Some(path) => Preset::from_path(path)
            .with_context(|| format!("Failed to read preset {}", path.display())),
        None => Ok(preset::template()),
    }
}

/// Parse "612x792"
fn parse_surface(value: &str) -> anyhow::Result<Surface> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("Surface must look like WIDTHxHEIGHT, got {:?}", value))?;
    let width: f32 = w.trim().parse().with_context(|| format!("Bad surface width {:?}", w))?;
    let height: f32 = h.trim().parse().with_context(|| format!("Bad surface height {:?}", h))?;
    if width <= 0.0 || height <= 0.0 {
        bail!("Surface dimensions must be positive, got {}", value);
    }
    Ok(Surface::new(width, height))
}

/// Parse "ID=VALUE"
fn parse_assignment(arg: &str) -> anyhow::Result<(FieldId, &str)> {
    let (id, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected ID=VALUE, got {:?}", arg))?;
    let id: u64 = id.trim().parse().with_context(|| format!("Bad field id {:?}", id))?;
    Ok((FieldId(id), value))
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Load fields, apply edits and flatten them onto the source
#[allow(clippy::too_many_arguments)]
fn cmd_flatten(
    source: Option<PathBuf>,
    preset: Option<PathBuf>,
    out_dir: PathBuf,
    surface: Option<String>,
    texts: Vec<String>,
    images: Vec<String>,
    dump: bool,
    open: bool,
) -> anyhow::Result<()> {
    let source = match source {
        Some(path) => SourceDocument::from_path(&path)
            .with_context(|| format!("Failed to read source {}", path.display()))?,
        None => SourceDocument::blank_letter()?,
    };

    let surface = match surface {
        Some(value) => parse_surface(&value)?,
        None => Surface::for_page(extract_metadata(&source)?.first_page),
    };

    let mut model = FieldModel::new(surface);
    model.load_preset(load_preset(preset.as_deref())?);

    for arg in &texts {
        let (id, text) = parse_assignment(arg)?;
        if !model.set_text(id, text) && model.field(id).is_none() {
            bail!("No field with id {}", id);
        }
    }

    for arg in &images {
        let (id, path) = parse_assignment(arg)?;
        let uri = image_data_uri_from_path(Path::new(path))
            .with_context(|| format!("Failed to read image {}", path))?;
        if !model.set_image(id, uri) && model.field(id).map_or(true, |f| !f.is_image()) {
            bail!("No image field with id {}", id);
        }
    }

    if dump {
        diagnostics::log_dump(&model.fields())?;
    }

    eprintln!("Flattening {} fields onto {}...", model.len(), source.label());
    let flattened = flatten(&model.fields(), &source, &FlattenOptions::default())?;

    for skipped in &flattened.skipped {
        eprintln!("Warning: field {} skipped: {}", skipped.id, skipped.reason);
    }

    let output = save_flattened(&flattened.bytes, &out_dir)
        .with_context(|| format!("Failed to save into {}", out_dir.display()))?;
    info!("drew {} of {} fields", flattened.drawn.len(), model.len());

    eprintln!("Output: {}", output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Print the field dump for a preset
fn cmd_dump(preset: Option<PathBuf>) -> anyhow::Result<()> {
    let mut model = FieldModel::default();
    model.load_preset(load_preset(preset.as_deref())?);
    println!("{}", diagnostics::dump(&model.fields())?);
    Ok(())
}

/// Print the built-in template
fn cmd_template() -> anyhow::Result<()> {
    println!("{}", preset::template().to_json_pretty()?);
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let source = SourceDocument::from_path(&input)?;
    let metadata = extract_metadata(&source)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);
    println!(
        "First page: {} x {} pt",
        metadata.first_page.width, metadata.first_page.height
    );

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
