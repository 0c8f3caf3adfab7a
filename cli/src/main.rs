//! repdf CLI - PDF page transformation tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use repdf::{
    CleanupPreset, CompressOptions, ConfigStore, OutputArtifact, PageRange, Repdf, SourceFile,
    ToolConfig,
};

#[derive(Parser)]
#[command(name = "repdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Merge, split, compress and extract PDF documents", long_about = None)]
struct Cli {
    /// Config file
    #[arg(long, global = true, value_name = "FILE", env = "REPDF_CONFIG", default_value = "repdf.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge PDFs in the given order
    Merge {
        /// Input PDF files (at least two)
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Keep selected pages of a PDF
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page range (e.g., "1-3,5,8-9")
        #[arg(short, long)]
        pages: String,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Shrink a PDF by re-rendering its pages as JPEG (lossy)
    Compress {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Render scale (0.3-2.0)
        #[arg(long)]
        scale: Option<f32>,

        /// JPEG quality (0.1-0.9)
        #[arg(long)]
        quality: Option<f32>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build a PDF with one page per JPEG or PNG image
    Images {
        /// Input image files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Extract plain text
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Skip pages whose text cannot be read
        #[arg(long)]
        lenient: bool,
    },

    /// Show document information
    Info {
        /// Input PDF or image file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,

    /// Change one setting
    Set {
        /// Setting name (scale, quality, parallel, lenient_text, cleanup, output_dir)
        key: String,

        /// New value
        value: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (also strips private-use glyphs)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge { inputs, output } => {
            load_config(&cli.config).and_then(|cfg| cmd_merge(cfg, &inputs, output.as_deref()))
        }
        Commands::Split {
            input,
            pages,
            output,
        } => load_config(&cli.config)
            .and_then(|cfg| cmd_split(cfg, &input, &pages, output.as_deref())),
        Commands::Compress {
            input,
            scale,
            quality,
            output,
        } => load_config(&cli.config)
            .and_then(|cfg| cmd_compress(cfg, &input, scale, quality, output.as_deref())),
        Commands::Images { inputs, output } => {
            load_config(&cli.config).and_then(|cfg| cmd_images(cfg, &inputs, output.as_deref()))
        }
        Commands::Text {
            input,
            output,
            stdout,
            cleanup,
            pages,
            lenient,
        } => load_config(&cli.config).and_then(|cfg| {
            cmd_text(
                cfg,
                &input,
                output.as_deref(),
                stdout,
                cleanup,
                pages.as_deref(),
                lenient,
            )
        }),
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Config { action } => cmd_config(&cli.config, action),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<ToolConfig, Box<dyn std::error::Error>> {
    let config = ConfigStore::open(path)?.into_config();
    log::debug!("Using config {} ({:?})", path.display(), config);
    Ok(config)
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, Box<dyn std::error::Error>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(SourceFile::from_path(path)?);
    }
    Ok(sources)
}

/// Write an artifact to `output`, or under its own name in the configured
/// output directory (current directory if unset).
fn write_artifact(
    artifact: &OutputArtifact,
    output: Option<&Path>,
    config: &ToolConfig,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = match output {
        Some(path) => {
            artifact.save(path)?;
            path.to_path_buf()
        }
        None => {
            let dir = config
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            artifact.save_in(dir)?
        }
    };
    println!(
        "{} {} ({})",
        "Saved to".green(),
        path.display(),
        format_size(artifact.len())
    );
    Ok(path)
}

fn cmd_merge(config: ToolConfig, inputs: &[PathBuf], output: Option<&Path>) -> CliResult {
    let sources = read_sources(inputs)?;

    let pb = spinner(&format!("Merging {} files...", sources.len()))?;
    let result = Repdf::from_config(config.clone()).merge(&sources);
    pb.finish_and_clear();

    write_artifact(&result?, output, &config)?;
    Ok(())
}

fn cmd_split(config: ToolConfig, input: &Path, pages: &str, output: Option<&Path>) -> CliResult {
    let range: PageRange = pages.parse()?;
    let source = SourceFile::from_path(input)?;

    let pb = spinner(&format!("Selecting pages {}...", range))?;
    let result = Repdf::from_config(config.clone()).split(&source, &range);
    pb.finish_and_clear();

    write_artifact(&result?, output, &config)?;
    Ok(())
}

fn cmd_compress(
    config: ToolConfig,
    input: &Path,
    scale: Option<f32>,
    quality: Option<f32>,
    output: Option<&Path>,
) -> CliResult {
    let mut options = config.compress_options();
    if let Some(scale) = scale {
        options = options.with_scale(scale);
    }
    if let Some(quality) = quality {
        options = options.with_quality(quality);
    }

    eprintln!(
        "{} every page becomes a JPEG image; text will no longer be selectable or searchable",
        "Warning:".yellow().bold()
    );

    let source = SourceFile::from_path(input)?;
    let pb = spinner(&format!(
        "Compressing (scale {:.2}, quality {:.2})...",
        options.scale, options.quality
    ))?;
    let result = compress(&config, &source, &options);
    pb.finish_and_clear();

    let artifact = result?;
    write_artifact(&artifact, output, &config)?;

    let before = source.len().max(1) as f64;
    let ratio = artifact.len() as f64 / before * 100.0;
    println!(
        "{} {} -> {} ({:.0}%)",
        "Size:".bold(),
        format_size(source.len()),
        format_size(artifact.len()),
        ratio
    );
    Ok(())
}

fn compress(
    config: &ToolConfig,
    source: &SourceFile,
    options: &CompressOptions,
) -> repdf::Result<OutputArtifact> {
    Repdf::from_config(config.clone()).compress_with(source, options)
}

fn cmd_images(config: ToolConfig, inputs: &[PathBuf], output: Option<&Path>) -> CliResult {
    let sources = read_sources(inputs)?;

    let pb = spinner(&format!("Embedding {} images...", sources.len()))?;
    let result = Repdf::from_config(config.clone()).images(&sources);
    pb.finish_and_clear();

    write_artifact(&result?, output, &config)?;
    Ok(())
}

fn cmd_text(
    config: ToolConfig,
    input: &Path,
    output: Option<&Path>,
    stdout: bool,
    cleanup: Option<CleanupLevel>,
    pages: Option<&str>,
    lenient: bool,
) -> CliResult {
    let range = pages.map(str::parse::<PageRange>).transpose()?;
    let source = SourceFile::from_path(input)?;

    let mut repdf = Repdf::from_config(config.clone());
    if let Some(level) = cleanup {
        repdf = repdf.with_cleanup(level.into());
    }
    if lenient {
        repdf = repdf.lenient();
    }

    let artifact = repdf.text(&source, range.as_ref())?;

    if stdout {
        println!("{}", String::from_utf8_lossy(artifact.bytes()));
    } else {
        write_artifact(&artifact, output, &config)?;
    }
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> CliResult {
    let source = SourceFile::from_path(input)?;
    let format = source.format()?;
    let metadata = Repdf::new().inspect(&source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Size".bold(), format_size(source.len()));
    if format.is_pdf() {
        println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    } else {
        println!("{}: {}", "Format".bold(), format.mime_type());
    }
    println!("{}: {}", "Pages".bold(), metadata.page_count);

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_config(path: &Path, action: ConfigAction) -> CliResult {
    let mut store = ConfigStore::open(path)?;

    match action {
        ConfigAction::Show => {
            println!("{} {}", "Config".cyan().bold(), store.path().display().to_string().dimmed());
            println!("{}", serde_json::to_string_pretty(store.config())?);
        }
        ConfigAction::Set { key, value } => {
            store.update(|cfg| cfg.set(&key, &value))?;
            println!("{} {} = {}", "Set".green(), key.bold(), value);
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "repdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page transformation tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/repdf".dimmed());
    println!("License: MIT");
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes = bytes as f64;
    if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}
