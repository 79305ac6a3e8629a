//! pdfgen CLI - PDF generation from YAML documents

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfgen::{
    default_output_path, render, BuildOptions, Document, DocumentBuilder, JsonFormat,
    RenderOptions, VariableMap,
};

#[derive(Parser)]
#[command(name = "pdfgen")]
#[command(version)]
#[command(about = "Generate PDF documents from YAML", long_about = None)]
struct Cli {
    /// Input YAML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file (generated.pdf next to the input if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    variables: VariableArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PDF from a YAML document
    #[command(alias = "gen")]
    Generate {
        /// Input YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file (generated.pdf next to the input if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a YAML document without rendering it
    Check {
        /// Input YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Dump the validated document model as JSON
    Json {
        /// Input YAML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct VariableArgs {
    /// Set a variable (repeatable), e.g. --var serial_number=123456789
    #[arg(long = "var", value_name = "KEY=VALUE", global = true)]
    vars: Vec<String>,

    /// Load variables from a YAML mapping file
    #[arg(long = "vars", value_name = "FILE", env = "PDFGEN_VARS", global = true)]
    vars_file: Option<PathBuf>,

    /// Ignore the document's own variables section
    #[arg(long, global = true)]
    no_document_variables: bool,
}

impl VariableArgs {
    /// File variables first, then `--var` flags on top.
    fn variable_map(&self) -> pdfgen::Result<VariableMap> {
        let mut variables = match &self.vars_file {
            Some(path) => VariableMap::from_yaml_file(path)?,
            None => VariableMap::new(),
        };
        for assignment in &self.vars {
            let (key, value) = VariableMap::parse_assignment(assignment)?;
            variables.insert(key, value);
        }
        Ok(variables)
    }

    fn build_options(&self) -> pdfgen::Result<BuildOptions> {
        let options = BuildOptions::new().with_variables(self.variable_map()?);
        Ok(if self.no_document_variables {
            options.without_document_variables()
        } else {
            options
        })
    }
}

#[derive(Args, Default)]
struct RenderArgs {
    /// Directory image resources resolve against (the input's directory if
    /// not specified)
    #[arg(long, value_name = "DIR", global = true)]
    base_dir: Option<PathBuf>,

    /// Write uncompressed content streams
    #[arg(long, global = true)]
    no_compress: bool,
}

impl RenderArgs {
    fn render_options(&self, input: &Path) -> RenderOptions {
        let mut options = RenderOptions::new().with_compression(!self.no_compress);
        let base_dir = self
            .base_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = base_dir {
            options = options.with_base_dir(dir);
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Generate { input, output }) => {
            cmd_generate(&input, output.as_deref(), &cli.variables, &cli.render)
        }
        Some(Commands::Check { input }) => cmd_check(&input, &cli.variables),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact, &cli.variables),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: generate if input is provided
            if let Some(input) = cli.input {
                cmd_generate(&input, cli.output.as_deref(), &cli.variables, &cli.render)
            } else {
                println!("{}", "Usage: pdfgen <FILE> [-o OUTPUT]".yellow());
                println!("       pdfgen --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn build_document(input: &Path, variables: &VariableArgs) -> pdfgen::Result<Document> {
    DocumentBuilder::with_options(variables.build_options()?).build_file(input)
}

fn cmd_generate(
    input: &Path,
    output: Option<&Path>,
    variables: &VariableArgs,
    render_args: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    pb.set_message("Building document...");
    let doc = match build_document(input, variables) {
        Ok(doc) => doc,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.set_message("Rendering PDF...");
    let options = render_args.render_options(input);
    let stats = match render::render_to_file(&doc, &output, &options) {
        Ok(stats) => stats,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    println!("{} {}", "Saved to".green(), output.display());
    println!(
        "  {} {} page(s), {} paragraph(s), {} table(s), {} image(s)",
        "└─".dimmed(),
        stats.page_count,
        stats.paragraph_count,
        stats.table_count,
        stats.image_count
    );

    Ok(())
}

fn cmd_check(input: &Path, variables: &VariableArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = build_document(input, variables)?;
    let stats = pdfgen::RenderStats::from_document(&doc);
    let (width, height) = doc.sheet.dimensions();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {:.0} x {:.0} pt", "Page".bold(), width, height);
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Elements".bold(), doc.len());
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Rows".bold(), stats.row_count);
    println!("{}: {}", "Images".bold(), stats.image_count);

    println!("\n{}", "Document is valid".green().bold());
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    variables: &VariableArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = build_document(input, variables)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfgen".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF generation from YAML documents");
    println!();
    println!("License: MIT");
}
