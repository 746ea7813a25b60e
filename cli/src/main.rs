//! mdpress CLI - CJK Markdown normalization and docx conversion
//!
//! A command-line tool for cleaning CJK whitespace in Markdown documents
//! and converting them to Word documents through Pandoc.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mdpress::{convert_file, ConvertOptions, NormalizeOptions};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// CJK Markdown normalization and Pandoc docx conversion
#[derive(Parser)]
#[command(
    name = "mdpress",
    version,
    about = "Normalize CJK whitespace in Markdown and convert to docx",
    long_about = "mdpress - CJK-aware Markdown preparation for Pandoc.\n\n\
                  Removes the cosmetic spaces that word-wrap and prose\n\
                  authoring leave around CJK text, without touching code\n\
                  fences, display math, tables, or Markdown prefixes.\n\n\
                  Usage:\n  \
                  mdpress <file.md>                     Normalize to stdout\n  \
                  mdpress convert <file.md> -t tpl.docx Full docx pipeline\n  \
                  mdpress check <file.md>               Dry run with report"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (for default normalization)
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a Markdown document
    #[command(visible_alias = "norm")]
    Normalize {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON report of what was done to stderr
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Convert a document to docx through Pandoc
    Convert {
        /// Input file path
        input: PathBuf,

        /// Reference .docx style template
        #[arg(short, long)]
        template: PathBuf,

        /// Lua layout filter passed to Pandoc
        #[arg(short, long)]
        filter: Option<PathBuf>,

        /// Cover/TOC merge tool, run on the produced artifact
        #[arg(short, long)]
        merge: Option<PathBuf>,

        /// Output file path (default: <stem>_<timestamp>.docx next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pandoc executable
        #[arg(long, default_value = "pandoc")]
        pandoc: PathBuf,

        /// Keep the normalized intermediate Markdown
        #[arg(long)]
        keep_intermediate: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Dry run: report what normalization would change
    Check {
        /// Input file path
        input: PathBuf,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct Tuning {
    /// Only join soft wraps and collapse CJK-adjacent spaces
    #[arg(long)]
    cjk_only: bool,

    /// Apply Unicode NFC normalization first
    #[arg(long)]
    nfc: bool,

    /// Disable parallel line processing
    #[arg(long)]
    sequential: bool,
}

impl Tuning {
    fn to_options(&self) -> NormalizeOptions {
        let mut options = if self.cjk_only {
            NormalizeOptions::cjk_only()
        } else {
            NormalizeOptions::default()
        };
        options.nfc = self.nfc;
        options.parallel = !self.sequential;
        options
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Default command: normalize to stdout (mdpress <file.md>)
    if cli.command.is_none() {
        if let Some(input) = cli.input {
            let normalized = mdpress::normalize_file(&input)?;
            write_output(None, &normalized)?;
            return Ok(());
        }
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    }

    match cli.command.unwrap() {
        Commands::Normalize {
            input,
            output,
            report,
            tuning,
        } => {
            let content = fs::read_to_string(&input)?;
            let options = tuning.to_options();
            let (normalized, run_report) = mdpress::normalize_with_report(&content, &options)?;

            write_output(output.as_ref(), &normalized)?;

            if report {
                eprintln!("{}", run_report.to_json());
            }
            if let Some(path) = output {
                println!(
                    "{} Normalized: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Convert {
            input,
            template,
            filter,
            merge,
            output,
            pandoc,
            keep_intermediate,
            tuning,
        } => {
            let pb = create_spinner("Normalizing document...");

            let mut options = ConvertOptions::new(template)
                .with_pandoc_program(pandoc)
                .with_normalize_options(tuning.to_options());
            if let Some(filter) = filter {
                options = options.with_lua_filter(filter);
            }
            if let Some(merge) = merge {
                options = options.with_merge_tool(merge);
            }
            if let Some(output) = output {
                options = options.with_output(output);
            }
            if keep_intermediate {
                options = options.keep_intermediate();
            }

            pb.set_message("Running Pandoc...");
            let outcome = convert_file(&input, &options)?;
            pb.finish_and_clear();

            println!("{}", "Conversion Complete".green().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Output".bold(), outcome.output.display());
            if let Some(title) = &outcome.title {
                println!("{}: {}", "Title".bold(), title);
            }
            print_report_lines(&outcome.report);
        }

        Commands::Check { input, tuning } => {
            let content = fs::read_to_string(&input)?;
            let options = tuning.to_options();
            let (normalized, report) = mdpress::normalize_with_report(&content, &options)?;

            println!("{}", "Normalization Report".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            print_report_lines(&report);

            if normalized == content {
                println!("\n{} Document is already normalized", "✓".green().bold());
            } else {
                println!(
                    "\n{} {} lines would change",
                    "!".yellow().bold(),
                    report.lines_rewritten
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_report_lines(report: &mdpress::NormalizeReport) {
    println!("{}: {}", "Lines".bold(), report.lines_total);
    println!("{}: {}", "Rewritten".bold(), report.lines_rewritten);
    println!("{}: {}", "Guarded (aligned)".bold(), report.lines_guarded);
    println!("{}: {}", "Protected blocks".bold(), report.protected_blocks);
    println!("{}: {}", "Joined wraps".bold(), report.joined_line_breaks);
    println!("{}: {}", "Bytes removed".bold(), report.bytes_removed);
}

fn print_version() {
    println!("{} {}", "mdpress".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("CJK-aware Markdown normalization and Pandoc docx conversion");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
        }
    }
    Ok(())
}
