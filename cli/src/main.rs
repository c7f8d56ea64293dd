//! mdrecon CLI - Markdown reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdrecon::{
    BatchConverter, BatchEvent, BatchOptions, Config, ConvertOptions, ConvertResult,
    ConverterRegistry, Error, InputFormat, OutputFormat,
};

#[derive(Parser)]
#[command(name = "mdrecon")]
#[command(version)]
#[command(
    about = "Rebuild clean Markdown from HTML, Markdown, and PDF-extracted text",
    long_about = None
)]
struct Cli {
    /// YAML configuration file (default: ./cleaning_config.yaml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log verbosity; overrides RUST_LOG
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one document to Markdown
    Convert {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (or directory to write <name>.md into)
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Skip the structural walk; only post-process the input
        #[arg(long)]
        single_pass: bool,

        /// Input format (detected from the extension by default)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// What to write
        #[arg(long, value_enum, default_value = "markdown")]
        emit: EmitArg,

        /// Print extraction statistics
        #[arg(long)]
        stats: bool,

        /// Fail on malformed frontmatter instead of keeping it as text
        #[arg(long)]
        strict: bool,
    },

    /// Convert every supported file of a directory (or a list file)
    Batch {
        /// Directory with input documents
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Directory receiving the Markdown files
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Read input paths from this file instead, one per line
        #[arg(long, value_name = "FILE")]
        list: Option<PathBuf>,

        /// File collecting the names of inputs that failed
        #[arg(long, value_name = "PATH", default_value = mdrecon::batch::DEFAULT_FAILURE_LOG)]
        failure_log: PathBuf,

        /// Record the error next to each failing name
        #[arg(long)]
        reasons: bool,

        /// Worker threads (default: one per core)
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,

        /// Convert one document at a time
        #[arg(long)]
        sequential: bool,

        /// Skip the structural walk; only post-process the inputs
        #[arg(long)]
        single_pass: bool,
    },

    /// Post-process Markdown without restructuring it
    Clean {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Show the reconstructed outline of a document
    Info {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// HTML document
    Html,
    /// Markdown document
    Markdown,
    /// Raw text extracted from a PDF
    Text,
    /// JSON array of font-tagged text runs
    Runs,
}

impl From<FormatArg> for InputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Html => InputFormat::Html,
            FormatArg::Markdown => InputFormat::Markdown,
            FormatArg::Text => InputFormat::Text,
            FormatArg::Runs => InputFormat::TextRuns,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum EmitArg {
    /// Markdown text
    Markdown,
    /// The block model as JSON
    Json,
}

impl From<EmitArg> for OutputFormat {
    fn from(emit: EmitArg) -> Self {
        match emit {
            EmitArg::Markdown => OutputFormat::Markdown,
            EmitArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            single_pass,
            format,
            emit,
            stats,
            strict,
        } => cmd_convert(
            &input,
            &output,
            config,
            ConvertFlags {
                single_pass,
                format: format.map(Into::into),
                emit: emit.into(),
                stats,
                strict,
            },
        ),
        Commands::Batch {
            input_dir,
            output_dir,
            list,
            failure_log,
            reasons,
            jobs,
            sequential,
            single_pass,
        } => {
            let mut options = BatchOptions::new(output_dir)
                .with_failure_log(failure_log)
                .with_parallel(!sequential)
                .with_reasons(reasons);
            if let Some(jobs) = jobs {
                options = options.with_jobs(jobs);
            }
            cmd_batch(&input_dir, list.as_deref(), config, options, single_pass)
        }
        Commands::Clean { input, output } => cmd_convert(
            &input,
            &output,
            config,
            ConvertFlags {
                single_pass: true,
                ..ConvertFlags::default()
            },
        ),
        Commands::Info { input } => cmd_info(&input, config),
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

fn init_logging(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

fn load_options(config: Option<&Path>) -> Result<ConvertOptions, Error> {
    Ok(Config::load_or_default(config)?.to_convert_options())
}

#[derive(Default)]
struct ConvertFlags {
    single_pass: bool,
    format: Option<InputFormat>,
    emit: OutputFormat,
    stats: bool,
    strict: bool,
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    flags: ConvertFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = load_options(config)?
        .with_single_pass(flags.single_pass)
        .with_stats(flags.stats)
        .with_format(flags.emit);
    if flags.strict {
        options.parse = options.parse.strict();
    }

    let registry = ConverterRegistry::with_defaults();
    let result = match flags.format {
        Some(format) => registry.convert_as(input, format, &options)?,
        None => registry.convert(input, &options)?,
    };

    let target = output_file(input, output, flags.emit);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::from_io(e, parent))?;
    }
    fs::write(&target, &result.content).map_err(|e| Error::from_io(e, &target))?;
    println!("{} {}", "Saved to".green(), target.display());

    if flags.stats {
        print_stats(&result);
    }

    Ok(())
}

/// Output path for a single conversion; directories get `<stem>.md`.
fn output_file(input: &Path, output: &Path, emit: OutputFormat) -> PathBuf {
    if !output.is_dir() {
        return output.to_path_buf();
    }
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = match emit {
        OutputFormat::Markdown => "md",
        OutputFormat::Json => "json",
    };
    output.join(format!("{}.{}", stem, ext))
}

fn print_stats(result: &ConvertResult) {
    let Some(stats) = &result.stats else {
        return;
    };

    println!();
    println!("{}", "Extraction Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Code blocks".bold(), stats.code_block_count);
    println!(
        "{}: {} ({} items)",
        "Lists".bold(),
        stats.list_count,
        stats.list_item_count
    );
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Quotes".bold(), stats.blockquote_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
}

fn cmd_batch(
    input_dir: &Path,
    list: Option<&Path>,
    config: Option<&Path>,
    options: BatchOptions,
    single_pass: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let convert_options = load_options(config)?.with_single_pass(single_pass);
    let failure_log = options.failure_log.clone();

    let (tx, rx) = crossbeam_channel::unbounded::<BatchEvent>();
    let batch = BatchConverter::new(convert_options, options).with_events(tx);

    let inputs = match list {
        Some(list) => batch.inputs_from_list(list)?,
        None => batch.inputs_from_dir(input_dir)?,
    };
    if inputs.is_empty() {
        println!("{}", "No supported input files found".yellow());
        return Ok(());
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let watcher = thread::spawn(move || {
        for event in rx {
            match event {
                BatchEvent::Started { name, .. } => progress.set_message(name),
                BatchEvent::Finished { .. } => progress.inc(1),
                BatchEvent::Failed { name, error } => {
                    progress.println(format!("{} {}: {}", "Failed".red(), name, error));
                    progress.inc(1);
                }
            }
        }
    });

    let result = batch.run(&inputs);
    // Dropping the converter closes the channel and ends the watcher.
    drop(batch);
    let _ = watcher.join();
    let report = result?;

    pb.finish_with_message("Done!");

    let seconds = report.duration().num_milliseconds() as f64 / 1000.0;
    println!(
        "\n{} {} of {} documents converted in {:.1}s",
        "Done!".green().bold(),
        report.succeeded,
        report.total,
        seconds
    );
    if report.has_failures() {
        println!(
            "{} {} failed; names appended to {}",
            "Warning:".yellow().bold(),
            report.failed.len(),
            failure_log.display()
        );
    }

    Ok(())
}

fn cmd_info(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config)?
        .with_stats(true)
        .with_format(OutputFormat::Json);
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(input, &options)?;
    let doc: mdrecon::Document = serde_json::from_str(&result.content)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Blocks".bold(), doc.block_count());

    if let Some(fm) = &doc.frontmatter {
        let keys: Vec<String> = fm
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect();
        println!("{}: {}", "Frontmatter".bold(), keys.join(", "));
    }

    let outline = doc.outline();
    if !outline.is_empty() {
        println!();
        println!("{}", "Outline".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for (level, text) in outline {
            println!("{}{}", "  ".repeat(level as usize - 1), text);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "mdrecon".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Markdown reconstruction tool");
    println!();
    println!("License: MIT");
}
