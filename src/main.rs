use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use srb_core::{AnalysisConfig, OutputFormat, SrbConfig};
use srb_history::ChangeAggregator;
use srb_model::history::load_history;
use srb_report::output::render;
use srb_report::{write_output, Analyzer};

const CONFIG_FILE: &str = ".srb.toml";

#[derive(Parser)]
#[command(
    name = "srb",
    version,
    about = "Find Single Responsibility breakers in a project's history",
    long_about = "srb replays the structural history of a project and looks for code that\n\
                   keeps changing for too many reasons.\n\n\
                   Functions that change together are coupled. Dense clusters of coupled\n\
                   functions (blobs) and large sets of unrelated ones (anti-blobs) inside a\n\
                   single file or type point at Single Responsibility Principle violations.\n\n\
                   Examples:\n  \
                     srb analyze --history history.json        Rank files by SRP findings\n  \
                     srb analyze --history h.json --format md  Markdown report\n  \
                     srb analyze --history h.json --output-dir out  Write report and graphs\n  \
                     srb init                                  Create a .srb.toml config file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .srb.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Detect blobs and anti-blobs in a recorded history
    #[command(long_about = "Detect blobs and anti-blobs in a recorded history.\n\n\
        Replays the history, builds one temporal coupling graph per file and type,\n\
        and searches each graph for dense clusters of co-changing functions (blobs)\n\
        and large sets of barely coupled functions (anti-blobs). Thresholds given\n\
        here override the [analysis] section of .srb.toml.\n\n\
        Examples:\n  srb analyze --history history.json\n  \
        srb analyze --history history.json --min-coupling 0.2 --public-only\n  \
        srb analyze --history history.json --output-dir report --format json")]
    Analyze {
        /// Recorded history (JSON array of revisions)
        #[arg(long)]
        history: PathBuf,

        /// Revisions touching more files skip co-change accounting (default: 50)
        #[arg(long)]
        max_change_set: Option<usize>,

        /// Minimum revisions touching either end of an edge (default: 5)
        #[arg(long)]
        min_revisions: Option<u32>,

        /// Minimum coupling of an edge, between 0 and 1 (default: 0.1)
        #[arg(long)]
        min_coupling: Option<f64>,

        /// Minimum average weighted degree of a blob (default: 2.5)
        #[arg(long)]
        min_blob_density: Option<f64>,

        /// Maximum total coupling of an anti-blob member (default: 0.5)
        #[arg(long)]
        max_anti_coupling: Option<f64>,

        /// Minimum number of anti-blob members (default: 10)
        #[arg(long)]
        min_anti_blob_size: Option<usize>,

        /// Report every node of larger graphs as its own blob (default: 300)
        #[arg(long)]
        max_graph_size: Option<usize>,

        /// Only analyze public entities
        #[arg(long)]
        public_only: bool,

        /// Write report.json and per-container graphs into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Do not write Graphviz files next to the JSON graphs
        #[arg(long)]
        no_graphviz: bool,

        /// Maximum files to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a default .srb.toml configuration file
    #[command(long_about = "Create a default .srb.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .srb.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Threshold flags of `srb analyze`, each overriding the config file when set.
struct Overrides {
    max_change_set: Option<usize>,
    min_revisions: Option<u32>,
    min_coupling: Option<f64>,
    min_blob_density: Option<f64>,
    max_anti_coupling: Option<f64>,
    min_anti_blob_size: Option<usize>,
    max_graph_size: Option<usize>,
    public_only: bool,
}

impl Overrides {
    fn apply(self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(value) = self.max_change_set {
            config.max_change_set = value;
        }
        if let Some(value) = self.min_revisions {
            config.min_revisions = value;
        }
        if let Some(value) = self.min_coupling {
            config.min_coupling = value;
        }
        if let Some(value) = self.min_blob_density {
            config.min_blob_density = value;
        }
        if let Some(value) = self.max_anti_coupling {
            config.max_anti_coupling = value;
        }
        if let Some(value) = self.min_anti_blob_size {
            config.min_anti_blob_size = value;
        }
        if let Some(value) = self.max_graph_size {
            config.max_graph_size = value;
        }
        config.public_only |= self.public_only;
        config
    }
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1msrb\x1b[0m v{version}: Single Responsibility Breakers\n");

        println!("Quick start:");
        println!("  \x1b[36msrb init\x1b[0m                          Create a .srb.toml config file");
        println!("  \x1b[36msrb analyze --history h.json\x1b[0m      Rank files by SRP findings\n");

        println!("All commands:");
        println!("  \x1b[32manalyze\x1b[0m   Blob and anti-blob detection on a recorded history");
        println!("  \x1b[32minit\x1b[0m      Create default configuration\n");
    } else {
        println!("srb v{version}: Single Responsibility Breakers\n");

        println!("Quick start:");
        println!("  srb init                          Create a .srb.toml config file");
        println!("  srb analyze --history h.json      Rank files by SRP findings\n");

        println!("All commands:");
        println!("  analyze   Blob and anti-blob detection on a recorded history");
        println!("  init      Create default configuration\n");
    }

    println!("Run 'srb <command> --help' for details.");
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SrbConfig> {
    match path {
        Some(path) => SrbConfig::from_file(path)
            .wrap_err_with(|| format!("loading configuration from {}", path.display())),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                SrbConfig::from_file(default_path)
                    .wrap_err_with(|| format!("loading configuration from {CONFIG_FILE}"))
            } else {
                Ok(SrbConfig::default())
            }
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# srb Configuration
# See: https://github.com/Meru143/srb

[analysis]
# Revisions touching more files than this are left out of co-change accounting
# max_change_set = 50
# Minimum revisions touching either end of an edge
# min_revisions = 5
# Minimum coupling (shared revisions / revisions touching either end)
# min_coupling = 0.1
# Minimum average weighted degree of a blob
# min_blob_density = 2.5
# Maximum total coupling of an anti-blob member
# max_anti_coupling = 0.5
# Minimum number of anti-blob members
# min_anti_blob_size = 10
# Only analyze public entities
# public_only = false
# Larger graphs report every node as its own blob
# max_graph_size = 300

[output]
# Write report.json and graphs/ here on every run
# directory = "srb-report"
# Write Graphviz files next to the JSON graphs
# graphviz = true
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Analyze {
            ref history,
            max_change_set,
            min_revisions,
            min_coupling,
            min_blob_density,
            max_anti_coupling,
            min_anti_blob_size,
            max_graph_size,
            public_only,
            ref output_dir,
            no_graphviz,
            limit,
        }) => {
            let overrides = Overrides {
                max_change_set,
                min_revisions,
                min_coupling,
                min_blob_density,
                max_anti_coupling,
                min_anti_blob_size,
                max_graph_size,
                public_only,
            };
            let options = overrides.apply(config.analysis.clone()).to_options()?;

            let revisions = load_history(history)
                .wrap_err_with(|| format!("loading history from {}", history.display()))?;
            eprintln!(
                "Replaying {} revisions from {}...",
                revisions.len(),
                history.display()
            );

            let progress = if std::io::stderr().is_terminal() {
                let pb = indicatif::ProgressBar::new(revisions.len() as u64);
                pb.set_style(
                    indicatif::ProgressStyle::with_template(
                        "{bar:40.cyan/blue} {pos}/{len} revisions ({elapsed})",
                    )
                    .into_diagnostic()?,
                );
                Some(pb)
            } else {
                None
            };

            let mut aggregator = ChangeAggregator::new(options.max_change_set())?;
            for revision in &revisions {
                aggregator
                    .visit(revision)
                    .wrap_err_with(|| format!("replaying revision '{}'", revision.id))?;
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            }
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            let replay = aggregator.finish();
            eprintln!(
                "Replayed {} revisions ({} edits, {} too large), {} containers.",
                replay.stats.revisions,
                replay.stats.edits,
                replay.stats.oversized,
                replay.tallies.containers().len()
            );

            let mut report = Analyzer::new(options).report(&replay);

            let directory = output_dir.as_ref().or(config.output.directory.as_ref());
            if let Some(directory) = directory {
                let graphviz = config.output.graphviz && !no_graphviz;
                let written = write_output(&report, directory, graphviz)
                    .wrap_err_with(|| format!("writing report to {}", directory.display()))?;
                eprintln!("Wrote {} files to {}", written.len(), directory.display());
            }

            if let Some(limit) = limit {
                report.files.truncate(limit);
            }
            print!("{}", render(&report, cli.format)?);
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!(miette::miette!(
                    help = "Edit the existing file, or remove it to start over",
                    "{CONFIG_FILE} already exists"
                ));
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "srb", &mut std::io::stdout());
        }
    }

    Ok(())
}
