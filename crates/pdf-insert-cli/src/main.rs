use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_insert::PageDocument;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfins", about = "Insert, replace and append PDF pages", version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge pages of a source PDF into a base PDF
    Merge {
        #[command(flatten)]
        options: OptionArgs,

        /// Output PDF file
        #[arg(short, long, required_unless_present = "preview")]
        output: Option<PathBuf>,

        /// Print what the merge would do, don't write anything
        #[arg(long)]
        preview: bool,
    },

    /// Show page count and first page size of a PDF
    Info {
        /// PDF file to inspect
        file: PathBuf,
    },

    /// Write merge options to a JSON file
    SaveConfig {
        #[command(flatten)]
        options: OptionArgs,
    },
}

// Explicit flags win over --quick, which wins over --config
#[derive(Args)]
struct OptionArgs {
    /// Base PDF receiving pages
    #[arg(long)]
    base: Option<PathBuf>,

    /// Source PDF supplying pages
    #[arg(long)]
    source: Option<PathBuf>,

    /// Source pages, e.g. "1-3,7" or "all"
    #[arg(long)]
    pages: Option<String>,

    /// Base positions, e.g. "2,mid,end"
    #[arg(long)]
    positions: Option<String>,

    /// How source pages are combined with the base
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Preset selection, positions and mode
    #[arg(long, value_enum)]
    quick: Option<QuickArg>,

    /// JSON options file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Empty --pages selects nothing instead of every page
    #[arg(long)]
    no_select_all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Replace,
    Before,
    After,
    Append,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuickArg {
    ReplaceFirst,
    InsertMiddle,
    AppendAll,
}

impl From<ModeArg> for pdf_insert::InsertionPolicy {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Replace => Self::Replace,
            ModeArg::Before => Self::InsertBefore,
            ModeArg::After => Self::InsertAfter,
            ModeArg::Append => Self::Append,
        }
    }
}

impl From<QuickArg> for pdf_insert::QuickAction {
    fn from(arg: QuickArg) -> Self {
        match arg {
            QuickArg::ReplaceFirst => Self::ReplaceFirstPage,
            QuickArg::InsertMiddle => Self::InsertAtMiddle,
            QuickArg::AppendAll => Self::AppendAll,
        }
    }
}

impl OptionArgs {
    /// Load `--config` if given, then layer the other flags on top
    async fn load(self) -> Result<pdf_insert::InsertOptions> {
        let mut options = match &self.config {
            Some(path) => pdf_insert::InsertOptions::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => pdf_insert::InsertOptions::default(),
        };
        self.apply(&mut options);
        Ok(options)
    }

    fn apply(self, options: &mut pdf_insert::InsertOptions) {
        if let Some(quick) = self.quick {
            pdf_insert::QuickAction::from(quick).apply(options);
        }
        if let Some(base) = self.base {
            options.base_file = Some(base);
        }
        if let Some(source) = self.source {
            options.source_file = Some(source);
        }
        if let Some(pages) = self.pages {
            options.pages = pages;
        }
        if let Some(positions) = self.positions {
            options.positions = positions;
        }
        if let Some(mode) = self.mode {
            options.policy = mode.into();
        }
        if self.no_select_all {
            options.select_all_on_empty = false;
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Merge {
            options,
            output,
            preview,
        } => {
            let options = options.load().await?;
            log::debug!("Resolved options: {:?}", options);
            options.validate()?;

            let base_path = options.base_file.as_deref().context("No base file specified")?;
            let source_path = options
                .source_file
                .as_deref()
                .context("No source file specified")?;

            let base = pdf_insert::load_pdf(base_path)
                .await
                .with_context(|| format!("Failed to open {}", base_path.display()))?;
            let source = pdf_insert::load_pdf(source_path)
                .await
                .with_context(|| format!("Failed to open {}", source_path.display()))?;

            if preview {
                let summary =
                    pdf_insert::generate_preview(base.page_count(), source.page_count(), &options)?;
                print!("{}", summary);
                return Ok(());
            }

            let Some(output) = output else {
                anyhow::bail!("--output is required unless --preview is given");
            };

            let (merged, stats) = pdf_insert::merge(base, source, &options).await?;
            pdf_insert::save_pdf(merged, &output).await?;

            println!("Merge Statistics:");
            println!("  Base pages: {}", stats.base_pages);
            println!("  Inserted pages: {}", stats.inserted_pages);
            println!("  Replaced pages: {}", stats.replaced_pages);
            println!("  Output pages: {}", stats.output_pages);
            println!("Merged → {}", output.display());
        }

        Commands::Info { file } => {
            let doc = pdf_insert::load_pdf(&file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;

            println!("{}", file.display());
            println!("  Pages: {}", doc.page_count());
            if doc.page_count() > 0 {
                let size = doc.page_geometry(0)?;
                println!("  First page: {} x {} pt", size.width, size.height);
            }
        }

        Commands::SaveConfig { options } => {
            let Some(path) = options.config.clone() else {
                anyhow::bail!("--config is required to save options");
            };

            // --config names the destination here, so nothing is loaded from it
            let mut resolved = pdf_insert::InsertOptions::default();
            options.apply(&mut resolved);
            resolved.save(&path).await?;
            println!("Saved options → {}", path.display());
        }
    }

    Ok(())
}
