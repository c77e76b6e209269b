use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sc_loc_tool::backup::BackupManager;
use sc_loc_tool::config::Config;
use sc_loc_tool::game::{self, GameLocator};
use sc_loc_tool::kv_store::KeyValueStore;
use sc_loc_tool::merge::{validate_all, TranslationMerger};
use sc_loc_tool::project::TranslationProject;
use sc_loc_tool::report::Reporter;
use sc_loc_tool::translation::TranslationRecord;
use sc_loc_tool::validation::TranslationValidator;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Merge and validate translations for the Star Citizen localization file
#[derive(Parser, Debug)]
#[command(name = "sc-loc-tool")]
#[command(version)]
#[command(about = "Merge, validate and back up Star Citizen localization files", long_about = None)]
struct Args {
    /// Game install root (overrides SC_GAME_PATH and auto-detection)
    #[arg(long, global = true)]
    game_path: Option<PathBuf>,

    /// Backup directory (overrides SC_BACKUP_DIR)
    #[arg(long, global = true)]
    backup_dir: Option<PathBuf>,

    /// Project file (overrides SC_PROJECT_FILE)
    #[arg(long, short, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look for a game installation
    Detect,

    /// Validate project translations
    Validate {
        /// Validate against this source file instead of each record's original text
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Merge project translations into a source file
    Merge {
        /// Source localization file
        #[arg(long)]
        source: PathBuf,

        /// Where to write the merged file
        #[arg(long)]
        output: PathBuf,

        /// Skip validation
        #[arg(long)]
        no_validate: bool,

        /// Copy the merged file into the game directory afterwards
        #[arg(long)]
        apply: bool,

        /// Refuse to apply when validation reports errors
        #[arg(long, requires = "apply")]
        strict: bool,

        /// Localization file name inside the game directory
        #[arg(long)]
        game_file: Option<String>,
    },

    /// Copy a merged file into the game directory
    Apply {
        /// Merged localization file
        merged: PathBuf,

        /// Localization file name inside the game directory
        #[arg(long)]
        game_file: Option<String>,
    },

    /// Manage backups
    #[command(subcommand)]
    Backups(BackupCommand),

    /// Manage the translation project
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Subcommand, Debug)]
enum BackupCommand {
    /// List backups, newest first
    List,

    /// Copy a backup over a target file
    Restore { backup: PathBuf, target: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Add or replace a translation
    Add {
        #[arg(long)]
        key: String,
        #[arg(long)]
        original: String,
        #[arg(long)]
        translated: String,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// Show translation counts per category
    Stats,

    /// Show the changes the project would make
    Preview,
}

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so reports on stdout stay readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sc_loc_tool=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = args.game_path {
        config.game_path = Some(path);
    }
    if let Some(dir) = args.backup_dir {
        config.backup_dir = dir;
    }
    if let Some(project) = args.project {
        config.project_file = project;
    }

    let reporter = Reporter::for_stdout();
    let mut out = io::stdout().lock();

    match args.command {
        Command::Detect => {
            match GameLocator::new().find_game() {
                Some(path) => reporter.success(&mut out, &format!("Found: {}", path.display()))?,
                None => reporter.warning(&mut out, "Could not auto-detect game installation")?,
            }
        }
        Command::Validate { source } => {
            let project = open_project(&config)?;
            let diagnostics = match source {
                Some(source) => {
                    let store = KeyValueStore::parse(&source)
                        .with_context(|| format!("Failed to read {}", source.display()))?;
                    validate_all(&store, project.translations())
                }
                None => project
                    .translations()
                    .iter()
                    .flat_map(|t| TranslationValidator::validate(t, &t.original))
                    .collect(),
            };
            reporter.validation_results(&mut out, &diagnostics)?;
        }
        Command::Merge {
            source,
            output,
            no_validate,
            apply,
            strict,
            game_file,
        } => {
            let project = open_project(&config)?;
            // Resolve the install before merging so a missing game fails early.
            // Without --apply the game root is never read.
            let game_path = if apply {
                require_game_path(&config)?
            } else {
                config.game_path.clone().unwrap_or_default()
            };
            let merger = build_merger(&config, game_path)?;
            let outcome = merger
                .merge(&source, project.translations(), &output, !no_validate)
                .context("Merge failed")?;

            reporter.merge_summary(&mut out, &outcome)?;
            if !no_validate {
                reporter.validation_results(&mut out, &outcome.diagnostics)?;
            }

            if apply {
                let counts = outcome.counts();
                if strict && counts.has_errors() {
                    bail!(
                        "{} validation errors; not applying to the game (drop --strict to override)",
                        counts.errors
                    );
                }
                let game_file = game_file.unwrap_or_else(|| config.game_file_name.clone());
                apply_merged(&reporter, &mut out, &merger, &output, &game_file)?;
            }
        }
        Command::Apply { merged, game_file } => {
            let merger = build_merger(&config, require_game_path(&config)?)?;
            let game_file = game_file.unwrap_or_else(|| config.game_file_name.clone());
            apply_merged(&reporter, &mut out, &merger, &merged, &game_file)?;
        }
        Command::Backups(BackupCommand::List) => {
            let backups = BackupManager::new(&config.backup_dir)?;
            let listed = backups.list_backups()?;
            if listed.is_empty() {
                writeln!(out, "No backups in {}", config.backup_dir.display())?;
            }
            for path in listed {
                writeln!(out, "{}", path.display())?;
            }
        }
        Command::Backups(BackupCommand::Restore { backup, target }) => {
            let backups = BackupManager::new(&config.backup_dir)?;
            backups.restore(&backup, &target)?;
            reporter.success(&mut out, &format!("Restored {}", target.display()))?;
        }
        Command::Project(ProjectCommand::Add {
            key,
            original,
            translated,
            category,
            comment,
        }) => {
            let mut project = open_project(&config)?;
            let record = TranslationRecord::new(key, original, translated)
                .with_category(category)
                .with_comment(comment);

            let diagnostics = TranslationValidator::validate(&record, &record.original);
            project.add_translation(record);
            project.save()?;

            reporter.success(&mut out, &format!("Saved {}", project.path().display()))?;
            reporter.validation_results(&mut out, &diagnostics)?;
        }
        Command::Project(ProjectCommand::Stats) => {
            let project = open_project(&config)?;
            let stats = project.statistics();
            writeln!(out, "{} ({} translations)", project.metadata.name, stats.total)?;
            for (category, count) in &stats.categories {
                writeln!(out, "   {}: {}", category, count)?;
            }
        }
        Command::Project(ProjectCommand::Preview) => {
            let project = open_project(&config)?;
            reporter.merge_preview(&mut out, project.translations())?;
        }
    }

    Ok(())
}

fn open_project(config: &Config) -> Result<TranslationProject> {
    TranslationProject::open(&config.project_file)
        .with_context(|| format!("Failed to open project {}", config.project_file.display()))
}

/// Game root for commands that write into the install. Never falls back to a
/// guessed location.
fn require_game_path(config: &Config) -> Result<PathBuf> {
    match game::resolve_game_root(config.game_path.as_deref(), &GameLocator::new()) {
        Some(path) => Ok(path),
        None => bail!(
            "Could not find the Star Citizen installation; pass --game-path or set SC_GAME_PATH"
        ),
    }
}

fn build_merger(config: &Config, game_path: PathBuf) -> Result<TranslationMerger> {
    let backups = BackupManager::new(&config.backup_dir).context("Failed to open backup directory")?;
    Ok(TranslationMerger::new(game_path, backups))
}

fn apply_merged(
    reporter: &Reporter,
    out: &mut impl Write,
    merger: &TranslationMerger,
    merged: &Path,
    game_file: &str,
) -> Result<()> {
    let applied = merger
        .apply_to_game(merged, game_file)
        .context("Failed to apply merged file to game")?;

    if let Some(backup) = &applied.backup {
        reporter.success(out, &format!("Backup saved: {}", backup.path.display()))?;
    }
    reporter.success(out, &format!("Applied to: {}", applied.target.display()))?;
    info!("Game file updated");
    Ok(())
}
