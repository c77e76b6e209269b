//! Demo binary - walks through the localization workflow without touching
//! game files
//!
//! Usage:
//!   cargo run --bin demo
//!
//! Optional environment variables:
//! - SC_GAME_PATH (skips auto-detection)
//! - SC_BACKUP_DIR (defaults to backups)
//! - SC_PROJECT_FILE (defaults to project.json; the demo writes example_project.json
//!   unless this is set)

use anyhow::{Context, Result};
use sc_loc_tool::backup::{BackupManager, MAX_BACKUPS_PER_FILE};
use sc_loc_tool::config::Config;
use sc_loc_tool::game::{self, GameLocator};
use sc_loc_tool::project::TranslationProject;
use sc_loc_tool::report::Reporter;
use sc_loc_tool::translation::TranslationRecord;
use sc_loc_tool::validation::TranslationValidator;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Records used by the demo project; the last one drops a placeholder on
/// purpose so validation has something to report.
fn example_translations() -> Vec<TranslationRecord> {
    vec![
        TranslationRecord::new("ui_asop_retrieval", "Retrieve Ship", "Get Your Ship Back")
            .with_category("asop")
            .with_comment("Clearer action description"),
        TranslationRecord::new("ui_asop_stored", "Ship in Hangar", "Chillin' in Storage")
            .with_category("asop")
            .with_comment("More casual tone"),
        TranslationRecord::new(
            "ui_welcome_message",
            "Welcome {player_name}!",
            "Greetings {player_name}!",
        )
        .with_category("ui"),
        TranslationRecord::new("ui_error_message", "Error: {error_code}", "Something went wrong!")
            .with_category("ui"),
    ]
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sc_loc_tool=warn".parse()?)
                .add_directive("demo=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()?;
    let reporter = Reporter::for_stdout();
    let mut out = io::stdout().lock();

    reporter.banner(&mut out, "Star Citizen Localization Tool - Demo")?;
    writeln!(out)?;

    let game_path = match game::resolve_game_root(config.game_path.as_deref(), &GameLocator::new()) {
        Some(path) => {
            reporter.success(&mut out, &format!("Found: {}", path.display()))?;
            path
        }
        None => {
            let path = PathBuf::from(game::DEFAULT_GAME_PATH);
            reporter.warning(&mut out, &format!("Using default path: {}", path.display()))?;
            path
        }
    };
    writeln!(
        out,
        "   Localization directory: {}",
        game::localization_dir(&game_path).display()
    )?;
    writeln!(out)?;

    // Step 1: Build and save an example project
    reporter.heading(&mut out, "1. Creating translation project")?;
    let project_file = std::env::var_os("SC_PROJECT_FILE")
        .map(|_| config.project_file.clone())
        .unwrap_or_else(|| PathBuf::from("example_project.json"));
    let mut project = TranslationProject::new(&project_file);
    project.metadata.name = "ASOP Terminal Improvements".to_string();
    project.metadata.author = "Demo User".to_string();
    project.metadata.description = "Makes ASOP terminals clearer".to_string();
    for record in example_translations() {
        project.add_translation(record);
    }
    project
        .save()
        .with_context(|| format!("Failed to save {}", project_file.display()))?;

    let stats = project.statistics();
    reporter.success(
        &mut out,
        &format!("Project created with {} translations", stats.total),
    )?;
    let categories: Vec<String> = stats
        .categories
        .iter()
        .map(|(name, count)| format!("{}({})", name, count))
        .collect();
    writeln!(out, "   Categories: {}", categories.join(", "))?;
    writeln!(out)?;

    // Step 2: Validate each record against its own original text
    reporter.heading(&mut out, "2. Validating translations")?;
    let diagnostics: Vec<_> = project
        .translations()
        .iter()
        .flat_map(|t| TranslationValidator::validate(t, &t.original))
        .collect();
    reporter.validation_results(&mut out, &diagnostics)?;
    writeln!(out)?;

    // Step 3: Preview the merge
    reporter.heading(&mut out, "3. Merge preview")?;
    reporter.merge_preview(&mut out, project.translations())?;
    writeln!(out)?;

    // Step 4: Backup directory
    reporter.heading(&mut out, "4. Backup management")?;
    let backups = BackupManager::new(&config.backup_dir)?;
    let backup_dir = std::fs::canonicalize(backups.backup_dir())
        .unwrap_or_else(|_| backups.backup_dir().to_path_buf());
    reporter.success(&mut out, &format!("Backup directory: {}", backup_dir.display()))?;
    writeln!(out, "   Configured to keep last {} backups", MAX_BACKUPS_PER_FILE)?;
    writeln!(out)?;

    reporter.banner(&mut out, "Demo Complete!")?;
    writeln!(out, "\nProject saved to: {}", project_file.display())?;

    info!("Demo finished");
    Ok(())
}
