use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Game install
    pub game_path: Option<PathBuf>,
    pub game_file_name: String,

    // Local files
    pub backup_dir: PathBuf,
    pub project_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Skips auto-detection when set
            game_path: std::env::var("SC_GAME_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            game_file_name: std::env::var("SC_GAME_FILE")
                .unwrap_or_else(|_| "global.ini".to_string()),

            backup_dir: std::env::var("SC_BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("backups")),
            project_file: std::env::var("SC_PROJECT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("project.json")),
        })
    }
}
