//! Locating a Star Citizen installation.
//!
//! Only existence checks are done here: a root counts as an install when it
//! exists and contains a `data` directory.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Install roots checked by [`GameLocator::find_game`], in order
pub const COMMON_PATHS: &[&str] = &[
    "C:/Program Files/Roberts Space Industries/StarCitizen/LIVE",
    "D:/Program Files/Roberts Space Industries/StarCitizen/LIVE",
    "E:/Games/StarCitizen/LIVE",
    "C:/Games/StarCitizen/LIVE",
];

/// Install location shown by `detect` and the demo when nothing is found.
/// Never used as a write target.
pub const DEFAULT_GAME_PATH: &str = COMMON_PATHS[0];

#[derive(Debug, Clone)]
pub struct GameLocator {
    candidates: Vec<PathBuf>,
}

impl GameLocator {
    pub fn new() -> Self {
        Self::with_candidates(COMMON_PATHS.iter().map(PathBuf::from))
    }

    pub fn with_candidates(candidates: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Return the first candidate that looks like a game install.
    pub fn find_game(&self) -> Option<PathBuf> {
        info!("Searching for Star Citizen installation");
        for candidate in &self.candidates {
            debug!("Checking {}", candidate.display());
            if is_valid_game_path(candidate) {
                info!("Found game at {}", candidate.display());
                return Some(candidate.clone());
            }
        }

        warn!("Could not auto-detect game installation");
        None
    }
}

impl Default for GameLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The configured game root if there is one, else the first detected install.
///
/// There is no default: callers that write into the game must fail when this
/// returns `None`.
pub fn resolve_game_root(configured: Option<&Path>, locator: &GameLocator) -> Option<PathBuf> {
    match configured {
        Some(path) => Some(path.to_path_buf()),
        None => locator.find_game(),
    }
}

pub fn is_valid_game_path(path: &Path) -> bool {
    path.exists() && path.join("data").exists()
}

/// Directory holding the English localization files under a game root.
pub fn localization_dir(game_path: &Path) -> PathBuf {
    game_path.join("data").join("Localization").join("english")
}
