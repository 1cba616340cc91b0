use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use log::warn;

use super::model::Config;

const OVERRIDE_FILE: &str = "manual_override.json";

/// Durable storage for the manual configuration override.
///
/// At most one override exists at a time; presence or absence of the file
/// is the whole contract, there is no schema versioning.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    dir: PathBuf,
}

impl OverrideStore {
    /// `~/.config/ledgerlog` on Linux, `%APPDATA%\ledgerlog` on Windows, etc.
    pub fn new() -> io::Result<Self> {
        let proj = ProjectDirs::from("", "", "ledgerlog")
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to locate config dir"))?;
        Self::at(proj.config_dir().to_path_buf())
    }

    /// Store rooted at an explicit directory (tests use a tempdir).
    pub fn at(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file(&self) -> PathBuf {
        self.dir.join(OVERRIDE_FILE)
    }

    /// Returns the stored override, or `None` when absent.
    ///
    /// A file that no longer parses is discarded on the spot (deleted, with
    /// a warning) so the next resolution pass falls through cleanly.
    pub fn load(&self) -> io::Result<Option<Config>> {
        let path = self.file();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!("Discarding corrupt override {:?}: {}", path, e);
                let _ = fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    /// Create or overwrite the override.
    pub fn save(&self, config: &Config) -> io::Result<()> {
        let file = fs::File::create(self.file())?;
        serde_json::to_writer_pretty(file, config).map_err(io::Error::from)
    }

    /// Delete the override (`Ok(true)` if removed, `Ok(false)` if it didn't exist).
    pub fn clear(&self) -> io::Result<bool> {
        match fs::remove_file(self.file()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether an override is currently present on disk.
    pub fn exists(&self) -> bool {
        self.file().exists()
    }
}
