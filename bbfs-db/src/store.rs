use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::{parse_line, Draw, Market};

/// Persistence seam for market histories. The engine never calls it.
pub trait HistoryStore {
    /// Oldest first. An unknown market yields an empty history.
    fn load(&self, market: Market) -> Result<Vec<Draw>>;
    /// Replaces the whole history of `market`.
    fn save(&self, market: Market, history: &[Draw]) -> Result<()>;
    /// Returns `true` if there was something to remove.
    fn clear(&self, market: Market) -> Result<bool>;
}

pub fn data_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path
}

/// One `<code>.txt` per market, one result per line.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    dir: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, market: Market) -> PathBuf {
        self.dir.join(format!("{}.txt", market.code()))
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self, market: Market) -> Result<Vec<Draw>> {
        let path = self.path_for(market);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read(&path)
            .with_context(|| format!("Cannot read history {:?}", path))?;
        Ok(parse_history(&content))
    }

    fn save(&self, market: Market, history: &[Draw]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create data directory {:?}", self.dir))?;
        let path = self.path_for(market);
        std::fs::write(&path, format_history(history))
            .with_context(|| format!("Cannot write history {:?}", path))?;
        log::info!("Saved {} results to {:?}", history.len(), path);
        Ok(())
    }

    fn clear(&self, market: Market) -> Result<bool> {
        let path = self.path_for(market);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).with_context(|| format!("Cannot remove {:?}", path))?;
        log::info!("Removed {:?}", path);
        Ok(true)
    }
}

/// Keeps well-formed lines, silently dropping the rest (invalid UTF-8 included).
pub fn parse_history(content: &[u8]) -> Vec<Draw> {
    let mut skipped = 0usize;
    let draws: Vec<Draw> = content
        .split(|&b| b == b'\n')
        .filter_map(|line| {
            let draw = std::str::from_utf8(line).ok().and_then(parse_line);
            if draw.is_none() && !line.iter().all(u8::is_ascii_whitespace) {
                skipped += 1;
            }
            draw
        })
        .collect();
    if skipped > 0 {
        log::debug!("Skipped {} malformed lines", skipped);
    }
    draws
}

/// Newline-joined, no trailing newline.
pub fn format_history(history: &[Draw]) -> String {
    history
        .iter()
        .map(Draw::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
