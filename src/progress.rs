//! Per-level star progress.
//!
//! Storage is behind the [`ProgressStore`] trait so a save-file backend can
//! be plugged in by the host; [`MemoryProgress`] keeps everything in memory.

use bevy::prelude::*;

use crate::outcome::StarRecord;

/// Number of levels in the game.
pub const LEVEL_COUNT: usize = 9;

/// Errors from progress storage.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("level index {index} out of range (0..{count})")]
    InvalidLevel { index: usize, count: usize },
}

/// Load/save of the star record for each level.
pub trait ProgressStore: Send + Sync {
    /// Stored record for `level`, or `None` if it was never completed.
    fn load(&self, level: usize) -> Result<Option<StarRecord>, ProgressError>;

    /// Overwrite the record for `level`.
    fn save(&mut self, level: usize, record: StarRecord) -> Result<(), ProgressError>;
}

/// In-memory progress for [`LEVEL_COUNT`] levels.
#[derive(Clone, Debug, Default)]
pub struct MemoryProgress {
    levels: [Option<StarRecord>; LEVEL_COUNT],
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(level: usize) -> Result<(), ProgressError> {
        if level < LEVEL_COUNT {
            Ok(())
        } else {
            Err(ProgressError::InvalidLevel {
                index: level,
                count: LEVEL_COUNT,
            })
        }
    }
}

impl ProgressStore for MemoryProgress {
    fn load(&self, level: usize) -> Result<Option<StarRecord>, ProgressError> {
        Self::check(level)?;
        Ok(self.levels[level])
    }

    fn save(&mut self, level: usize, record: StarRecord) -> Result<(), ProgressError> {
        Self::check(level)?;
        self.levels[level] = Some(record);
        Ok(())
    }
}

/// Level currently being played.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurrentLevel(pub usize);

/// Progress store used by the running game.
#[derive(Resource)]
pub struct LevelProgress {
    store: Box<dyn ProgressStore>,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::new(MemoryProgress::new())
    }
}

impl LevelProgress {
    pub fn new(store: impl ProgressStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn load(&self, level: usize) -> Result<Option<StarRecord>, ProgressError> {
        self.store.load(level)
    }

    /// Store a completed mission's record, keeping stars earned earlier.
    pub fn record_completion(&mut self, level: usize, record: StarRecord) -> Result<StarRecord, ProgressError> {
        let best = match self.store.load(level)? {
            Some(previous) => previous.best_of(&record),
            None => record,
        };
        self.store.save(level, best)?;
        info!("Level {} progress saved: {} stars", level, best.count());
        Ok(best)
    }
}
