//! Thread-safe handle around the arena engine
//!
//! One coarse mutex serializes every read-modify-write (rating updates,
//! result intake, round advancement). Readers of the leaderboard get an
//! immutable snapshot that is swapped after each mutation. File I/O happens
//! outside the engine lock.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::arena::Arena;
use crate::error::PersistError;
use crate::leaderboard::LeaderboardRow;
use crate::snapshot::ArenaSnapshot;

#[derive(Clone)]
pub struct SharedArena {
    engine: Arc<Mutex<Arena>>,
    leaderboard: Arc<RwLock<Arc<Vec<LeaderboardRow>>>>,
}

impl SharedArena {
    pub fn new(arena: Arena) -> Self {
        let rows = Arc::new(arena.leaderboard().rows().to_vec());
        Self {
            engine: Arc::new(Mutex::new(arena)),
            leaderboard: Arc::new(RwLock::new(rows)),
        }
    }

    /// Run `f` with exclusive access, then republish the leaderboard
    pub fn with<T>(&self, f: impl FnOnce(&mut Arena) -> T) -> T {
        let mut engine = self.lock();
        let result = f(&mut engine);
        let rows = Arc::new(engine.leaderboard().rows().to_vec());

        // Published while the engine is still locked so snapshots never go backwards
        *self
            .leaderboard
            .write()
            .unwrap_or_else(PoisonError::into_inner) = rows;
        result
    }

    /// Run `f` against the engine under the same exclusive lock as `with`,
    /// without republishing the leaderboard
    pub fn read<T>(&self, f: impl FnOnce(&Arena) -> T) -> T {
        let engine = self.lock();
        f(&engine)
    }

    /// Latest published leaderboard; never blocks on the engine lock
    pub fn leaderboard(&self) -> Arc<Vec<LeaderboardRow>> {
        self.leaderboard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Capture under the lock, write after releasing it
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let snapshot = self.read(Arena::snapshot);
        snapshot.save(path)
    }

    /// Read the file without the lock, then swap state in under it
    pub fn load(&self, path: &Path) -> Result<(), PersistError> {
        let snapshot = ArenaSnapshot::load(path)?;
        self.with(|arena| arena.load_snapshot(snapshot));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Arena> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
