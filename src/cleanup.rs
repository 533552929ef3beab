use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::runtime::Runtime;

/// Tracks temporary files that must be removed if the run is interrupted
#[derive(Default)]
pub struct CleanupContext {
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every registered file. Missing files are ignored.
    pub fn cleanup(&self) {
        for path in &self.paths {
            debug!("Cleaning up: {:?}", path);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

/// Registers a temp file for interrupt cleanup and deletes it when dropped,
/// unless [`success`](Self::success) was called first.
pub struct CleanupGuard<'a, R: Runtime> {
    runtime: &'a R,
    ctx: SharedCleanupContext,
    path: PathBuf,
    armed: bool,
}

impl<'a, R: Runtime> CleanupGuard<'a, R> {
    pub fn new(runtime: &'a R, ctx: SharedCleanupContext, path: PathBuf) -> Self {
        if let Ok(mut guard) = ctx.lock() {
            guard.add(path.clone());
        }
        Self {
            runtime,
            ctx,
            path,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file was moved into place; stop tracking it.
    pub fn success(mut self) {
        self.armed = false;
        self.forget();
    }

    fn forget(&self) {
        if let Ok(mut guard) = self.ctx.lock() {
            guard.remove(&self.path);
        }
    }
}

impl<R: Runtime> Drop for CleanupGuard<'_, R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if self.runtime.exists(&self.path) {
            debug!("Removing leftover temp file {:?}", self.path);
            if let Err(e) = self.runtime.remove_file(&self.path) {
                debug!("Failed to remove {:?}: {:#}", self.path, e);
            }
        }
        self.forget();
    }
}
