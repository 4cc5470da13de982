use crate::core::regressor::ModelArtifact;
use crate::domain::ports::Regressor;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// 模型只載入一次; 模型檔不存在時回傳 `None` 而非錯誤。
/// 模型檔損毀時回報一次錯誤, 之後固定回傳 `None`。
pub struct ModelHandle {
    path: PathBuf,
    cache: OnceLock<Option<Arc<dyn Regressor>>>,
    init_lock: Mutex<()>,
}

impl ModelHandle {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn preloaded(model: Arc<dyn Regressor>) -> Self {
        let handle = Self::new("");
        let _ = handle.cache.set(Some(model));
        handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_model(&self) -> Result<Option<Arc<dyn Regressor>>> {
        if let Some(model) = self.cache.get() {
            return Ok(model.clone());
        }

        let _guard = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.cache.get() {
            return Ok(model.clone());
        }

        if !self.path.exists() {
            tracing::debug!("Model artifact {} not found", self.path.display());
            return Ok(None);
        }

        let artifact = match ModelArtifact::from_file(&self.path) {
            Ok(artifact) => artifact,
            Err(e) => {
                let _ = self.cache.set(None);
                return Err(e);
            }
        };
        tracing::info!(
            "🧠 Loaded {} model from {}",
            artifact.kind(),
            self.path.display()
        );

        let model: Arc<dyn Regressor> = Arc::new(artifact);
        Ok(self.cache.get_or_init(|| Some(model)).clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some_and(Option::is_some)
    }
}
