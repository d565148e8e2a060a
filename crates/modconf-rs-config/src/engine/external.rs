//! Lazily loaded, deployment-supplied config source.
//!
//! The load runs at most once per engine (or since the last reset). Every
//! caller awaiting resolution shares the same in-flight attempt, and a failed
//! attempt is remembered and handed to every waiter.

use super::store::SourceStore;
use crate::{ConfigError, ExternalLoadError};
use async_trait::async_trait;
use directories::UserDirs;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, info};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Well-known name of the external config source.
pub const CONFIG_FILE_SOURCE: &str = "config-file";
/// Default directory for the external config file under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".modconf";
/// Default external config filename.
const DEFAULT_CONFIG_FILE: &str = "config-file.json5";

/// A deployment-supplied config source resolved by a well-known name.
#[async_trait]
pub trait ExternalSource: Send + Sync {
    /// Name used in logs and load errors.
    fn name(&self) -> &str {
        CONFIG_FILE_SOURCE
    }

    /// Whether the source exists. A missing source is not an error.
    fn locate(&self) -> bool;

    /// Load the source; it must be a JSON object keyed by module id.
    async fn load(&self) -> Result<Value, ConfigError>;
}

/// External source backed by a JSON5 file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Use the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `~/.modconf/config-file.json5`, when a home directory is known.
    pub fn default_location() -> Option<Self> {
        UserDirs::new().map(|dirs| {
            Self::new(
                dirs.home_dir()
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILE),
            )
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ExternalSource for FileSource {
    fn locate(&self) -> bool {
        self.path.exists()
    }

    async fn load(&self) -> Result<Value, ConfigError> {
        debug!("loading external config file (path={})", self.path.display());
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let value: Value = json5::from_str(&contents)?;
        Ok(value)
    }
}

/// Read a JSON5 config source from disk.
pub fn read_json5(path: impl AsRef<Path>) -> Result<Value, ConfigError> {
    let path = path.as_ref();
    debug!("reading config source (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    Ok(json5::from_str(&contents)?)
}

type LoadResult = Result<(), ExternalLoadError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// One-shot slot: empty until first use, then holds the shared attempt.
#[derive(Default)]
pub(super) struct ExternalLoader {
    pending: Mutex<Option<SharedLoad>>,
}

impl ExternalLoader {
    /// Start the load if nobody has yet and return the shared attempt.
    pub(super) fn ensure_started(
        &self,
        source: Option<Arc<dyn ExternalSource>>,
        store: Arc<RwLock<SourceStore>>,
    ) -> SharedLoad {
        let mut pending = self.pending.lock();
        if let Some(load) = pending.as_ref() {
            return load.clone();
        }
        let generation = store.read().generation();
        let load = load_into_store(source, store, generation).boxed().shared();
        *pending = Some(load.clone());
        load
    }

    /// Forget any previous attempt so the next resolution loads again.
    pub(super) fn reset(&self) {
        self.pending.lock().take();
    }
}

async fn load_into_store(
    source: Option<Arc<dyn ExternalSource>>,
    store: Arc<RwLock<SourceStore>>,
    generation: u64,
) -> LoadResult {
    let Some(source) = source else {
        debug!("no external config source configured");
        return Ok(());
    };
    let name = source.name().to_string();
    if !source.locate() {
        info!("external config source not found; continuing without it (name={name})");
        return Ok(());
    }

    let value = source.load().await.map_err(|err| {
        error!("problem importing external config (name={name}, error={err})");
        ExternalLoadError {
            name: name.clone(),
            message: err.to_string(),
        }
    })?;
    if !value.is_object() {
        error!("external config is not an object (name={name})");
        return Err(ExternalLoadError {
            name,
            message: "expected an object keyed by module".to_string(),
        });
    }

    let mut store = store.write();
    if store.generation() != generation {
        debug!("discarding external config loaded before a reset (name={name})");
        return Ok(());
    }
    store.set_external(value);
    info!("loaded external config source (name={name})");
    Ok(())
}
