use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything a request handler can see. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The loaded dataset; never mutated after startup.
    pub dataset: Arc<Dataset>,

    /// Source file the dataset was loaded from.
    data_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            dataset,
            data_file: Arc::new(data_file.into()),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}
