use std::sync::Arc;

use cg_core::{DocumentStore, Settings};

pub mod backends;
pub mod publish;

pub use backends::{FsStore, MemoryStore};
pub use publish::{PublishOutcome, PublishRequest, Publisher};

/// The on-disk store rooted at the configured output directory.
pub fn create_store(settings: &Settings) -> Arc<dyn DocumentStore> {
    Arc::new(FsStore::new(settings.output_dir.clone()))
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::publish::{PublishOutcome, PublishRequest, Publisher};
    pub use cg_core::{DocumentStore, SavedDocument};
}
