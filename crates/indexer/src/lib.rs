//! Codebase index: walks a project tree, records per-file token counts,
//! surface-level imports/exports, and path-inferred module groupings, and
//! persists the result under the project state directory.

mod config;
mod detect;
mod error;
mod index;
mod scanner;
mod store;

pub use config::IndexConfig;
pub use detect::{detect_exports, detect_imports, infer_module, SourceFamily};
pub use error::{IndexerError, Result};
pub use index::{CodebaseIndex, FileDigest, FileRecord, IndexDigest};
pub use scanner::FileScanner;
pub use store::IndexStore;

/// Name of the per-project state directory.
pub const STATE_DIR: &str = ".ctxslim";

/// Index file name inside [`STATE_DIR`].
pub const INDEX_FILE: &str = "file-index.json";
