//! Durable per-project memory: stack description, module registry,
//! architectural decisions, and change history.
//!
//! Module entries here are registered explicitly and are independent of the
//! path-inferred module groupings in the codebase index; the two maps have
//! separate lifecycles and are never reconciled automatically.

mod error;
mod record;
mod store;

pub use error::{MemoryError, Result};
pub use record::{ChangeEvent, Decision, MemoryRecord, ModuleEntry, ModuleStatus, StackInfo};
pub use store::MemoryStore;

/// Name of the per-project state directory.
pub const STATE_DIR: &str = ".ctxslim";

/// Memory file name inside [`STATE_DIR`].
pub const MEMORY_FILE: &str = "memory.json";
