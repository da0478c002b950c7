//! Context selection: assemble the smallest sufficient bundle of files,
//! module summaries, and past decisions for one change request, bounded by a
//! token budget.

mod compress;
mod package;
mod selector;

pub use compress::{compress_content, file_synopsis};
pub use package::ContextPackage;
pub use selector::{ContextSelector, SelectorConfig};
