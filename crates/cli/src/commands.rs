use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ctxslim_indexer::{IndexConfig, IndexStore, STATE_DIR};
use ctxslim_memory::MemoryStore;

/// `ctxslim index` — full (re)build of the codebase index.
pub fn index(path: &Path) -> Result<()> {
    let store = IndexStore::new(path).context("opening project")?;
    let index = store.build(&IndexConfig::from_env())?;
    println!(
        "Indexed {} files ({} tokens if read in full)",
        index.total_files, index.total_tokens_if_full_read
    );
    Ok(())
}

/// `ctxslim memory show` — dump the memory record as pretty JSON.
pub fn memory_show(path: &Path) -> Result<()> {
    let record = MemoryStore::new(path).load();
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// `ctxslim memory reset` — wipe the state directory and re-index.
pub fn memory_reset(path: &Path, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to reset memory without --yes (this cannot be undone)");
    }

    let state_dir = path.join(STATE_DIR);
    if state_dir.exists() {
        fs::remove_dir_all(&state_dir).context("clearing state directory")?;
        println!("Cleared {}", state_dir.display());
    }

    index(path)
}

/// `ctxslim savings` — aggregate dashboard over the change history.
pub fn savings(path: &Path) -> Result<()> {
    let record = MemoryStore::new(path).load();
    let changes = &record.change_history;
    if changes.is_empty() {
        println!("No changes recorded yet. Run `ctxslim change` first.");
        return Ok(());
    }

    let total_used: u64 = changes.iter().map(|c| c.tokens_used).sum();
    let total_saved: u64 = changes.iter().map(|c| c.tokens_saved).sum();
    let total_full = total_used + total_saved;

    println!("Token savings (all sessions)");
    println!("Total changes: {}", changes.len());
    println!("Tokens used:   {total_used}");
    println!("Tokens saved:  {total_saved}");
    println!("Total (full):  {total_full}");
    if total_full > 0 {
        println!(
            "Savings:       {:.0}%",
            total_saved as f64 / total_full as f64 * 100.0
        );
    }
    Ok(())
}
