use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use ctxslim_indexer::{IndexDigest, IndexStore};
use ctxslim_intent::{backend_for, BackendKind, ChangeClassifier, ChangeIntent, StageConfig};
use ctxslim_memory::{MemoryStore, ModuleStatus};
use ctxslim_selector::{file_synopsis, ContextPackage, ContextSelector, SelectorConfig};
use ctxslim_tokens::SavingsReport;

/// The full change cycle: classify, select, render, then record the outcome.
pub async fn run_change(
    root: &Path,
    description: &str,
    kind: BackendKind,
    out: Option<&Path>,
) -> Result<()> {
    let store = IndexStore::new(root)?;
    let index = store.load();
    if index.files.is_empty() {
        bail!("no index found; run `ctxslim index` first");
    }

    let backend = backend_for(kind)?;
    let classifier = ChangeClassifier::new(backend, StageConfig::for_backend(kind));
    log::info!("Analyzing change ({kind})...");
    let intent = classifier
        .classify(description, &IndexDigest::from_index(&index))
        .await?;
    log::info!(
        "Change touches {} module(s), {} file(s)",
        intent.affected_modules.len(),
        intent.affected_files.len()
    );

    let memory = MemoryStore::new(root).load();
    let selector = ContextSelector::new(root, SelectorConfig::from_env());
    let package = selector.select(&intent, &index, &memory);

    emit_package(&package, out)?;

    for (path, content) in &package.files {
        log::info!("  {path}: {} tokens", ctxslim_tokens::count(content));
        log::debug!("    {}", file_synopsis(&root.join(path)));
    }
    let full_tokens = index.total_tokens_if_full_read;
    let report = SavingsReport::new(package.total_tokens, full_tokens, cost_model(kind));
    println!("{report}");

    record_change_cycle(root, description, &intent, package.total_tokens, full_tokens)?;
    Ok(())
}

/// Hand the rendered blob to the external injector: a file when `--out` is
/// given, stdout otherwise.
fn emit_package(package: &ContextPackage, out: Option<&Path>) -> Result<()> {
    let rendered = package.render();
    match out {
        Some(path) => {
            fs::write(path, rendered)?;
            log::info!("Context package written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Post-cycle bookkeeping: append the change event, move affected registered
/// modules to in-progress, and refresh the index records for touched files.
pub fn record_change_cycle(
    root: &Path,
    description: &str,
    intent: &ChangeIntent,
    tokens_used: u64,
    full_codebase_tokens: u64,
) -> Result<()> {
    let memory_store = MemoryStore::new(root);
    let mut record = memory_store.load();

    let tokens_saved = full_codebase_tokens.saturating_sub(tokens_used);
    record.add_change(
        description,
        intent.affected_files.clone(),
        tokens_used,
        tokens_saved,
        unix_now_ms(),
    );

    for module in &intent.affected_modules {
        if let Some(entry) = record.get_module_mut(module) {
            entry.status = ModuleStatus::InProgress;
        }
    }
    memory_store.save(&mut record)?;

    log::debug!("Re-indexing {} changed file(s)", intent.affected_files.len());
    IndexStore::new(root)?.reindex_files(&intent.affected_files)?;
    Ok(())
}

fn cost_model(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Anthropic => "claude-haiku-4-5",
        BackendKind::Gemini => "gemini-1.5-flash",
    }
}

fn unix_now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
