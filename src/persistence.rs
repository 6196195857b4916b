//! # Persistence: Knowledge Base Files
//!
//! A [`KnowledgeBase`] is stored as pretty-printed JSON so that agronomists
//! can review and edit the catalogs by hand. The name indexes are
//! `#[serde(skip)]` and rebuilt after loading via
//! [`KnowledgeBase::rebuild_index()`].
//!
//! ## Loading Rules
//!
//! A file is accepted only if it passes [`KnowledgeBase::validate()`]: a
//! rejected file is an error, never a silently empty base.
//!
//! ## Atomicity
//!
//! Writes are not atomic; a crash mid-write can leave a truncated file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::KnowledgeBase;

/// Serializes a knowledge base as pretty-printed JSON.
pub fn to_json(kb: &KnowledgeBase) -> Result<String> {
    serde_json::to_string_pretty(kb).context("failed to serialize knowledge base")
}

/// Writes `kb` to `path`, creating parent directories as needed.
pub fn save_knowledge_base(kb: &KnowledgeBase, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, to_json(kb)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "knowledge base saved");
    Ok(())
}

/// Reads, indexes and validates a knowledge base file.
///
/// # Errors
///
/// Fails if the file cannot be read, is not a knowledge base document, or
/// breaks one of the structural invariants.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut kb: KnowledgeBase = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    kb.rebuild_index();
    kb.validate()
        .with_context(|| format!("{} is not a valid knowledge base", path.display()))?;

    tracing::info!(
        path = %path.display(),
        symptoms = kb.symptom_count(),
        rules = kb.rule_count(),
        "knowledge base loaded"
    );
    Ok(kb)
}

/// Loads the file at `path`, or the built-in base when `path` is `None`.
pub fn load_or_builtin(path: Option<&Path>) -> Result<KnowledgeBase> {
    match path {
        Some(path) => load_knowledge_base(path),
        None => {
            let kb = KnowledgeBase::malaysian_rice();
            tracing::debug!(symptoms = kb.symptom_count(), rules = kb.rule_count(), "using built-in knowledge base");
            Ok(kb)
        }
    }
}
