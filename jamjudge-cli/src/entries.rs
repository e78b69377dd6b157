/// Loading a jam's entry list from disk.
///
/// Each jam has one file under the entries directory: `<jam>.json` holding a
/// JSON array of entries, or `<jam>.txt` with one entry per line
/// (`id` or `id<TAB>title`).
use anyhow::{Context, bail};
use jamjudge_core::Entry;
use std::path::{Path, PathBuf};

/// Reject jam slugs that could escape the entries directory.
pub fn validate_jam_slug(jam: &str) -> anyhow::Result<()> {
    if jam.is_empty() || !jam.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        bail!("Invalid jam slug \"{jam}\": use letters, digits, '-' or '_'");
    }
    Ok(())
}

/// Parse a string as either a JSON array of entries or plain text (one entry per line).
pub fn parse_entries_from_str(content: &str) -> anyhow::Result<Vec<Entry>> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        let entries: Vec<Entry> = serde_json::from_str(trimmed)
            .context("Entries file looks like JSON but failed to parse")?;
        Ok(entries.into_iter().filter(|e| !e.id.trim().is_empty()).collect())
    } else {
        Ok(trimmed
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| match l.split_once('\t') {
                Some((id, title)) => Entry::new(id.trim(), title.trim()),
                None => Entry::new(l, l),
            })
            .collect())
    }
}

fn entries_file(entries_dir: &Path, jam: &str) -> Option<PathBuf> {
    ["json", "txt"]
        .iter()
        .map(|ext| entries_dir.join(format!("{jam}.{ext}")))
        .find(|p| p.exists())
}

/// Load the entries for `jam`. A missing file is an error; an empty file is not.
pub fn load_entries(entries_dir: &Path, jam: &str) -> anyhow::Result<Vec<Entry>> {
    validate_jam_slug(jam)?;

    let Some(path) = entries_file(entries_dir, jam) else {
        bail!(
            "No entries for jam \"{jam}\": expected {jam}.json or {jam}.txt in {}",
            entries_dir.display()
        );
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read entries file {}", path.display()))?;
    let entries = parse_entries_from_str(&content)
        .with_context(|| format!("Invalid entries file {}", path.display()))?;

    tracing::debug!(jam, count = entries.len(), path = %path.display(), "loaded entries");
    Ok(entries)
}
