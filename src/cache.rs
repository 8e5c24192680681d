use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use log::debug;
use rusqlite::{Connection, params};

use crate::error::{ExtractError, Result};
use crate::types::Publication;

/// Finished publications keyed by source file identity.
pub struct PublicationCache {
    conn: Connection,
}

impl PublicationCache {
    /// Open the cache in the user cache directory.
    pub fn open() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| ExtractError::Cache("could not determine cache directory".into()))?
            .join("pubextract");
        fs::create_dir_all(&cache_dir).map_err(|e| ExtractError::io(&cache_dir, e))?;
        Self::open_at(&cache_dir.join("publications.db"))
    }

    pub fn open_at(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS publications (
                key TEXT PRIMARY KEY,
                json TEXT NOT NULL
            )",
        )?;
        Ok(Self { conn })
    }

    /// Cached publication for `source`, if present and its figures still exist.
    pub fn get(&self, source: &Path) -> Result<Option<Publication>> {
        let key = source_key(source)?;
        let mut stmt = self.conn.prepare("SELECT json FROM publications WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let json: String = row.get(0)?;
        let publication: Publication = serde_json::from_str(&json)
            .map_err(|e| ExtractError::Cache(format!("corrupt cache entry: {e}")))?;
        if publication.figures.iter().any(|p| !p.exists()) {
            debug!("cache entry for {} has missing figures", source.display());
            return Ok(None);
        }
        Ok(Some(publication))
    }

    pub fn put(&self, source: &Path, publication: &Publication) -> Result<()> {
        let key = source_key(source)?;
        let json = serde_json::to_string(publication)
            .map_err(|e| ExtractError::Cache(e.to_string()))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO publications (key, json) VALUES (?1, ?2)",
            params![key, json],
        )?;
        Ok(())
    }
}

/// Canonical path, size and modification time of the source file.
fn source_key(source: &Path) -> Result<String> {
    let canonical = fs::canonicalize(source).map_err(|e| ExtractError::io(source, e))?;
    let meta = fs::metadata(&canonical).map_err(|e| ExtractError::io(source, e))?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    Ok(format!("{}|{}|{}", canonical.display(), meta.len(), mtime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AbbreviationMap;

    fn publication(figures: Vec<std::path::PathBuf>) -> Publication {
        let mut abbreviations = AbbreviationMap::new();
        abbreviations.insert("TAA".into(), "thioacetamide".into());
        abbreviations.insert("ALT".into(), "alanine aminotransferase".into());
        Publication {
            id: "paper".into(),
            abstract_text: Some("Short abstract.".into()),
            full_text: Some("Introduction body.".into()),
            abbreviations,
            figures,
            captions: vec!["Figure 1. Liver.".into()],
            tables: Vec::new(),
            corrupted: false,
        }
    }

    #[test]
    fn stores_and_returns_publication() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.txt");
        fs::write(&source, "text").unwrap();
        let cache = PublicationCache::open_at(&dir.path().join("cache.db")).unwrap();

        assert_eq!(cache.get(&source).unwrap(), None);
        let stored = publication(Vec::new());
        cache.put(&source, &stored).unwrap();
        let loaded = cache.get(&source).unwrap().unwrap();
        assert_eq!(loaded, stored);
        let keys: Vec<&str> = loaded.abbreviations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["TAA", "ALT"]);
    }

    #[test]
    fn entry_with_missing_figure_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.txt");
        fs::write(&source, "text").unwrap();
        let cache = PublicationCache::open_at(&dir.path().join("cache.db")).unwrap();

        let figure = dir.path().join("figure1.png");
        fs::write(&figure, [0u8; 4]).unwrap();
        cache.put(&source, &publication(vec![figure.clone()])).unwrap();
        assert!(cache.get(&source).unwrap().is_some());

        fs::remove_file(&figure).unwrap();
        assert_eq!(cache.get(&source).unwrap(), None);
    }

    #[test]
    fn changed_source_misses() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.txt");
        fs::write(&source, "text").unwrap();
        let cache = PublicationCache::open_at(&dir.path().join("cache.db")).unwrap();
        cache.put(&source, &publication(Vec::new())).unwrap();

        fs::write(&source, "longer text now").unwrap();
        assert_eq!(cache.get(&source).unwrap(), None);
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PublicationCache::open_at(&dir.path().join("cache.db")).unwrap();
        let err = cache.get(&dir.path().join("absent.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }
}
