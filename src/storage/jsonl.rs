//! JSONL-based storage implementation with in-memory caching.
//!
//! One `.jsonl` file per collection (books, users, loans). Creates append
//! to the file; updates and deletes rewrite it from the cache. All cache
//! access goes through an `RwLock`, so a concurrent reader never observes
//! a half-applied write.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Serialize, de::DeserializeOwned};

use super::traits::{Filter, HasId, Storage};
use crate::error::{CirculateError, Result};

/// JSONL-based storage with in-memory caching.
pub struct JsonlStorage {
    base_path: PathBuf,
    cache: RwLock<HashMap<String, Vec<serde_json::Value>>>,
}

impl JsonlStorage {
    /// Create a new JsonlStorage at the given path.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Get the file path for a collection.
    fn collection_path(&self, collection: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", collection))
    }

    /// Load a collection into cache if not already loaded.
    fn ensure_loaded(&self, collection: &str) -> Result<()> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|e| CirculateError::Storage(e.to_string()))?;
            if cache.contains_key(collection) {
                return Ok(());
            }
        }

        let mut cache = self
            .cache
            .write()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        if cache.contains_key(collection) {
            return Ok(());
        }

        let path = self.collection_path(collection);
        let mut records = Vec::new();
        if path.exists() {
            let file = File::open(&path)?;
            let reader = BufReader::new(file);
            for line in reader.lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    let record: serde_json::Value = serde_json::from_str(&line)?;
                    records.push(record);
                }
            }
        }

        cache.insert(collection.to_string(), records);
        Ok(())
    }

    /// Append a record to the JSONL file.
    fn append_to_file(&self, collection: &str, record: &serde_json::Value) -> Result<()> {
        let path = self.collection_path(collection);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }

    /// Rewrite the entire collection file from cache.
    fn rewrite_file(&self, collection: &str) -> Result<()> {
        let cache = self
            .cache
            .read()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        let records = cache
            .get(collection)
            .ok_or_else(|| CirculateError::Storage(format!("Collection not loaded: {}", collection)))?;

        let path = self.collection_path(collection);
        let mut file = File::create(&path)?;
        for record in records {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        Ok(())
    }
}

fn record_id(record: &serde_json::Value) -> Option<&str> {
    record.get("id").and_then(|v| v.as_str())
}

impl Storage for JsonlStorage {
    fn create<T: Serialize + DeserializeOwned + HasId>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<()> {
        self.ensure_loaded(collection)?;

        let value = serde_json::to_value(record)?;

        // Append to file first (source of truth)
        self.append_to_file(collection, &value)?;

        // Then update cache
        let mut cache = self
            .cache
            .write()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        cache
            .get_mut(collection)
            .ok_or_else(|| CirculateError::Storage(format!("Collection not loaded: {}", collection)))?
            .push(value);

        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        self.ensure_loaded(collection)?;

        let cache = self
            .cache
            .read()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        let records = cache
            .get(collection)
            .ok_or_else(|| CirculateError::Storage(format!("Collection not loaded: {}", collection)))?;

        for record in records {
            if record_id(record) == Some(id) {
                let parsed: T = serde_json::from_value(record.clone())?;
                return Ok(Some(parsed));
            }
        }

        Ok(None)
    }

    fn update<T: Serialize + DeserializeOwned + HasId>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<()> {
        self.ensure_loaded(collection)?;

        let id = record.id().to_string();
        let value = serde_json::to_value(record)?;

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| CirculateError::Storage(e.to_string()))?;
            let records = cache.get_mut(collection).ok_or_else(|| {
                CirculateError::Storage(format!("Collection not loaded: {}", collection))
            })?;

            let mut found = false;
            for r in records.iter_mut() {
                if record_id(r) == Some(id.as_str()) {
                    *r = value;
                    found = true;
                    break;
                }
            }

            if !found {
                return Err(CirculateError::Storage(format!(
                    "No record {} in {}",
                    id, collection
                )));
            }
        }

        // Rewrite file with updated cache
        self.rewrite_file(collection)?;

        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.ensure_loaded(collection)?;

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| CirculateError::Storage(e.to_string()))?;
            let records = cache.get_mut(collection).ok_or_else(|| {
                CirculateError::Storage(format!("Collection not loaded: {}", collection))
            })?;

            let before = records.len();
            records.retain(|r| record_id(r) != Some(id));
            if records.len() == before {
                return Err(CirculateError::Storage(format!(
                    "No record {} in {}",
                    id, collection
                )));
            }
        }

        self.rewrite_file(collection)?;

        Ok(())
    }

    fn query<T: DeserializeOwned>(&self, collection: &str, filters: &[Filter]) -> Result<Vec<T>> {
        self.ensure_loaded(collection)?;

        let cache = self
            .cache
            .read()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        let records = cache
            .get(collection)
            .ok_or_else(|| CirculateError::Storage(format!("Collection not loaded: {}", collection)))?;

        let mut results = Vec::new();
        for record in records {
            if filters.iter().all(|f| f.matches(record)) {
                results.push(serde_json::from_value(record.clone())?);
            }
        }

        Ok(results)
    }

    fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        self.query(collection, &[])
    }
}
