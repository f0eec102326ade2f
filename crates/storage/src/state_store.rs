// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-component key/value state store (spec §3.4 / §4.D).
//!
//! A single JSON document `{ component: { key: value } }`, rewritten
//! whole on every write under a coarse lock (spec §9: "a whole-document
//! rewrite per write is acceptable because writes are bounded").

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed state document: {0}")]
    Malformed(#[from] serde_json::Error),
}

type Document = BTreeMap<String, BTreeMap<String, Value>>;

pub struct StateStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl StateStore {
    /// Load (or initialise) the state document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StateStoreError> {
        let path = path.into();
        let doc = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            Document::new()
        };
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// Returns `None` when either the component or the key is absent
    /// (spec §4.D: "`get` returns a tagged-absent result on missing key").
    pub fn get(&self, component: &str, key: &str) -> Option<Value> {
        self.doc
            .lock()
            .get(component)
            .and_then(|c| c.get(key))
            .cloned()
    }

    pub fn set(&self, component: &str, key: &str, value: Value) -> Result<(), StateStoreError> {
        {
            let mut doc = self.doc.lock();
            doc.entry(component.to_string())
                .or_default()
                .insert(key.to_string(), value);
        }
        self.persist()
    }

    pub fn delete(&self, component: &str, key: &str) -> Result<(), StateStoreError> {
        {
            let mut doc = self.doc.lock();
            if let Some(c) = doc.get_mut(component) {
                c.remove(key);
            }
        }
        self.persist()
    }

    pub fn delete_module(&self, component: &str) -> Result<(), StateStoreError> {
        {
            let mut doc = self.doc.lock();
            doc.remove(component);
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), StateStoreError> {
        let doc = self.doc.lock();
        let bytes = serde_json::to_vec_pretty(&*doc)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &bytes)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
