//! Immutable species catalog.
//!
//! The catalog is loaded once, before the first render, and never mutated afterwards. Records
//! keep their source order (the order the list is displayed in) and are keyed by name.

use crate::error::CatalogLoadError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    /// Generator-specific size descriptor, e.g. `8-10x6-8`.
    pub spore_measurements: String,
    /// Shape class tag, only interpreted by the diagram generator.
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cite: Option<String>,
}

impl SpeciesRecord {
    pub fn new(
        name: impl Into<String>,
        spore_measurements: impl Into<String>,
        shape: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            spore_measurements: spore_measurements.into(),
            shape: shape.into(),
            cite: None,
        }
    }

    pub fn with_cite(mut self, cite: impl Into<String>) -> Self {
        self.cite = Some(cite.into());
        self
    }

    /// Citation text for the caption; empty when the record carries none.
    pub fn citation(&self) -> &str {
        self.cite.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: IndexMap<String, SpeciesRecord>,
}

impl Catalog {
    pub fn from_records(
        records: impl IntoIterator<Item = SpeciesRecord>,
    ) -> Result<Self, CatalogLoadError> {
        let mut out = IndexMap::new();
        for (index, record) in records.into_iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(CatalogLoadError::EmptyName { index });
            }
            if out.contains_key(&record.name) {
                return Err(CatalogLoadError::DuplicateName { name: record.name });
            }
            out.insert(record.name.clone(), record);
        }
        Ok(Self { records: out })
    }

    /// Parses a JSON array of species records.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogLoadError> {
        let records: Vec<SpeciesRecord> = serde_json::from_str(text)?;
        Self::from_records(records)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, CatalogLoadError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesRecord> {
        self.records.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<&SpeciesRecord> {
        self.records.get_index(index).map(|(_, record)| record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SpeciesRecord> + '_ {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
