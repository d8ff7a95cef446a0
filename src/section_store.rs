//! Section Store - immutable in-memory BNS dataset
//!
//! Loaded once at startup from `bns_sections.json`:
//! ```json
//! { "metadata": { "title": ..., "total_sections": ..., ... },
//!   "sections": { "103": { "section": "103", "title": ..., ... }, ... } }
//! ```
//! Records keep file order (ranking ties resolve by it) and are indexed by
//! identifier with an FxHashMap. Nothing mutates the store after `load`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Page size used when browsing sections without an explicit limit
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid section record '{id}': {source}")]
    Record {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset contains no sections")]
    Empty,
}

/// One statute provision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    #[serde(rename = "section", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub punishment: Option<String>,
    #[serde(default)]
    pub category: String,
    pub act: String,
}

/// Dataset-level metadata; absent fields fall back to the BNS defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(
        default = "default_total_sections",
        deserialize_with = "deserialize_section_count"
    )]
    pub total_sections: u32,
    #[serde(default = "default_effective_date")]
    pub effective_date: String,
    #[serde(default = "default_replaces")]
    pub replaces: String,
    /// Any other keys present in the file (source, notes, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_title() -> String {
    "Bharatiya Nyaya Sanhita, 2023".to_string()
}

fn default_total_sections() -> u32 {
    384
}

/// Accepts `358` or `"358"`; anything else fails the load
fn deserialize_section_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(|_| {
            serde::de::Error::custom(format!("total_sections is not a count: {:?}", s))
        }),
    }
}

fn default_effective_date() -> String {
    "July 1, 2024".to_string()
}

fn default_replaces() -> String {
    "Indian Penal Code, 1860".to_string()
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            title: default_title(),
            total_sections: default_total_sections(),
            effective_date: default_effective_date(),
            replaces: default_replaces(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Deserialize)]
struct DatasetFile {
    #[serde(default)]
    metadata: DatasetMetadata,
    #[serde(default)]
    sections: serde_json::Map<String, serde_json::Value>,
}

/// Browse filter for `SectionStore::list`
#[derive(Debug, Clone)]
pub struct SectionFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SectionFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// One page of browse results; `total` counts matches before pagination
#[derive(Debug, Serialize)]
pub struct SectionPage<'a> {
    pub sections: Vec<&'a SectionRecord>,
    pub total: usize,
}

#[derive(Debug)]
pub struct SectionStore {
    /// Records in dataset file order
    sections: Vec<SectionRecord>,
    /// Section id -> position in `sections`
    index: FxHashMap<String, usize>,
    metadata: DatasetMetadata,
}

impl SectionStore {
    /// Load the dataset from disk. Any failure is fatal for the caller.
    ///
    /// Metadata is validated: `total_sections` must be a non-negative count,
    /// given as a number or a numeric string. Other metadata keys pass through untouched.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let store = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded {} BNS sections from {} ({} categories)",
            store.len(),
            path.display(),
            store.categories().len()
        );
        Ok(store)
    }

    /// Parse a dataset document
    pub fn from_json(contents: &str) -> Result<Self, StoreError> {
        let file: DatasetFile = serde_json::from_str(contents)?;

        let mut records = Vec::with_capacity(file.sections.len());
        for (id, value) in file.sections {
            let mut record: SectionRecord = serde_json::from_value(value)
                .map_err(|source| StoreError::Record { id: id.clone(), source })?;

            if record.id.is_empty() {
                record.id = id;
            } else if record.id != id {
                tracing::warn!(
                    "Section keyed '{}' declares section '{}'; using the key",
                    id,
                    record.id
                );
                record.id = id;
            }
            records.push(record);
        }

        Self::from_parts(file.metadata, records)
    }

    /// Build a store from already-parsed records (first occurrence of an id wins)
    pub fn from_parts(
        metadata: DatasetMetadata,
        records: Vec<SectionRecord>,
    ) -> Result<Self, StoreError> {
        let mut sections = Vec::with_capacity(records.len());
        let mut index = FxHashMap::default();

        for record in records {
            if index.contains_key(&record.id) {
                tracing::warn!("Duplicate section id '{}' ignored", record.id);
                continue;
            }
            index.insert(record.id.clone(), sections.len());
            sections.push(record);
        }

        if sections.is_empty() {
            return Err(StoreError::Empty);
        }

        Ok(Self {
            sections,
            index,
            metadata,
        })
    }

    pub fn get(&self, id: &str) -> Option<&SectionRecord> {
        self.index.get(id).map(|&i| &self.sections[i])
    }

    /// Iterate records in dataset order
    pub fn iter(&self) -> impl Iterator<Item = &SectionRecord> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Filtered, paginated browse
    ///
    /// `search` matches title, description or identifier case-insensitively;
    /// `category` must equal the record category ignoring case. Empty strings
    /// disable a filter.
    pub fn list(&self, filter: &SectionFilter) -> SectionPage<'_> {
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let category = filter
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase);

        let matches: Vec<&SectionRecord> = self
            .sections
            .iter()
            .filter(|s| match &search {
                Some(q) => {
                    s.title.to_lowercase().contains(q)
                        || s.description.to_lowercase().contains(q)
                        || s.id.to_lowercase().contains(q)
                }
                None => true,
            })
            .filter(|s| match &category {
                Some(c) => s.category.to_lowercase() == *c,
                None => true,
            })
            .collect();

        let total = matches.len();
        let sections = matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();

        SectionPage { sections, total }
    }

    /// Distinct non-empty categories, ascending
    pub fn categories(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| !s.category.is_empty())
            .map(|s| s.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
