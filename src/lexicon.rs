//! Lexicon store: named categories mapping keyword → integer weight.
//!
//! Loaded once at startup and treated as immutable afterwards
//! (load-then-publish; concurrent readers never observe a partial lexicon).
//! Two disjoint families exist in this service: the emotion lexicon under
//! `lexicons/emotions/` and the topic-category lexicon under
//! `lexicons/categories/`.
//!
//! Source files are JSON, one category per file (file stem = category name)
//! or one file holding a `{category: entry}` map. Each category entry may be
//! any of the shapes observed in the wild:
//!
//! - `{"keyword": weight, ...}`          explicit weights
//! - `["keyword", ...]`                  bare list, weight 1 each
//! - `{"keywords": ["keyword", ...]}`    nested list, weight 1 each
//!
//! The shape sniffing lives in one adapter (`CategoryFile`) so every loader
//! path normalizes to the same canonical form.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ClassifyError;

/// Keyword → weight for a single category. Keywords are normalized to
/// lowercase at load time; weights are positive integers.
pub type KeywordWeights = BTreeMap<String, u32>;

/// Immutable, fully loaded lexicon. `BTreeMap` keeps category iteration in
/// name order, which downstream tie-breaking relies on.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    categories: BTreeMap<String, KeywordWeights>,
}

/// One category entry as it appears on disk. Untagged: serde tries each
/// shape in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoryFile {
    Weighted(BTreeMap<String, u32>),
    Bare(Vec<String>),
    Nested { keywords: Vec<String> },
}

impl CategoryFile {
    /// Normalize any accepted shape into keyword → weight with lowercase,
    /// whitespace-collapsed keywords. Default weight is 1.
    fn into_weights(self) -> KeywordWeights {
        match self {
            CategoryFile::Weighted(map) => map
                .into_iter()
                .map(|(k, w)| (normalize_keyword(&k), w.max(1)))
                .collect(),
            CategoryFile::Bare(list) => list
                .into_iter()
                .map(|k| (normalize_keyword(&k), 1))
                .collect(),
            CategoryFile::Nested { keywords } => keywords
                .into_iter()
                .map(|k| (normalize_keyword(&k), 1))
                .collect(),
        }
    }
}

/// Keywords are matched against lowercase tokens; multi-word keywords keep a
/// single internal space per word boundary.
fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Lexicon {
    pub fn new(categories: BTreeMap<String, KeywordWeights>) -> Self {
        Self { categories }
    }

    /// Build a lexicon from inline pairs. Test fixtures mostly.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<(&'a str, u32)>)>,
    {
        let categories = entries
            .into_iter()
            .map(|(name, kws)| {
                let weights = kws
                    .into_iter()
                    .map(|(k, w)| (normalize_keyword(k), w.max(1)))
                    .collect();
                (name.to_string(), weights)
            })
            .collect();
        Self { categories }
    }

    /// Load every `*.json` file in `dir` as one category each (file stem =
    /// category name). Any unreadable or malformed file is fatal.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| ClassifyError::LexiconLoad {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut categories = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| ClassifyError::LexiconLoad {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| ClassifyError::LexiconLoad {
                    path: path.clone(),
                    reason: "file stem is not valid UTF-8".into(),
                })?;
            let file = parse_category_file(&path)?;
            categories.insert(name, file.into_weights());
        }

        if categories.is_empty() {
            return Err(ClassifyError::LexiconLoad {
                path: dir.to_path_buf(),
                reason: "no *.json category files found".into(),
            });
        }
        Ok(Self { categories })
    }

    /// Load a single file holding all categories: `{category: entry}` where
    /// each entry is any accepted `CategoryFile` shape.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| ClassifyError::LexiconLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw: BTreeMap<String, CategoryFile> =
            serde_json::from_str(&data).map_err(|e| ClassifyError::LexiconLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let categories = raw
            .into_iter()
            .map(|(name, file)| (name, file.into_weights()))
            .collect();
        Ok(Self { categories })
    }

    /// Load from a directory or a single file, whichever `path` is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::load_file(path)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Categories in name order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeywordWeights)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn parse_category_file(path: &Path) -> Result<CategoryFile, ClassifyError> {
    let data = fs::read_to_string(path).map_err(|e| ClassifyError::LexiconLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| ClassifyError::LexiconLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
