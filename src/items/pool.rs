use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use rust_embed::Embed;

use crate::error::{Result, SpanError};

#[derive(Embed)]
#[folder = "assets/material/"]
struct BundledMaterial;

pub const BUNDLED_PROCESSING_ITEMS: &str = "processing_items.tsv";
pub const BUNDLED_TARGETS: &str = "targets.txt";

/// A verification statement and the response label that is correct for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingItem {
    pub prompt: String,
    pub expected: String,
}

impl ProcessingItem {
    /// Parses a `statement<TAB>response` line. `line` is 1-based and only
    /// used for error reporting.
    pub fn parse(content: &str, line: usize) -> Result<Self> {
        let malformed = || SpanError::MalformedProcessingItem {
            line,
            content: content.to_string(),
        };
        let (prompt, expected) = content.split_once('\t').ok_or_else(malformed)?;
        let (prompt, expected) = (prompt.trim(), expected.trim());
        if prompt.is_empty() || expected.is_empty() || expected.contains('\t') {
            return Err(malformed());
        }
        Ok(Self {
            prompt: prompt.to_string(),
            expected: expected.to_string(),
        })
    }
}

/// The unique, non-blank lines of an item file.
#[derive(Clone, Debug)]
pub struct ItemPool {
    name: String,
    items: Vec<String>,
    duplicates: Vec<String>,
}

impl ItemPool {
    pub fn from_text(name: &str, text: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        let mut duplicates = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if seen.insert(line) {
                items.push(line.to_string());
            } else if !duplicates.iter().any(|d| d == line) {
                duplicates.push(line.to_string());
            }
        }
        if items.is_empty() {
            return Err(SpanError::EmptyPool(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            items,
            duplicates,
        })
    }

    /// Loads `path`, or the bundled file of the same role when no path is given.
    pub fn load(path: Option<&Path>, bundled: &str) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| SpanError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_text(&path.display().to_string(), &text)
            }
            None => {
                let text = BundledMaterial::get(bundled)
                    .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
                    .ok_or_else(|| SpanError::EmptyPool(bundled.to_string()))?;
                Self::from_text(bundled, &text)
            }
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines that occurred more than once in the source.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// True when every item is a single character, in which case recall
    /// entries are split per character.
    pub fn single_characters(&self) -> bool {
        self.items.iter().all(|item| item.chars().count() == 1)
    }

    pub fn ensure_capacity(&self, required: usize) -> Result<()> {
        if self.items.len() < required {
            return Err(SpanError::PoolTooSmall {
                pool: self.name.clone(),
                available: self.items.len(),
                required,
            });
        }
        Ok(())
    }

    pub fn processing_items(&self) -> Result<Vec<ProcessingItem>> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, line)| ProcessingItem::parse(line, i + 1))
            .collect()
    }

    /// The set of response labels used by a processing pool.
    pub fn response_labels(items: &[ProcessingItem]) -> BTreeSet<String> {
        items.iter().map(|item| item.expected.clone()).collect()
    }
}
