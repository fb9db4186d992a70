//! Topic content loaded from disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use skilldrill_core::matching::INTEGRITY_TARGET;
use skilldrill_core::{parse_topic, Item, ParseError, Topic};
use thiserror::Error;

/// Errors loading the content directory.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid topic file {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },

    #[error("topic `{0}` is defined more than once")]
    DuplicateTopic(String),
}

/// Read-only set of topics, keyed by topic id.
#[derive(Debug, Default, Clone)]
pub struct ContentCatalog {
    topics: BTreeMap<String, Topic>,
}

impl ContentCatalog {
    /// Load every `*.md` file in `dir`; the file stem is the topic id.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(topic_id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            else {
                continue;
            };
            let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            sources.push((path, topic_id, content));
        }

        let mut catalog = Self::default();
        for (path, topic_id, content) in sources {
            let topic = parse_topic(&topic_id, &content)
                .map_err(|source| CatalogError::Parse { path, source })?;
            catalog.insert(topic)?;
        }

        tracing::info!(
            "Loaded {} topics from {}",
            catalog.topics.len(),
            dir.display()
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory `(topic_id, content)` pairs.
    pub fn from_sources(sources: &[(&str, &str)]) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (topic_id, content) in sources {
            let topic = parse_topic(topic_id, content).map_err(|source| CatalogError::Parse {
                path: PathBuf::from(topic_id),
                source,
            })?;
            catalog.insert(topic)?;
        }
        Ok(catalog)
    }

    fn insert(&mut self, topic: Topic) -> Result<(), CatalogError> {
        for item in topic.items.iter() {
            if let Some(defect) = &item.defect {
                tracing::warn!(
                    target: INTEGRITY_TARGET,
                    topic_id = %item.topic_id,
                    item_id = %item.id,
                    error = %defect,
                    "item will always grade as incorrect"
                );
            }
        }

        if self.topics.contains_key(&topic.id) {
            return Err(CatalogError::DuplicateTopic(topic.id));
        }
        self.topics.insert(topic.id.clone(), topic);
        Ok(())
    }

    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.get(topic_id)
    }

    pub fn item(&self, topic_id: &str, item_id: &str) -> Option<&Item> {
        self.topic(topic_id)?.item(item_id)
    }

    /// Current number of items in a topic, used to seed new ledgers.
    pub fn item_count(&self, topic_id: &str) -> Option<usize> {
        self.topic(topic_id).map(|topic| topic.items.len())
    }

    /// Topics ordered by id.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.values()
    }
}
