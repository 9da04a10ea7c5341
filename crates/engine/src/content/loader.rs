use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use super::types::{ActorDatabase, AiCatalog, RenderConfig};
use super::ContentSet;
use crate::events::ReloadKind;

pub const ACTORS_FILE: &str = "actors.json";
pub const AI_CATALOG_FILE: &str = "ai.json";
pub const RENDER_CONFIG_FILE: &str = "render_config.json";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {origin} at {path_in_document}: {source}")]
    Parse {
        origin: String,
        path_in_document: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Compiled-in copies of the data files, used when a file is missing on disk.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedContent {
    pub actors: &'static str,
    pub ai_catalog: &'static str,
    pub render_config: &'static str,
}

impl EmbeddedContent {
    pub const EMPTY: EmbeddedContent = EmbeddedContent {
        actors: "{}",
        ai_catalog: "{}",
        render_config: "{}",
    };
}

#[derive(Debug, Clone)]
pub struct ContentSource {
    data_dir: PathBuf,
    embedded: EmbeddedContent,
}

impl ContentSource {
    pub fn new(data_dir: impl Into<PathBuf>, embedded: EmbeddedContent) -> Self {
        Self {
            data_dir: data_dir.into(),
            embedded,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, kind: ReloadKind) -> PathBuf {
        let file = match kind {
            ReloadKind::ActorDatabase => ACTORS_FILE,
            ReloadKind::AiCatalog => AI_CATALOG_FILE,
            ReloadKind::RenderConfig => RENDER_CONFIG_FILE,
            ReloadKind::All => return self.data_dir.clone(),
        };
        self.data_dir.join(file)
    }

    pub fn load_all(&self) -> Result<ContentSet, ContentError> {
        Ok(ContentSet::new(
            self.load_actors()?,
            self.load_ai_catalog()?,
            self.load_render_config()?,
        ))
    }

    pub fn load_actors(&self) -> Result<ActorDatabase, ContentError> {
        self.load(ReloadKind::ActorDatabase, self.embedded.actors)
    }

    pub fn load_ai_catalog(&self) -> Result<AiCatalog, ContentError> {
        self.load(ReloadKind::AiCatalog, self.embedded.ai_catalog)
    }

    pub fn load_render_config(&self) -> Result<RenderConfig, ContentError> {
        self.load(ReloadKind::RenderConfig, self.embedded.render_config)
    }

    fn load<T: DeserializeOwned>(
        &self,
        kind: ReloadKind,
        embedded: &'static str,
    ) -> Result<T, ContentError> {
        let path = self.path_for(kind);
        match fs::read_to_string(&path) {
            Ok(raw) => parse_document(&path.display().to_string(), &raw),
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                info!(
                    kind = kind.as_str(),
                    path = %path.display(),
                    "content_fallback_to_embedded"
                );
                parse_document(&format!("embedded {}", kind.as_str()), embedded)
            }
            Err(source) => Err(ContentError::Read { path, source }),
        }
    }
}

/// Parses JSON, reporting the failing field path.
pub fn parse_document<T: DeserializeOwned>(origin: &str, raw: &str) -> Result<T, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        ContentError::Parse {
            origin: origin.to_string(),
            path_in_document: if path.is_empty() { ".".to_string() } else { path },
            source: error.into_inner(),
        }
    })
}
