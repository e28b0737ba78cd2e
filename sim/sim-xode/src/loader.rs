//! One-call loading into the in-memory engine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::config::ParserConfig;
use crate::engine::MemoryEngine;
use crate::error::Result;
use crate::parser::Parser;
use crate::tree::{EngineObject, NodeId, SceneTree};

/// A parsed scene together with the engine that holds its objects.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    /// The scene tree.
    pub tree: SceneTree,
    /// Every engine object the tree refers to.
    pub engine: MemoryEngine,
}

impl LoadedScene {
    /// Find a node anywhere in the tree by name.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.tree.named_child(self.tree.root(), name).ok()
    }

    /// The engine object of a named node.
    pub fn object(&self, name: &str) -> Option<EngineObject> {
        self.node(name).and_then(|node| self.tree.object(node))
    }
}

/// XODE loader with configuration options.
#[derive(Debug, Clone, Default)]
pub struct XodeLoader {
    config: ParserConfig,
}

impl XodeLoader {
    /// Create a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given parser settings.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Load XODE from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedScene> {
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    /// Load XODE from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn load_str(&self, xml: &str) -> Result<LoadedScene> {
        self.load_reader(xml.as_bytes())
    }

    /// Load XODE from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or invalid.
    pub fn load_reader<R: BufRead>(&self, source: R) -> Result<LoadedScene> {
        let mut engine = MemoryEngine::new();
        let tree = Parser::with_config(self.config.clone()).parse_reader(&mut engine, source)?;
        debug!(
            bodies = engine.body_count(),
            joints = engine.joint_count(),
            geoms = engine.geom_count(),
            "loaded XODE scene"
        );
        Ok(LoadedScene { tree, engine })
    }
}

/// Load an XODE string with default settings.
///
/// # Errors
///
/// Returns an error if the document is malformed or invalid.
pub fn load_xode_str(xml: &str) -> Result<LoadedScene> {
    XodeLoader::new().load_str(xml)
}

/// Load an XODE file with default settings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the document is invalid.
pub fn load_xode_file(path: impl AsRef<Path>) -> Result<LoadedScene> {
    XodeLoader::new().load_file(path)
}
