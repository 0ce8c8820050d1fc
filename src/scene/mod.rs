use std::path::{Path, PathBuf};

use crate::scene::graph::SceneGraph;
use crate::scene::manifest::{MANIFEST_EXTENSION, SceneManifest};

pub mod content;
pub mod graph;
pub mod manifest;
pub mod selection;
pub mod views;


/// One imported scene: its graph plus the export configuration.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    source_filename: PathBuf,
    graph: SceneGraph,
    manifest: SceneManifest,
}

impl Scene {
    pub fn new(name: &str) -> Scene {
        Scene {
            name: name.to_string(),
            ..Scene::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_filename(&self) -> &Path {
        &self.source_filename
    }

    pub fn set_source_filename(&mut self, filename: impl Into<PathBuf>) {
        self.source_filename = filename.into();
    }

    /// The directory next to the source, where material files are kept.
    pub fn source_directory(&self) -> &Path {
        self.source_filename.parent().unwrap_or(Path::new(""))
    }

    /// `<source>.assetinfo`
    pub fn manifest_filename(&self) -> PathBuf {
        let mut filename = self.source_filename.clone().into_os_string();
        filename.push(".");
        filename.push(MANIFEST_EXTENSION);
        PathBuf::from(filename)
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn manifest(&self) -> &SceneManifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut SceneManifest {
        &mut self.manifest
    }
}
