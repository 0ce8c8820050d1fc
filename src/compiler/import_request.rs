use std::path::Path;

use log::{debug, error, info, warn};

use crate::compiler::meta_info::ManifestMetaInfoProvider;
use crate::events::result::ProcessingResult;
use crate::importer::scene_importer::SceneImporter;
use crate::scene::Scene;
use crate::scene::content::ContentKind;
use crate::scene::manifest::groups::{ManifestObject, MeshGroup};
use crate::scene::views::{Traversal, of_kind};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ManifestAction {
    /// No usable manifest exists, derive one from the scene.
    ConstructDefault,
    /// A manifest was loaded and may be adjusted to the current scene.
    Update,
}

/// Loads a scene source together with its manifest.
pub struct AssetImportRequest {}

impl AssetImportRequest {
    /// Adds a mesh group covering every mesh when the manifest has none yet.
    pub fn update_manifest(
        scene: &mut Scene,
        action: ManifestAction,
        meta_info: &dyn ManifestMetaInfoProvider,
    ) -> ProcessingResult {
        if action == ManifestAction::Update {
            return ProcessingResult::Ignored;
        }

        if scene.manifest().mesh_groups().next().is_some() {
            return ProcessingResult::Ignored;
        }

        let graph = scene.graph();
        let has_mesh = of_kind(graph, graph.downwards(graph.get_root(), Traversal::BreadthFirst), ContentKind::Mesh)
            .next()
            .is_some();
        if !has_mesh {
            warn!("Scene '{}' has no meshes to build a default manifest from", scene.name());
            return ProcessingResult::Failure;
        }

        let mut group = ManifestObject::MeshGroup(MeshGroup::default());
        meta_info.initialize_object(scene, &mut group);

        let name = scene.name().to_string();
        if !scene.manifest_mut().add_entry(&name, group) {
            return ProcessingResult::Failure;
        }
        debug!("Added default mesh group '{}'", name);
        ProcessingResult::Success
    }

    /// Imports `source` and attaches `<source>.assetinfo` if it exists. A missing, broken or
    /// empty manifest is replaced by the default one. Returns `None` if the scene cannot be
    /// loaded or there is nothing to build a default manifest from.
    pub fn load_scene(source: &Path, meta_info: &dyn ManifestMetaInfoProvider) -> Option<Scene> {
        let name = source.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
        let mut scene = Scene::new(name);
        if !SceneImporter::populate_from_file(source, &mut scene) {
            return None;
        }

        let manifest_filename = scene.manifest_filename();
        let mut action = ManifestAction::ConstructDefault;
        if manifest_filename.exists() {
            match scene.manifest_mut().load_from_file(&manifest_filename) {
                Ok(()) if scene.manifest().is_empty() => {
                    info!("Manifest {} has no entries, using defaults", manifest_filename.display());
                }
                Ok(()) => action = ManifestAction::Update,
                Err(err) => {
                    error!("Unable to load manifest {}: {}", manifest_filename.display(), err);
                    scene.manifest_mut().clear();
                }
            }
        } else {
            info!("No manifest found for {}, using defaults", source.display());
        }

        let result = AssetImportRequest::update_manifest(&mut scene, action, meta_info);
        debug!("Manifest update ({:?}) for '{}': {:?}", action, scene.name(), result);
        if result == ProcessingResult::Failure {
            error!("No manifest for '{}' and nothing to build a default one from", scene.name());
            return None;
        }
        Some(scene)
    }
}
