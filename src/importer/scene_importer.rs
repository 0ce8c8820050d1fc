use std::collections::VecDeque;
use std::path::Path;

use glam::Affine3A;
use log::{debug, error, warn};

use crate::importer::ImportError;
use crate::importer::bone_builder::BoneBuilder;
use crate::importer::material_builder::MaterialBuilder;
use crate::importer::mesh_builder::MeshBuilder;
use crate::importer::scene_system::SceneSystem;
use crate::importer::skin_builder::SkinBuilder;
use crate::importer::source::{SourceNode, SourceScene};
use crate::scene::Scene;
use crate::scene::content::NodeContent;
use crate::scene::graph::{NodeIndex, SceneGraph};

pub const TRANSFORM_NODE_NAME: &str = "transform";

/// Below this a local transform counts as identity and is not stored.
const IDENTITY_EPSILON: f32 = 1.0e-6;

/// Turns a source scene description into a scene graph.
pub struct SceneImporter {}

struct QueuedNode<'a> {
    node: &'a SourceNode,
    parent: NodeIndex,
    parent_global_transform: Affine3A,
}

impl SceneImporter {
    pub const DEFAULT_FILE_EXTENSION: &'static str = "json";

    /// Loads `path` into `scene` and remembers it as the scene's source.
    pub fn populate_from_file(path: &Path, scene: &mut Scene) -> bool {
        let source = match SceneImporter::load(path) {
            Ok(source) => source,
            Err(err) => {
                error!("Failed to load scene {}: {:?}", path.display(), err);
                return false;
            }
        };

        scene.set_source_filename(path);
        SceneImporter::convert_scene(&source, scene)
    }

    fn load(path: &Path) -> Result<SourceScene, ImportError> {
        let source = SourceScene::load(path)?;
        if source.root.is_none() {
            return Err(ImportError::NoRootNode);
        }
        Ok(source)
    }

    /// Appends the source tree breadth first below the graph's root.
    pub fn convert_scene(source: &SourceScene, scene: &mut Scene) -> bool {
        let Some(root) = &source.root else {
            error!("Scene {} has no root node", scene.name());
            return false;
        };

        let system = SceneSystem::new(&source.settings);
        let graph = scene.graph_mut();

        let mut queue = VecDeque::new();
        queue.push_back(QueuedNode {
            node: root,
            parent: graph.get_root(),
            parent_global_transform: Affine3A::IDENTITY,
        });

        while let Some(queued) = queue.pop_front() {
            let global_transform = queued.parent_global_transform * queued.node.local_transform.to_affine();
            let Some(index) = SceneImporter::append_node(graph, queued.parent, queued.node, global_transform, &system)
            else {
                warn!("Skipping source node '{}' and its children", queued.node.name);
                continue;
            };

            queue.extend(queued.node.children.iter().map(|child| QueuedNode {
                node: child,
                parent: index,
                parent_global_transform: global_transform,
            }));
        }

        debug!("Imported {} scene graph nodes", graph.get_node_count());
        true
    }

    /// Always creates the node, even if it stays empty.
    fn append_node(
        graph: &mut SceneGraph,
        parent: NodeIndex,
        node: &SourceNode,
        global_transform: Affine3A,
        system: &SceneSystem,
    ) -> Option<NodeIndex> {
        let index = graph.add_child(parent, &node.name, None)?;

        let mut used = SceneImporter::build_skin_node(graph, index, node, system);
        if !used {
            used = node
                .mesh
                .as_ref()
                .is_some_and(|mesh| MeshBuilder::build_mesh(graph, index, mesh, system, false));
        }
        if used {
            MaterialBuilder::build_material_nodes(graph, index, &node.materials);
        } else if node.is_bone {
            used = BoneBuilder::build_bone(graph, index, global_transform, system);
        }

        SceneImporter::build_transform_node(graph, index, node, system, used);
        Some(index)
    }

    fn build_skin_node(graph: &mut SceneGraph, index: NodeIndex, node: &SourceNode, system: &SceneSystem) -> bool {
        let Some(mesh) = node.mesh.as_ref().filter(|mesh| !mesh.skins.is_empty()) else {
            return false;
        };

        if !SkinBuilder::build_skins(graph, index, mesh) {
            return false;
        }
        MeshBuilder::build_mesh(graph, index, mesh, system, true)
    }

    fn build_transform(node: &SourceNode, system: &SceneSystem) -> Option<Affine3A> {
        let local_transform = node.evaluate_local_transform();
        if local_transform.abs_diff_eq(Affine3A::IDENTITY, IDENTITY_EPSILON) {
            return None;
        }
        Some(system.convert_transform_unit(system.swap_transform_for_up_axis(local_transform)))
    }

    /// Nodes that already carry content get their transform as an end point child.
    fn build_transform_node(
        graph: &mut SceneGraph,
        index: NodeIndex,
        node: &SourceNode,
        system: &SceneSystem,
        node_used: bool,
    ) -> bool {
        let Some(transform) = SceneImporter::build_transform(node, system) else {
            return false;
        };

        if node_used {
            match graph.add_child(index, TRANSFORM_NODE_NAME, Some(NodeContent::Transform(transform))) {
                Some(child) => graph.make_end_point(child),
                None => false,
            }
        } else {
            graph.set_content(index, NodeContent::Transform(transform))
        }
    }
}
