use glam::Affine3A;

use crate::importer::scene_system::SceneSystem;
use crate::scene::content::{BoneData, ContentKind, NodeContent};
use crate::scene::graph::{NodeIndex, SceneGraph};
use crate::scene::views::of_kind;

pub struct BoneBuilder {}

impl BoneBuilder {
    /// `global_transform` is the accumulated source transform of the node. The bone becomes a
    /// root bone if no ancestor in the graph carries a bone.
    pub fn build_bone(
        graph: &mut SceneGraph,
        target: NodeIndex,
        global_transform: Affine3A,
        system: &SceneSystem,
    ) -> bool {
        let world_transform = system.convert_bone_unit(system.swap_transform_for_up_axis(global_transform));
        let is_root = BoneBuilder::is_root_bone(graph, target);
        graph.set_content(
            target,
            NodeContent::Bone(BoneData {
                world_transform,
                is_root,
            }),
        )
    }

    fn is_root_bone(graph: &SceneGraph, target: NodeIndex) -> bool {
        of_kind(graph, graph.upwards(target).skip(1), ContentKind::Bone)
            .next()
            .is_none()
    }
}
