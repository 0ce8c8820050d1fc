use std::collections::HashMap;

use cgf_files::common::crc::crc32_lowercase;
use cgf_files::skeleton::types::{BoneDesc, BoneEntity, BonePhysics};
use log::{error, trace};

use crate::events::contexts::{CallContext, ContextKind, SkeletonContext};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::scene::graph::{NodeIndex, SceneGraph};

/// Fills the skinning info of a skeleton context with the bones below its root bone: one
/// descriptor per bone, then one entity per bone in the same depth first order. Only bones
/// continue the hierarchy, any other node ends its branch.
#[derive(Debug, Default)]
pub struct ChrSkeletonExporter {
    bone_indices: HashMap<String, usize>,
}

impl ChrSkeletonExporter {
    pub fn new() -> ChrSkeletonExporter {
        ChrSkeletonExporter {
            bone_indices: HashMap::new(),
        }
    }

    fn find_root(context: &SkeletonContext<'_>) -> Option<NodeIndex> {
        let root = context.scene.graph().find(context.root_bone_name);
        if root.is_none() {
            error!("Root bone '{}' cannot be found", context.root_bone_name);
        }
        root
    }

    fn create_bone_desc_data(&mut self, graph: &SceneGraph, index: NodeIndex, context: &mut SkeletonContext<'_>) {
        let Some(bone) = graph.get_node_content(index).and_then(|content| content.as_bone()) else {
            return;
        };
        let Some(full_name) = graph.get_node_name(index) else {
            return;
        };

        let bone_desc = BoneDesc::new(
            SceneGraph::get_short_name(full_name),
            crc32_lowercase(full_name),
            bone.world_transform,
        );
        trace!("Bone {} -> {}", context.skinning_info.bones_desc.len(), full_name);
        self.bone_indices
            .insert(full_name.to_string(), context.skinning_info.bones_desc.len());
        context.skinning_info.bones_desc.push(bone_desc);

        for child in graph.children(index) {
            self.create_bone_desc_data(graph, child, context);
        }
    }

    fn create_bone_entity_data(
        &self,
        graph: &SceneGraph,
        index: NodeIndex,
        context: &mut SkeletonContext<'_>,
    ) -> ProcessingResult {
        if graph.get_node_content(index).and_then(|content| content.as_bone()).is_none() {
            return ProcessingResult::Success;
        }
        let Some(full_name) = graph.get_node_name(index) else {
            return ProcessingResult::Success;
        };

        let mut bone_entity = BoneEntity {
            parent_id: -1,
            controller_id: crc32_lowercase(full_name),
            phys: BonePhysics {
                phys_geom: -1,
                flags: 0,
            },
            ..BoneEntity::default()
        };

        if let Some(bone_id) = self.bone_indices.get(full_name) {
            bone_entity.bone_id = *bone_id as i32;
            if full_name != context.root_bone_name {
                let parent_id = graph
                    .get_node_parent(index)
                    .and_then(|parent| graph.get_node_name(parent))
                    .and_then(|parent_name| self.bone_indices.get(parent_name));
                match parent_id {
                    Some(parent_id) => bone_entity.parent_id = *parent_id as i32,
                    None => {
                        error!("The direct parent of bone '{}' is not a bone", full_name);
                        return ProcessingResult::Failure;
                    }
                }
            }
        }

        bone_entity.n_children = graph
            .children(index)
            .filter_map(|child| graph.get_node_name(child))
            .filter(|child_name| self.bone_indices.contains_key(*child_name))
            .count() as i32;

        context.skinning_info.bone_entities.push(bone_entity);

        let mut result = ProcessingResultCombiner::new();
        result += ProcessingResult::Success;
        for child in graph.children(index) {
            result += self.create_bone_entity_data(graph, child, context);
        }
        result.result()
    }

    fn fill_skeleton(&mut self, context: &mut SkeletonContext<'_>) -> ProcessingResult {
        let Some(root) = ChrSkeletonExporter::find_root(context) else {
            return ProcessingResult::Failure;
        };

        let graph = context.scene.graph();
        self.create_bone_desc_data(graph, root, context);
        self.create_bone_entity_data(graph, root, context)
    }
}

impl CallProcessor for ChrSkeletonExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        let CallContext::Skeleton(context) = context else {
            return ProcessingResult::Ignored;
        };

        match context.phase {
            Phase::Construction => {
                self.bone_indices.clear();
                ProcessingResult::Ignored
            }
            Phase::Filling => self.fill_skeleton(context),
            Phase::Finalizing => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for ChrSkeletonExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::Skeleton, PhaseMask::CONSTRUCTION | PhaseMask::FILLING)]
    }
}
