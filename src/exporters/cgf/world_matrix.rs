use glam::{Affine3A, Quat, Vec3};
use log::warn;

use crate::events::contexts::{CallContext, CgfMeshGroupContext, CgfNodeContext, ContextKind};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;
use crate::scene::content::NodeContent;
use crate::scene::graph::{NodeIndex, SceneGraph};
use crate::scene::manifest::rules::OriginRule;
use crate::scene::views::convert;

/// Bakes the hierarchy transforms of every exported node, optionally re-rooted by the origin rule
/// of the group.
#[derive(Debug)]
pub struct CgfWorldMatrixExporter {
    root_matrix: Option<Affine3A>,
}

impl Default for CgfWorldMatrixExporter {
    fn default() -> Self {
        CgfWorldMatrixExporter::new()
    }
}

/// Product of all transforms from `index` up to the root, closest last. Nodes without a
/// transform of their own contribute their first end point transform child, if any.
/// Returns None if no transform was found at all.
pub fn concatenate_matrices_upwards(graph: &SceneGraph, index: NodeIndex) -> Option<Affine3A> {
    let mut transform = Affine3A::IDENTITY;
    let mut translated = false;

    for node in graph.upwards(index) {
        let Some(content) = graph.get_node_content(node) else {
            continue;
        };

        if let Some(node_transform) = content.as_transform().or_else(|| end_point_transform(graph, node)) {
            transform = *node_transform * transform;
            translated = true;
        }
    }

    translated.then_some(transform)
}

fn end_point_transform(graph: &SceneGraph, index: NodeIndex) -> Option<&Affine3A> {
    let end_points = graph.children(index).filter(|child| graph.is_node_end_point(*child));
    convert(graph, end_points, NodeContent::as_transform)
        .map(|(_, transform)| transform)
        .next()
}

impl CgfWorldMatrixExporter {
    pub fn new() -> CgfWorldMatrixExporter {
        CgfWorldMatrixExporter { root_matrix: None }
    }

    fn compute_root_matrix(graph: &SceneGraph, rule: &OriginRule) -> Option<Affine3A> {
        let mut root_matrix = None;

        if rule.translation != Vec3::ZERO || rule.rotation != Quat::IDENTITY {
            root_matrix = Some(Affine3A::from_rotation_translation(rule.rotation, rule.translation));
        }

        if rule.scale != 1.0 {
            let matrix = root_matrix.unwrap_or(Affine3A::IDENTITY);
            root_matrix = Some(matrix * Affine3A::from_scale(Vec3::splat(rule.scale)));
        }

        if !rule.origin_node_name.is_empty() && !rule.use_root_as_origin {
            match graph.find(&rule.origin_node_name) {
                Some(origin) => {
                    if let Some(origin_matrix) = concatenate_matrices_upwards(graph, origin) {
                        let matrix = root_matrix.unwrap_or(Affine3A::IDENTITY);
                        root_matrix = Some(matrix * origin_matrix.inverse());
                    }
                }
                None => warn!("Origin node '{}' is not part of the scene", rule.origin_node_name),
            }
        }

        root_matrix
    }

    fn process_mesh_group(&mut self, context: &CgfMeshGroupContext<'_>) -> ProcessingResult {
        self.root_matrix = None;

        let Some(rule) = context.group.rules.find_rule::<OriginRule>() else {
            return ProcessingResult::Ignored;
        };

        self.root_matrix = CgfWorldMatrixExporter::compute_root_matrix(context.scene.graph(), rule);
        match self.root_matrix {
            Some(_) => ProcessingResult::Success,
            None => ProcessingResult::Ignored,
        }
    }

    fn process_node(&self, context: &mut CgfNodeContext<'_>) -> ProcessingResult {
        let graph = context.scene.graph();
        let concatenated = concatenate_matrices_upwards(graph, context.node_index);
        let mut translated = concatenated.is_some();
        let mut world_matrix = concatenated.unwrap_or(Affine3A::IDENTITY);

        if let Some(root_matrix) = self.root_matrix {
            world_matrix = root_matrix * world_matrix;
            translated = true;
        }

        // unmerged nodes keep their placement in the local matrix
        if context.container.export_info.merge_all_nodes {
            context.node.world_tm = world_matrix;
        } else {
            context.node.local_tm = world_matrix;
        }
        context.node.identity_matrix = !translated;

        ProcessingResult::Success
    }
}

impl CallProcessor for CgfWorldMatrixExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfMeshGroup(context) => self.process_mesh_group(context),
            CallContext::CgfNode(context) => self.process_node(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfWorldMatrixExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![
            (ContextKind::CgfMeshGroup, PhaseMask::CONSTRUCTION),
            (ContextKind::CgfNode, PhaseMask::FILLING),
        ]
    }
}
