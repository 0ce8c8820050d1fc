use cgf_files::cgf::types::MeshColor;
use glam::Vec4;
use log::error;

use crate::events::contexts::{CallContext, CgfMeshNodeContext, ContextKind};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;
use crate::scene::content::MeshVertexColorData;
use crate::scene::manifest::rules::MeshAdvancedRule;

/// Copies a vertex color stream into a mesh. Meshes without one keep no colors at all.
#[derive(Debug, Default)]
pub struct CgfColorStreamExporter {}

/// Clamps each channel to [0, 1] and scales it to a byte.
pub fn to_mesh_color(color: Vec4) -> MeshColor {
    (color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0)
        .to_array()
        .map(|channel| channel as u8)
}

impl CgfColorStreamExporter {
    pub fn new() -> CgfColorStreamExporter {
        CgfColorStreamExporter {}
    }

    fn find_color_stream<'a>(context: &CgfMeshNodeContext<'a>) -> Option<&'a MeshVertexColorData> {
        let graph = context.scene.graph();

        let stream_name = context
            .group
            .rules
            .find_rule::<MeshAdvancedRule>()
            .map(|rule| rule.vertex_color_stream_name.as_str())
            .filter(|name| !name.is_empty());
        if let Some(stream_name) = stream_name {
            let named = graph
                .find_relative(context.node_index, stream_name)
                .and_then(|index| graph.get_node_content(index))
                .and_then(|content| content.as_color_stream());
            if named.is_some() {
                return named;
            }
        }

        graph
            .children(context.node_index)
            .find_map(|child| graph.get_node_content(child)?.as_color_stream())
    }

    fn export_colors(context: &mut CgfMeshNodeContext<'_>) -> ProcessingResult {
        let disabled = context
            .group
            .rules
            .find_rule::<MeshAdvancedRule>()
            .is_some_and(MeshAdvancedRule::is_vertex_color_stream_disabled);
        if disabled {
            return ProcessingResult::Ignored;
        }

        let Some(colors) = CgfColorStreamExporter::find_color_stream(context) else {
            return ProcessingResult::Ignored;
        };

        let vertex_count = context.mesh.vertex_count();
        if colors.count() != vertex_count {
            error!(
                "Vertex count ({}) doesn't match the number of entries in color stream '{}' ({}) of '{}'",
                vertex_count,
                colors.custom_name,
                colors.count(),
                context.node_name
            );
            return ProcessingResult::Failure;
        }

        context.mesh.realloc_colors(vertex_count);
        for (target, color) in context.mesh.colors.iter_mut().zip(&colors.colors) {
            *target = to_mesh_color(*color);
        }
        ProcessingResult::Success
    }
}

impl CallProcessor for CgfColorStreamExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfMeshNode(context) => CgfColorStreamExporter::export_colors(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfColorStreamExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::CgfMeshNode, PhaseMask::FILLING)]
    }
}
