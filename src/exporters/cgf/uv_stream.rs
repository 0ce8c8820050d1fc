use log::error;

use crate::events::contexts::{CallContext, CgfMeshNodeContext, ContextKind};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;
use crate::scene::content::MeshVertexUvData;
use crate::scene::manifest::rules::MeshAdvancedRule;

/// Fills the texture coordinates of a mesh. Meshes always get a texcoord stream, zeroed if the
/// source has none.
#[derive(Debug, Default)]
pub struct CgfUvStreamExporter {}

impl CgfUvStreamExporter {
    pub fn new() -> CgfUvStreamExporter {
        CgfUvStreamExporter {}
    }

    /// A stream named by the mesh advanced rule wins, otherwise the first uv stream child is used.
    fn find_uv_stream<'a>(context: &CgfMeshNodeContext<'a>) -> Option<&'a MeshVertexUvData> {
        let graph = context.scene.graph();

        if let Some(rule) = context.group.rules.find_rule::<MeshAdvancedRule>() {
            if rule.is_uv_stream_disabled() {
                return None;
            }
            if !rule.uv_stream_name.is_empty() {
                let named = graph
                    .find_relative(context.node_index, &rule.uv_stream_name)
                    .and_then(|index| graph.get_node_content(index))
                    .and_then(|content| content.as_uv_stream());
                if named.is_some() {
                    return named;
                }
            }
        }

        graph
            .children(context.node_index)
            .find_map(|child| graph.get_node_content(child)?.as_uv_stream())
    }

    fn export_uvs(context: &mut CgfMeshNodeContext<'_>) -> ProcessingResult {
        let uvs = CgfUvStreamExporter::find_uv_stream(context);

        let vertex_count = context.mesh.vertex_count();
        context.mesh.realloc_texcoords(vertex_count);

        let Some(uvs) = uvs else {
            return ProcessingResult::Success;
        };

        if uvs.count() != vertex_count {
            error!(
                "Vertex count ({}) doesn't match the number of entries in uv stream '{}' ({}) of '{}'",
                vertex_count,
                uvs.custom_name,
                uvs.count(),
                context.node_name
            );
            return ProcessingResult::Failure;
        }

        context.mesh.texcoords.copy_from_slice(&uvs.uvs);
        ProcessingResult::Success
    }
}

impl CallProcessor for CgfUvStreamExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfMeshNode(context) => CgfUvStreamExporter::export_uvs(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfUvStreamExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::CgfMeshNode, PhaseMask::FILLING)]
    }
}
