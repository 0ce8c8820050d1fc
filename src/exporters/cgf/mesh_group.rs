use cgf_files::cgf::types::{ContentCgf, NodeCgf, PhysicalizeType};
use log::{debug, error, warn};

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, CgfContainerContext, CgfMeshGroupContext, CgfNodeContext, ContextKind};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::cgf::CGF_EXTENSION;
use crate::exporters::prepare_output_file;
use crate::scene::manifest::rules::PhysicsRule;
use crate::scene::selection::SceneGraphSelector;

/// Builds one `.cgf` per mesh group: a container with a node per selected mesh, physics proxies
/// first.
pub struct CgfMeshGroupExporter {
    writer: SharedAssetWriter,
}

/// The container defaults every geometry export starts from.
pub(crate) fn configure_content(content: &mut ContentCgf) {
    let info = &mut content.export_info;
    info.merge_all_nodes = true;
    info.use_custom_normals = false;
    info.compiled_cgf = false;
    info.have_physics_proxy = false;
    info.have_auto_lods = false;
    info.no_mesh = true;
    info.eight_weights_per_vertex = false;
    info.want_f32_vertices = false;
    info.author_tool_version = 1;
}

impl CgfMeshGroupExporter {
    pub fn new(writer: SharedAssetWriter) -> CgfMeshGroupExporter {
        CgfMeshGroupExporter { writer }
    }

    fn export_group(&self, registry: &CallProcessorRegistry, context: &CgfMeshGroupContext<'_>) -> ProcessingResult {
        let Some(filename) = prepare_output_file(context.group_name, context.output_directory, CGF_EXTENSION) else {
            error!(
                "Unable to write CGF file for group '{}'. Filename is empty or target folder does not exist",
                context.group_name
            );
            return ProcessingResult::Failure;
        };

        let mut content = ContentCgf::new(filename);
        configure_content(&mut content);

        let mut result = ProcessingResultCombiner::new();
        result += registry.process(&mut CallContext::CgfContainer(CgfContainerContext::new(
            context,
            &mut content,
            Phase::Construction,
        )));

        let mut filling = CgfContainerContext::new(context, &mut content, Phase::Filling);
        result += CgfMeshGroupExporter::process_meshes(registry, &mut filling);
        result += registry.process(&mut CallContext::CgfContainer(filling));

        result += registry.process(&mut CallContext::CgfContainer(CgfContainerContext::new(
            context,
            &mut content,
            Phase::Finalizing,
        )));

        if result.result() == ProcessingResult::Failure {
            warn!("Not writing '{}', the export of the group failed", content.filename().display());
            return ProcessingResult::Failure;
        }
        if content.node_count() == 0 {
            warn!("Mesh group '{}' has no exportable nodes", context.group_name);
            return result.result();
        }

        if !self.writer.write_cgf(&content) {
            return ProcessingResult::Failure;
        }
        ProcessingResult::Success
    }

    /// Proxies selected by a physics rule, then the render meshes of the group.
    fn process_meshes(registry: &CallProcessorRegistry, context: &mut CgfContainerContext<'_>) -> ProcessingResult {
        let graph = context.scene.graph();
        let group = context.group;

        let mut result = ProcessingResultCombiner::new();
        if let Some(physics_rule) = group.rules.find_rule::<PhysicsRule>() {
            let proxy_targets =
                SceneGraphSelector::generate_target_nodes(graph, &physics_rule.node_selection, SceneGraphSelector::is_mesh);
            result += CgfMeshGroupExporter::process_mesh_type(
                registry,
                context,
                &proxy_targets,
                PhysicalizeType::DefaultProxy,
            );
        }

        let targets = SceneGraphSelector::generate_target_nodes(graph, &group.node_selection, SceneGraphSelector::is_mesh);
        result += CgfMeshGroupExporter::process_mesh_type(registry, context, &targets, PhysicalizeType::None);
        result.result()
    }

    fn process_mesh_type(
        registry: &CallProcessorRegistry,
        context: &mut CgfContainerContext<'_>,
        targets: &[String],
        physicalize_type: PhysicalizeType,
    ) -> ProcessingResult {
        let graph = context.scene.graph();
        let is_proxy = physicalize_type == PhysicalizeType::DefaultProxy;

        let mut result = ProcessingResultCombiner::new();
        for node_name in targets {
            let Some(node_index) = graph.find(node_name) else {
                continue;
            };

            let mut node = NodeCgf::default();
            node.set_name(node_name);
            if is_proxy {
                node.physics_proxy = true;
                context.container.export_info.have_physics_proxy = true;
            }

            for phase in Phase::ALL {
                let node_context =
                    CgfNodeContext::new(context, &mut node, node_name, node_index, physicalize_type, phase);
                result += registry.process(&mut CallContext::CgfNode(node_context));
            }

            debug!("Adding node '{}' ({:?})", node.name, physicalize_type);
            context.container.add_node(node);
        }
        result.result()
    }
}

impl CallProcessor for CgfMeshGroupExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfMeshGroup(context) if context.phase == Phase::Filling => {
                self.export_group(registry, context)
            }
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfMeshGroupExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::CgfMeshGroup, PhaseMask::FILLING)]
    }
}
