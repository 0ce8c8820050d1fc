use cgf_files::cgf::types::ContentCgf;
use log::{debug, error};

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, ContextKind, SkeletonContext, SkinGroupContext};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::cgf::mesh_group::configure_content;
use crate::exporters::prepare_output_file;
use crate::exporters::skin::SKIN_EXTENSION;
use crate::scene::content::ContentKind;
use crate::scene::graph::SceneGraph;
use crate::scene::views::{Traversal, of_kind};

pub struct SkinGroupExporter {
    writer: SharedAssetWriter,
}

/// The first root bone of the graph, breadth first.
pub fn detect_root_bone_name(graph: &SceneGraph) -> Option<&str> {
    let nodes = graph.downwards(graph.get_root(), Traversal::BreadthFirst);
    of_kind(graph, nodes, ContentKind::RootBone)
        .next()
        .and_then(|index| graph.get_node_name(index))
}

impl SkinGroupExporter {
    pub fn new(writer: SharedAssetWriter) -> SkinGroupExporter {
        SkinGroupExporter { writer }
    }

    fn export_group(&self, registry: &CallProcessorRegistry, context: &SkinGroupContext<'_>) -> ProcessingResult {
        let Some(filename) = prepare_output_file(context.group_name, context.output_directory, SKIN_EXTENSION) else {
            error!(
                "Unable to write SKIN file for group '{}'. Filename is empty or target folder does not exist",
                context.group_name
            );
            return ProcessingResult::Failure;
        };

        let Some(root_bone_name) = detect_root_bone_name(context.scene.graph()) else {
            error!("Skin group '{}' needs a skeleton, but the scene has no root bone", context.group_name);
            return ProcessingResult::Failure;
        };
        debug!("Skin group '{}' uses root bone '{}'", context.group_name, root_bone_name);

        let mut content = ContentCgf::new(filename);
        configure_content(&mut content);

        let mut result = ProcessingResultCombiner::new();
        for phase in Phase::ALL {
            result += registry.process(&mut CallContext::Skeleton(SkeletonContext {
                scene: context.scene,
                root_bone_name,
                skinning_info: &mut content.skinning_info,
                phase,
            }));
        }

        if result.result() == ProcessingResult::Failure {
            error!("Skeleton of skin group '{}' could not be built, nothing written", context.group_name);
            return ProcessingResult::Failure;
        }

        if !self.writer.write_skin(&content) {
            result += ProcessingResult::Failure;
        }
        result.result()
    }
}

impl CallProcessor for SkinGroupExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::SkinGroup(context) => self.export_group(registry, context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for SkinGroupExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::SkinGroup, PhaseMask::FILLING)]
    }
}
