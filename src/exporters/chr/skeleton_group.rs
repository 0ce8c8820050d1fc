use cgf_files::cgf::types::ContentCgf;
use log::error;

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, ChrSkeletonGroupContext, ContextKind, SkeletonContext};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::cgf::mesh_group::configure_content;
use crate::exporters::chr::CHR_EXTENSION;
use crate::exporters::prepare_output_file;

pub struct ChrSkeletonGroupExporter {
    writer: SharedAssetWriter,
}

impl ChrSkeletonGroupExporter {
    pub fn new(writer: SharedAssetWriter) -> ChrSkeletonGroupExporter {
        ChrSkeletonGroupExporter { writer }
    }

    fn export_group(&self, registry: &CallProcessorRegistry, context: &ChrSkeletonGroupContext<'_>) -> ProcessingResult {
        let Some(filename) = prepare_output_file(context.group_name, context.output_directory, CHR_EXTENSION) else {
            error!(
                "Unable to write CHR file for group '{}'. Filename is empty or target folder does not exist",
                context.group_name
            );
            return ProcessingResult::Failure;
        };

        let mut content = ContentCgf::new(filename);
        configure_content(&mut content);

        let mut result = ProcessingResultCombiner::new();
        for phase in Phase::ALL {
            result += registry.process(&mut CallContext::Skeleton(SkeletonContext {
                scene: context.scene,
                root_bone_name: &context.group.selected_root_bone,
                skinning_info: &mut content.skinning_info,
                phase,
            }));
        }

        if result.result() == ProcessingResult::Failure {
            error!("Skeleton of group '{}' could not be built, nothing written", context.group_name);
            return ProcessingResult::Failure;
        }

        if !self.writer.write_chr(&content) {
            result += ProcessingResult::Failure;
        }
        result.result()
    }
}

impl CallProcessor for ChrSkeletonGroupExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::ChrSkeletonGroup(context) => self.export_group(registry, context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for ChrSkeletonGroupExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::ChrSkeletonGroup, PhaseMask::FILLING)]
    }
}
