//! Skeleton export. Every skeleton group of the manifest becomes a `.chr` holding the bone
//! hierarchy below its selected root bone.

use log::debug;

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, ChrSkeletonGroupContext, ContextKind};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};

pub mod skeleton;
pub mod skeleton_group;

use skeleton::ChrSkeletonExporter;
use skeleton_group::ChrSkeletonGroupExporter;

pub const CHR_EXTENSION: &str = "chr";

pub struct ChrExporter {
    writer: SharedAssetWriter,
}

impl ChrExporter {
    pub fn new(writer: SharedAssetWriter) -> ChrExporter {
        ChrExporter { writer }
    }
}

impl CallProcessor for ChrExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        let CallContext::Export(context) = context else {
            return ProcessingResult::Ignored;
        };

        let _registrations = [
            ChrSkeletonGroupExporter::new(self.writer.clone()).bind(registry),
            ChrSkeletonExporter::new().bind(registry),
        ];

        let skeleton_groups = context
            .scene
            .manifest()
            .iter()
            .filter_map(|(name, object)| Some((name, object.as_skeleton_group()?)));

        let mut result = ProcessingResultCombiner::new();
        for (group_name, group) in skeleton_groups {
            debug!("Exporting skeleton group '{}'", group_name);
            for phase in Phase::ALL {
                result += registry.process(&mut CallContext::ChrSkeletonGroup(ChrSkeletonGroupContext {
                    scene: context.scene,
                    output_directory: context.output_directory,
                    group_name,
                    group,
                    phase,
                }));
            }
        }
        result.result()
    }
}

impl CallProcessorBinder for ChrExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::Export, PhaseMask::all())]
    }
}
