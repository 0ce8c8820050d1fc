//! Skin export. Every skin group of the manifest becomes a `.skin` carrying the skeleton its
//! meshes are bound to.

use log::debug;

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, ContextKind, SkinGroupContext};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::chr::skeleton::ChrSkeletonExporter;

pub mod skin_group;

use skin_group::SkinGroupExporter;

pub const SKIN_EXTENSION: &str = "skin";

pub struct SkinExporter {
    writer: SharedAssetWriter,
}

impl SkinExporter {
    pub fn new(writer: SharedAssetWriter) -> SkinExporter {
        SkinExporter { writer }
    }
}

impl CallProcessor for SkinExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        let CallContext::Export(context) = context else {
            return ProcessingResult::Ignored;
        };

        let _registrations = [
            SkinGroupExporter::new(self.writer.clone()).bind(registry),
            ChrSkeletonExporter::new().bind(registry),
        ];

        let skin_groups = context
            .scene
            .manifest()
            .iter()
            .filter_map(|(name, object)| Some((name, object.as_skin_group()?)));

        let mut result = ProcessingResultCombiner::new();
        for (group_name, group) in skin_groups {
            debug!("Exporting skin group '{}'", group_name);
            for phase in Phase::ALL {
                result += registry.process(&mut CallContext::SkinGroup(SkinGroupContext {
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

impl CallProcessorBinder for SkinExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::Export, PhaseMask::all())]
    }
}
