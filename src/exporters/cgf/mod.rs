//! Geometry export. [`CgfExporter`] is bound to the export context and, for every mesh group
//! of the manifest, runs the group through the registry in all three phases. The processors
//! below each fill one aspect of the resulting container.

use log::debug;

use crate::compiler::asset_writer::SharedAssetWriter;
use crate::events::contexts::{CallContext, CgfMeshGroupContext, ContextKind};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};

pub mod color_stream;
pub mod container_settings;
pub mod material;
pub mod mesh;
pub mod mesh_group;
pub mod uv_stream;
pub mod world_matrix;

use color_stream::CgfColorStreamExporter;
use container_settings::CgfContainerSettingsExporter;
use material::CgfMaterialExporter;
use mesh::CgfMeshExporter;
use mesh_group::CgfMeshGroupExporter;
use uv_stream::CgfUvStreamExporter;
use world_matrix::CgfWorldMatrixExporter;

pub const CGF_EXTENSION: &str = "cgf";

pub struct CgfExporter {
    writer: SharedAssetWriter,
}

impl CgfExporter {
    pub fn new(writer: SharedAssetWriter) -> CgfExporter {
        CgfExporter { writer }
    }
}

impl CallProcessor for CgfExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        let CallContext::Export(context) = context else {
            return ProcessingResult::Ignored;
        };

        // registration order is processing order
        let _registrations = [
            CgfMeshGroupExporter::new(self.writer.clone()).bind(registry),
            CgfContainerSettingsExporter::new().bind(registry),
            CgfMaterialExporter::new().bind(registry),
            CgfWorldMatrixExporter::new().bind(registry),
            CgfMeshExporter::new().bind(registry),
            CgfColorStreamExporter::new().bind(registry),
            CgfUvStreamExporter::new().bind(registry),
        ];

        let mut result = ProcessingResultCombiner::new();
        for (group_name, group) in context.scene.manifest().mesh_groups() {
            debug!("Exporting mesh group '{}'", group_name);
            for phase in Phase::ALL {
                let group_context =
                    CgfMeshGroupContext::new(context.scene, context.output_directory, group_name, group, phase);
                result += registry.process(&mut CallContext::CgfMeshGroup(group_context));
            }
        }
        result.result()
    }
}

impl CallProcessorBinder for CgfExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::Export, PhaseMask::all())]
    }
}
