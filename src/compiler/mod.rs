//! Drives one scene source through import, manifest resolution and the export pipeline.

use std::path::Path;
use std::rc::Rc;

use log::{error, warn};

use crate::compiler::asset_writer::{RecordingAssetWriter, SharedAssetWriter};
use crate::compiler::import_request::AssetImportRequest;
use crate::compiler::meta_info::ManifestMetaInfoProvider;
use crate::events::contexts::{CallContext, ExportContext, PostExportContext, PreExportContext};
use crate::events::registry::{CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::cgf::CgfExporter;
use crate::exporters::chr::ChrExporter;
use crate::exporters::mtl::MtlMaterialExporter;
use crate::exporters::skin::SkinExporter;
use crate::exporters::summary::ExportSummaryReporter;
use crate::scene::Scene;

pub mod asset_writer;
pub mod import_request;
pub mod meta_info;

#[cfg(test)]
mod tests;

pub struct SceneCompiler {
    writer: SharedAssetWriter,
    meta_info: Box<dyn ManifestMetaInfoProvider>,
}

impl SceneCompiler {
    pub fn new(writer: SharedAssetWriter, meta_info: Box<dyn ManifestMetaInfoProvider>) -> SceneCompiler {
        SceneCompiler { writer, meta_info }
    }

    pub fn meta_info(&self) -> &dyn ManifestMetaInfoProvider {
        self.meta_info.as_ref()
    }

    /// Returns false if the scene could not be loaded, has nothing to export or any export failed.
    pub fn compile(&self, source: &Path, output_directory: &Path) -> bool {
        let Some(scene) = AssetImportRequest::load_scene(source, self.meta_info()) else {
            error!("Failed to load asset {}", source.display());
            return false;
        };

        match self.export_scene(&scene, output_directory) {
            ProcessingResult::Success => true,
            ProcessingResult::Ignored => {
                warn!("Nothing found to convert and export in {}", source.display());
                true
            }
            ProcessingResult::Failure => {
                error!("Failure during conversion and exporting of {}", source.display());
                false
            }
        }
    }

    /// Runs the pre-export, export and post-export passes over an already loaded scene.
    pub fn export_scene(&self, scene: &Scene, output_directory: &Path) -> ProcessingResult {
        let recorder = Rc::new(RecordingAssetWriter::new(self.writer.clone()));
        let writer: SharedAssetWriter = recorder.clone();

        let registry = CallProcessorRegistry::new();
        let _registrations = [
            MtlMaterialExporter::new().bind(&registry),
            CgfExporter::new(writer.clone()).bind(&registry),
            ChrExporter::new(writer.clone()).bind(&registry),
            SkinExporter::new(writer).bind(&registry),
            ExportSummaryReporter::new().bind(&registry),
        ];

        let mut result = ProcessingResultCombiner::new();
        result += registry.process(&mut CallContext::PreExport(PreExportContext { scene }));
        result += registry.process(&mut CallContext::Export(ExportContext {
            scene,
            output_directory,
        }));

        let written_files = recorder.written_files();
        result += registry.process(&mut CallContext::PostExport(PostExportContext {
            scene,
            output_directory,
            written_files: &written_files,
        }));
        result.result()
    }
}
