use log::info;

use crate::events::contexts::{CallContext, ContextKind, PostExportContext};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;

/// Lists the assets an export produced.
#[derive(Debug, Default)]
pub struct ExportSummaryReporter {}

impl ExportSummaryReporter {
    pub fn new() -> ExportSummaryReporter {
        ExportSummaryReporter {}
    }

    fn report(context: &PostExportContext<'_>) -> ProcessingResult {
        if context.written_files.is_empty() {
            info!("Scene '{}' produced no assets", context.scene.name());
            return ProcessingResult::Ignored;
        }

        info!(
            "Scene '{}' produced {} assets in {}",
            context.scene.name(),
            context.written_files.len(),
            context.output_directory.display()
        );
        for file in context.written_files {
            info!("  {}", file.display());
        }
        ProcessingResult::Success
    }
}

impl CallProcessor for ExportSummaryReporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::PostExport(context) => ExportSummaryReporter::report(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for ExportSummaryReporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::PostExport, PhaseMask::all())]
    }
}
