use crate::events::contexts::{CallContext, CgfContainerContext, ContextKind};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;
use crate::scene::manifest::rules::MeshAdvancedRule;

/// Applies the mesh advanced rule of a group to its container's export info.
#[derive(Debug, Default)]
pub struct CgfContainerSettingsExporter {}

impl CgfContainerSettingsExporter {
    pub fn new() -> CgfContainerSettingsExporter {
        CgfContainerSettingsExporter {}
    }

    fn apply(context: &mut CgfContainerContext<'_>) -> ProcessingResult {
        let Some(rule) = context.group.rules.find_rule::<MeshAdvancedRule>() else {
            return ProcessingResult::Ignored;
        };

        let info = &mut context.container.export_info;
        info.want_f32_vertices = rule.use_32bit_vertices;
        info.merge_all_nodes = rule.merge_meshes;
        ProcessingResult::Success
    }
}

impl CallProcessor for CgfContainerSettingsExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfContainer(context) => CgfContainerSettingsExporter::apply(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfContainerSettingsExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::CgfContainer, PhaseMask::CONSTRUCTION)]
    }
}
