use cgf_files::cgf::types::{MaterialCgf, MeshSubset, NodeType, PhysicalizeType};
use log::{debug, error, warn};
use mtl_parser::MTL_EXTENSION;
use mtl_parser::group::MaterialGroup;
use mtl_parser::material::PHYSICS_NO_DRAW_NAME;

use crate::events::contexts::{CallContext, CgfContainerContext, CgfMeshNodeContext, ContextKind};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::ProcessingResult;
use crate::exporters::create_output_filename;
use crate::scene::content::ContentKind;
use crate::scene::graph::SceneGraph;
use crate::scene::views::of_kind;

/// Maps the material ids of exported meshes onto the `.mtl` file of their group and mirrors
/// that file as sub-materials of the container's common material.
#[derive(Debug, Default)]
pub struct CgfMaterialExporter {
    material_group: MaterialGroup,
}

impl CgfMaterialExporter {
    pub fn new() -> CgfMaterialExporter {
        CgfMaterialExporter {
            material_group: MaterialGroup::new(),
        }
    }

    fn setup_common_material(&mut self, context: &mut CgfContainerContext<'_>) -> ProcessingResult {
        let Some(filename) =
            create_output_filename(context.group_name, context.scene.source_directory(), MTL_EXTENSION)
        else {
            error!("Unable to find the material file of an unnamed group");
            return ProcessingResult::Failure;
        };

        let material_group = if filename.exists() {
            match MaterialGroup::read_file(&filename) {
                Ok(group) => group,
                Err(err) => {
                    error!("Unable to read material file {}: {:?}", filename.display(), err);
                    return ProcessingResult::Failure;
                }
            }
        } else {
            warn!(
                "No material file {}, meshes keep their source material ids",
                filename.display()
            );
            MaterialGroup::new()
        };
        debug!("Using {} materials for '{}'", material_group.material_count(), context.group_name);
        self.material_group = material_group;

        if context.container.common_material.is_none() {
            context.container.common_material = Some(MaterialCgf::new(context.group_name, PhysicalizeType::None));
        }
        ProcessingResult::Success
    }

    /// Material group index per source material id of the mesh node. Ids without a match keep
    /// their value.
    fn build_relocation_table(&self, graph: &SceneGraph, context: &CgfMeshNodeContext<'_>) -> Vec<Option<usize>> {
        let materials = &self.material_group;
        if context.physicalize_type == PhysicalizeType::DefaultProxy {
            return vec![materials.find_material_index(PHYSICS_NO_DRAW_NAME)];
        }

        of_kind(graph, graph.children(context.node_index), ContentKind::Material)
            .filter_map(|index| graph.get_node_name(index))
            .map(|name| materials.find_material_index(SceneGraph::get_short_name(name)))
            .collect()
    }

    fn patch_materials(&self, context: &mut CgfMeshNodeContext<'_>) -> ProcessingResult {
        let graph = context.scene.graph();
        let table = self.build_relocation_table(graph, context);
        if table.is_empty() {
            // nothing assigned, subsets stay as they are
            return ProcessingResult::Success;
        }

        let relocate = |id: usize| table.get(id).copied().flatten().unwrap_or(id);
        if context.container.export_info.merge_all_nodes {
            // merged nodes share the subsets of the first mesh, so the faces point straight
            // at the material index
            for face in context.mesh.faces.iter_mut() {
                face.subset = relocate(face.subset as usize) as u32;
            }
        } else {
            for subset in context.mesh.subsets.iter_mut() {
                subset.mat_id = relocate(subset.mat_id as usize) as i32;
            }
        }
        ProcessingResult::Success
    }

    /// Merged containers take their subset layout from the first render mesh, which therefore
    /// gets one subset per material.
    fn patch_submeshes(&self, context: &mut CgfContainerContext<'_>) {
        if !context.container.export_info.merge_all_nodes {
            return;
        }

        let material_count = self.material_group.material_count();
        let first_mesh = context
            .container
            .nodes
            .iter_mut()
            .filter(|node| !node.physics_proxy && node.node_type == NodeType::Mesh)
            .find_map(|node| node.mesh.as_mut());

        if let Some(mesh) = first_mesh {
            for mat_id in mesh.subset_count()..material_count {
                mesh.subsets.push(MeshSubset {
                    mat_id: mat_id as i32,
                    physicalize_type: PhysicalizeType::Default,
                });
            }
        }
    }

    fn create_sub_materials(&self, context: &mut CgfContainerContext<'_>) {
        let Some(common_material) = context.container.common_material.as_mut() else {
            error!("Container of '{}' lost its common material", context.group_name);
            return;
        };

        common_material.sub_materials = self
            .material_group
            .materials()
            .iter()
            .map(|material| {
                let physicalize_type = match material.is_physical_material() {
                    true => PhysicalizeType::DefaultProxy,
                    false => PhysicalizeType::None,
                };
                Some(MaterialCgf::new(material.name(), physicalize_type))
            })
            .collect();
    }
}

impl CallProcessor for CgfMaterialExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfMeshGroup(context) => match context.phase {
                Phase::Construction => ProcessingResult::Success,
                Phase::Finalizing => {
                    self.material_group = MaterialGroup::new();
                    ProcessingResult::Success
                }
                Phase::Filling => ProcessingResult::Ignored,
            },
            CallContext::CgfContainer(context) => match context.phase {
                Phase::Construction => self.setup_common_material(context),
                Phase::Finalizing => {
                    self.patch_submeshes(context);
                    self.create_sub_materials(context);
                    ProcessingResult::Success
                }
                Phase::Filling => ProcessingResult::Ignored,
            },
            CallContext::CgfNode(context) => {
                context.node.has_common_material = true;
                ProcessingResult::Success
            }
            CallContext::CgfMeshNode(context) => self.patch_materials(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfMaterialExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![
            (ContextKind::CgfMeshGroup, PhaseMask::CONSTRUCTION | PhaseMask::FINALIZING),
            (ContextKind::CgfContainer, PhaseMask::CONSTRUCTION | PhaseMask::FINALIZING),
            (ContextKind::CgfNode, PhaseMask::FILLING),
            (ContextKind::CgfMeshNode, PhaseMask::FILLING),
        ]
    }
}
