use cgf_files::cgf::types::{Mesh, MeshFace, MeshSubset, NodeType, PhysicalizeType};
use glam::Vec3;
use log::{debug, info};

use crate::events::contexts::{CallContext, CgfMeshNodeContext, CgfNodeContext, ContextKind};
use crate::events::phase::{Phase, PhaseMask};
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::scene::content::MeshData;

/// Used for every vertex when the source mesh has no normals.
pub const DEFAULT_NORMAL: Vec3 = Vec3::X;

/// Converts the mesh content of a node into chunk file geometry and lets the mesh node
/// processors add streams and patch materials on top.
#[derive(Debug, Default)]
pub struct CgfMeshExporter {}

impl CgfMeshExporter {
    pub fn new() -> CgfMeshExporter {
        CgfMeshExporter {}
    }

    fn export_mesh(registry: &CallProcessorRegistry, context: &mut CgfNodeContext<'_>) -> ProcessingResult {
        let graph = context.scene.graph();
        let Some(mesh_data) = graph
            .get_node_content(context.node_index)
            .and_then(|content| content.as_mesh())
        else {
            return ProcessingResult::Ignored;
        };

        let mut result = ProcessingResultCombiner::new();
        let mut mesh = Mesh::default();

        result += registry.process(&mut CallContext::CgfMeshNode(CgfMeshNodeContext::new(
            context,
            &mut mesh,
            Phase::Construction,
        )));

        CgfMeshExporter::set_mesh_faces(mesh_data, &mut mesh, context.physicalize_type);
        CgfMeshExporter::set_mesh_vertices(mesh_data, &mut mesh);
        CgfMeshExporter::set_mesh_normals(mesh_data, &mut mesh);

        result += registry.process(&mut CallContext::CgfMeshNode(CgfMeshNodeContext::new(
            context,
            &mut mesh,
            Phase::Filling,
        )));

        context.container.export_info.no_mesh = false;

        result += registry.process(&mut CallContext::CgfMeshNode(CgfMeshNodeContext::new(
            context,
            &mut mesh,
            Phase::Finalizing,
        )));

        context.node.node_type = NodeType::Mesh;
        context.node.mesh = Some(mesh);

        // the node carries a mesh, even if no stream processor had anything to add
        match result.result() {
            ProcessingResult::Failure => ProcessingResult::Failure,
            _ => ProcessingResult::Success,
        }
    }

    /// Proxies collapse into a single subset, render meshes get one subset per material id.
    pub fn set_mesh_faces(mesh_data: &MeshData, mesh: &mut Mesh, physicalize_type: PhysicalizeType) {
        let face_count = mesh_data.face_count();
        if face_count == 0 {
            info!("No mesh faces specified");
            return;
        }

        let is_proxy = matches!(
            physicalize_type,
            PhysicalizeType::DefaultProxy | PhysicalizeType::Obstruct
        );
        if is_proxy {
            mesh.subsets.push(MeshSubset {
                mat_id: 0,
                physicalize_type,
            });
        }

        mesh.set_face_count(face_count);
        for (index, face) in mesh_data.faces().iter().enumerate() {
            let subset = if is_proxy {
                0
            } else {
                let material_id = mesh_data.face_material_id(index).unwrap_or_default();
                while mesh.subsets.len() <= material_id as usize {
                    let mat_id = mesh.subsets.len() as i32;
                    mesh.subsets.push(MeshSubset {
                        mat_id,
                        physicalize_type: PhysicalizeType::Default,
                    });
                }
                material_id
            };

            mesh.faces[index] = MeshFace {
                v: face.vertex_index,
                subset,
            };
        }
    }

    pub fn set_mesh_vertices(mesh_data: &MeshData, mesh: &mut Mesh) {
        mesh.set_vertex_count(mesh_data.vertex_count());
        mesh.positions.copy_from_slice(mesh_data.positions());
    }

    pub fn set_mesh_normals(mesh_data: &MeshData, mesh: &mut Mesh) {
        if !mesh_data.has_normal_data() {
            debug!("No mesh normals, using the default normal for all vertices");
        }

        for (index, normal) in mesh.normals.iter_mut().enumerate() {
            *normal = mesh_data.normal(index).unwrap_or(DEFAULT_NORMAL);
        }
    }
}

impl CallProcessor for CgfMeshExporter {
    fn process(&mut self, registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::CgfNode(context) => CgfMeshExporter::export_mesh(registry, context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for CgfMeshExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::CgfNode, PhaseMask::FILLING)]
    }
}
