use log::{debug, warn};

use crate::importer::source::{SourceMesh, SourceSkin};
use crate::scene::content::{Link, NodeContent, SkinWeightData};
use crate::scene::graph::{NodeIndex, SceneGraph};

pub struct SkinBuilder {}

impl SkinBuilder {
    /// Adds one skin weight end point below `target` per skin of the mesh. Returns true if at
    /// least one of them made it into the graph.
    pub fn build_skins(graph: &mut SceneGraph, target: NodeIndex, mesh: &SourceMesh) -> bool {
        let mut added = false;
        for (index, skin) in mesh.skins.iter().enumerate() {
            let name = if SceneGraph::is_valid_name(&skin.name) {
                skin.name.clone()
            } else {
                format!("skin_{}", index)
            };

            let weights = SkinBuilder::create_skin_weight_data(skin, mesh.control_points.len());
            let Some(node) = graph.add_child(target, &name, Some(NodeContent::SkinWeights(weights))) else {
                continue;
            };
            graph.make_end_point(node);
            added = true;
        }
        added
    }

    /// Weights are keyed by control point.
    pub fn create_skin_weight_data(skin: &SourceSkin, control_point_count: usize) -> SkinWeightData {
        let mut weights = SkinWeightData::new();
        weights.resize_container_space(control_point_count);

        for cluster in &skin.clusters {
            if cluster.control_point_indices.len() != cluster.weights.len() {
                warn!(
                    "Cluster for bone '{}' in skin '{}' has {} indices but {} weights",
                    cluster.bone,
                    skin.name,
                    cluster.control_point_indices.len(),
                    cluster.weights.len()
                );
            }

            let bone_id = weights.bone_id(&cluster.bone);
            for (control_point, weight) in cluster.control_point_indices.iter().zip(&cluster.weights) {
                let control_point = *control_point as usize;
                if control_point >= control_point_count {
                    debug!(
                        "Skipping weight for missing control point {} of bone '{}'",
                        control_point, cluster.bone
                    );
                    continue;
                }
                weights.append_link(
                    control_point,
                    Link {
                        bone_id,
                        weight: *weight,
                    },
                );
            }
        }
        weights
    }
}
