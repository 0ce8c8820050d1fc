use log::{error, warn};

use crate::importer::scene_system::SceneSystem;
use crate::importer::source::{SourceColorSet, SourceMesh, SourceUvSet};
use crate::scene::content::{Face, MeshData, MeshVertexColorData, MeshVertexUvData, NodeContent};
use crate::scene::graph::{NodeIndex, SceneGraph};

pub struct MeshBuilder {}

impl MeshBuilder {
    /// Sets the triangulated mesh as content of `target` and appends its color and uv streams
    /// as end point children. Returns false if the source holds no usable geometry.
    pub fn build_mesh(
        graph: &mut SceneGraph,
        target: NodeIndex,
        source: &SourceMesh,
        system: &SceneSystem,
        skinned: bool,
    ) -> bool {
        let Some(mut mesh) = MeshBuilder::create_mesh_data(source, system) else {
            return false;
        };
        mesh.set_skinned(skinned);

        let vertex_count = mesh.vertex_count();
        graph.set_content(target, NodeContent::Mesh(mesh));
        MeshBuilder::add_color_streams(graph, target, source, vertex_count);
        MeshBuilder::add_uv_streams(graph, target, source, vertex_count);
        true
    }

    /// Polygons with less than three vertices are skipped, the others are fan triangulated.
    /// Every polygon corner becomes its own vertex.
    pub fn create_mesh_data(source: &SourceMesh, system: &SceneSystem) -> Option<MeshData> {
        let (min_material, max_material) = MeshBuilder::material_range(source)?;

        let polygon_vertex_count = source.polygon_vertices.len();
        let use_normals = source.normals.len() == polygon_vertex_count;
        if !source.normals.is_empty() && !use_normals {
            warn!(
                "Normal count ({}) doesn't match the polygon vertex count ({}), normals ignored",
                source.normals.len(),
                polygon_vertex_count
            );
        }

        let mut mesh = MeshData::new();
        for (polygon, first, size) in MeshBuilder::valid_polygons(source) {
            if first + size > polygon_vertex_count {
                error!("Polygon {} exceeds the polygon vertex list", polygon);
                return None;
            }

            let mut material = source.material_index(polygon);
            if material < min_material || material > max_material {
                material = max_material;
            }

            let first_vertex = mesh.vertex_count() as u32;
            for corner in 0..size {
                let control_point = source.polygon_vertices[first + corner] as usize;
                let Some(position) = source.control_points.get(control_point) else {
                    error!("Polygon {} references missing control point {}", polygon, control_point);
                    return None;
                };

                let vertex = mesh.vertex_count() as u32;
                mesh.add_position(system.convert_unit(system.swap_vec3_for_up_axis(*position)));
                if use_normals {
                    let normal = system.swap_vec3_for_up_axis(source.normals[first + corner]);
                    mesh.add_normal(normal.normalize_or_zero());
                }
                mesh.set_vertex_index_to_control_point_index_map(vertex as usize, control_point);

                if corner == 2 {
                    mesh.add_face(Face::new(first_vertex, first_vertex + 1, vertex), material as u32);
                } else if corner > 2 {
                    mesh.add_face(Face::new(vertex, first_vertex, vertex - 1), material as u32);
                }
            }
        }

        if mesh.vertex_count() == 0 || mesh.face_count() == 0 {
            error!("Missing geometry data in mesh node");
            return None;
        }
        Some(mesh)
    }

    fn valid_polygons(source: &SourceMesh) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        source.polygons().filter(|(_, _, size)| *size > 2)
    }

    /// The material id range faces are clamped to. Negative ids get an extra id past the end,
    /// if all are negative everything ends up at 0.
    fn material_range(source: &SourceMesh) -> Option<(i32, i32)> {
        let (min, max) = MeshBuilder::valid_polygons(source)
            .map(|(polygon, _, _)| source.material_index(polygon))
            .fold(None, |range: Option<(i32, i32)>, material| match range {
                Some((min, max)) => Some((min.min(material), max.max(material))),
                None => Some((material, material)),
            })?;

        Some(if max < 0 {
            (0, 0)
        } else if min < 0 {
            (0, max.saturating_add(1))
        } else {
            (min, max)
        })
    }

    fn add_color_streams(graph: &mut SceneGraph, target: NodeIndex, source: &SourceMesh, vertex_count: usize) {
        for (index, set) in source.color_sets.iter().enumerate() {
            let Some(colors) = MeshBuilder::create_color_data(source, set, vertex_count) else {
                continue;
            };

            let name = if SceneGraph::is_valid_name(&set.name) {
                set.name.clone()
            } else {
                format!("colorStream_{}", index)
            };
            if let Some(node) = graph.add_child(target, &name, Some(NodeContent::ColorStream(colors))) {
                graph.make_end_point(node);
            }
        }
    }

    fn add_uv_streams(graph: &mut SceneGraph, target: NodeIndex, source: &SourceMesh, vertex_count: usize) {
        for set in &source.uv_sets {
            if !SceneGraph::is_valid_name(&set.name) {
                warn!("Invalid name '{}' for uv set, set ignored.", set.name);
                continue;
            }

            let Some(uvs) = MeshBuilder::create_uv_data(source, set, vertex_count) else {
                continue;
            };
            if let Some(node) = graph.add_child(target, &set.name, Some(NodeContent::UvStream(uvs))) {
                graph.make_end_point(node);
            }
        }
    }

    fn polygon_vertex_indices(source: &SourceMesh) -> impl Iterator<Item = usize> + '_ {
        MeshBuilder::valid_polygons(source).flat_map(|(_, first, size)| first..first + size)
    }

    /// V is flipped, the target expects the origin in the top left corner.
    pub fn create_uv_data(source: &SourceMesh, set: &SourceUvSet, vertex_count: usize) -> Option<MeshVertexUvData> {
        let uvs = MeshBuilder::polygon_vertex_indices(source)
            .filter_map(|index| set.uvs.get(index))
            .map(|uv| glam::Vec2::new(uv.x, 1.0 - uv.y))
            .collect::<Vec<_>>();

        if uvs.len() != vertex_count {
            error!(
                "Vertex count ({}) doesn't match the number of entries for the uv set {} ({})",
                vertex_count,
                set.name,
                uvs.len()
            );
            return None;
        }

        Some(MeshVertexUvData {
            uvs,
            custom_name: set.name.clone(),
        })
    }

    pub fn create_color_data(
        source: &SourceMesh,
        set: &SourceColorSet,
        vertex_count: usize,
    ) -> Option<MeshVertexColorData> {
        let colors = MeshBuilder::polygon_vertex_indices(source)
            .filter_map(|index| set.colors.get(index).copied())
            .collect::<Vec<_>>();

        if colors.len() != vertex_count {
            error!(
                "Vertex count ({}) doesn't match the number of entries for the vertex color stream {} ({})",
                vertex_count,
                set.name,
                colors.len()
            );
            return None;
        }

        Some(MeshVertexColorData {
            colors,
            custom_name: set.name.clone(),
        })
    }
}
