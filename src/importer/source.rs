use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use glam::{Affine3A, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::importer::ImportError;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UpAxis {
    X,
    #[default]
    Y,
    Z,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourceSettings {
    pub up_axis: UpAxis,
    pub unit_size_in_meters: f32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            up_axis: UpAxis::Y,
            // authoring tools default to centimetres
            unit_size_in_meters: 0.01,
        }
    }
}

/// The scene description an importer reads: scene settings plus a tree of nodes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SourceScene {
    #[serde(default)]
    pub settings: SourceSettings,
    pub root: Option<SourceNode>,
}

impl SourceScene {
    pub fn from_json(json: &str) -> Result<SourceScene, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<SourceScene, ImportError> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct SourceTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for SourceTransform {
    fn default() -> Self {
        SourceTransform {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl SourceTransform {
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceNode {
    pub name: String,
    pub local_transform: SourceTransform,
    /// Pivot offset, folded into the node's local transform on import.
    pub geometric_transform: SourceTransform,
    pub mesh: Option<SourceMesh>,
    pub materials: Vec<SourceMaterial>,
    pub is_bone: bool,
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    /// Local transform including the geometric offset.
    pub fn evaluate_local_transform(&self) -> Affine3A {
        self.local_transform.to_affine() * self.geometric_transform.to_affine()
    }
}

/// Polygon soup in the layout of the usual interchange formats: polygons index control
/// points, per polygon-vertex attributes are stored in polygon order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceMesh {
    pub control_points: Vec<Vec3>,
    pub polygon_sizes: Vec<u32>,
    pub polygon_vertices: Vec<u32>,
    /// One per polygon. Empty means no material assignment.
    pub material_indices: Vec<i32>,
    /// One per polygon vertex. Empty means no normals.
    pub normals: Vec<Vec3>,
    pub uv_sets: Vec<SourceUvSet>,
    pub color_sets: Vec<SourceColorSet>,
    pub skins: Vec<SourceSkin>,
}

impl SourceMesh {
    pub fn polygon_count(&self) -> usize {
        self.polygon_sizes.len()
    }

    /// `(polygon index, first polygon vertex, polygon size)` for every polygon.
    pub fn polygons(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.polygon_sizes
            .iter()
            .enumerate()
            .scan(0usize, |start, (polygon, size)| {
                let first = *start;
                *start += *size as usize;
                Some((polygon, first, *size as usize))
            })
    }

    pub fn material_index(&self, polygon: usize) -> i32 {
        self.material_indices.get(polygon).copied().unwrap_or(-1)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceUvSet {
    pub name: String,
    /// One per polygon vertex.
    pub uvs: Vec<Vec2>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceColorSet {
    pub name: String,
    /// One RGBA color per polygon vertex.
    pub colors: Vec<Vec4>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceSkin {
    pub name: String,
    pub clusters: Vec<SourceCluster>,
}

/// The influence of one bone on a set of control points.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceCluster {
    pub bone: String,
    pub control_point_indices: Vec<u32>,
    pub weights: Vec<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceMaterial {
    pub name: String,
    pub diffuse_texture: String,
    pub specular_texture: String,
    pub bump_texture: String,
}
