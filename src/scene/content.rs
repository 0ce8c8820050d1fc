use std::collections::HashMap;

use glam::{Affine3A, Vec2, Vec3, Vec4};

/// The discriminant of [`NodeContent`], used for filtering and for registry-free type checks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Transform,
    Mesh,
    SkinWeights,
    Bone,
    RootBone,
    Material,
    UvStream,
    ColorStream,
}

/// The data a scene node can carry. Nodes without content are plain grouping nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Transform(Affine3A),
    Mesh(MeshData),
    SkinWeights(SkinWeightData),
    Bone(BoneData),
    Material(MaterialData),
    UvStream(MeshVertexUvData),
    ColorStream(MeshVertexColorData),
}

impl NodeContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            NodeContent::Transform(_) => ContentKind::Transform,
            NodeContent::Mesh(_) => ContentKind::Mesh,
            NodeContent::SkinWeights(_) => ContentKind::SkinWeights,
            NodeContent::Bone(bone) if bone.is_root => ContentKind::RootBone,
            NodeContent::Bone(_) => ContentKind::Bone,
            NodeContent::Material(_) => ContentKind::Material,
            NodeContent::UvStream(_) => ContentKind::UvStream,
            NodeContent::ColorStream(_) => ContentKind::ColorStream,
        }
    }

    /// Root bones are bones as well.
    pub fn is_kind(&self, kind: ContentKind) -> bool {
        let own = self.kind();
        own == kind || (kind == ContentKind::Bone && own == ContentKind::RootBone)
    }

    pub fn as_transform(&self) -> Option<&Affine3A> {
        match self {
            NodeContent::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&MeshData> {
        match self {
            NodeContent::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_skin_weights(&self) -> Option<&SkinWeightData> {
        match self {
            NodeContent::SkinWeights(skin) => Some(skin),
            _ => None,
        }
    }

    pub fn as_bone(&self) -> Option<&BoneData> {
        match self {
            NodeContent::Bone(bone) => Some(bone),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialData> {
        match self {
            NodeContent::Material(material) => Some(material),
            _ => None,
        }
    }

    pub fn as_uv_stream(&self) -> Option<&MeshVertexUvData> {
        match self {
            NodeContent::UvStream(uvs) => Some(uvs),
            _ => None,
        }
    }

    pub fn as_color_stream(&self) -> Option<&MeshVertexColorData> {
        match self {
            NodeContent::ColorStream(colors) => Some(colors),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub vertex_index: [u32; 3],
}

impl Face {
    pub fn new(a: u32, b: u32, c: u32) -> Face {
        Face {
            vertex_index: [a, b, c],
        }
    }
}

/// Triangulated geometry. Vertices are unshared per polygon corner; `control_points` maps each
/// vertex back to the source control point it was generated from.
#[derive(Clone, PartialEq, Default)]
pub struct MeshData {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    face_material_ids: Vec<u32>,
    control_points: Vec<usize>,
    skinned: bool,
}

impl std::fmt::Debug for MeshData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshData")
            .field("positions (len)", &self.positions.len())
            .field("normals (len)", &self.normals.len())
            .field("faces (len)", &self.faces.len())
            .field("skinned", &self.skinned)
            .finish()
    }
}

impl MeshData {
    pub fn new() -> MeshData {
        MeshData::default()
    }

    pub fn add_position(&mut self, position: Vec3) {
        self.positions.push(position);
    }

    pub fn add_normal(&mut self, normal: Vec3) {
        self.normals.push(normal);
    }

    pub fn add_face(&mut self, face: Face, material_id: u32) {
        self.faces.push(face);
        self.face_material_ids.push(material_id);
    }

    pub fn set_vertex_index_to_control_point_index_map(&mut self, vertex_index: usize, control_point: usize) {
        if self.control_points.len() <= vertex_index {
            self.control_points.resize(vertex_index + 1, 0);
        }
        self.control_points[vertex_index] = control_point;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn has_normal_data(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn normal(&self, index: usize) -> Option<Vec3> {
        self.normals.get(index).copied()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, index: usize) -> Option<Face> {
        self.faces.get(index).copied()
    }

    pub fn face_material_id(&self, index: usize) -> Option<u32> {
        self.face_material_ids.get(index).copied()
    }

    pub fn control_point_index(&self, vertex_index: usize) -> Option<usize> {
        self.control_points.get(vertex_index).copied()
    }

    pub fn is_skinned(&self) -> bool {
        self.skinned
    }

    pub fn set_skinned(&mut self, skinned: bool) {
        self.skinned = skinned;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Link {
    pub bone_id: usize,
    pub weight: f32,
}

/// Per vertex bone influences. Bone ids are dense and assigned in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinWeightData {
    links: Vec<Vec<Link>>,
    bone_names: Vec<String>,
    bone_ids: HashMap<String, usize>,
}

impl SkinWeightData {
    pub fn new() -> SkinWeightData {
        SkinWeightData::default()
    }

    pub fn resize_container_space(&mut self, vertex_count: usize) {
        self.links.resize_with(vertex_count, Vec::new);
    }

    pub fn append_link(&mut self, vertex_index: usize, link: Link) {
        if self.links.len() <= vertex_index {
            self.resize_container_space(vertex_index + 1);
        }
        self.links[vertex_index].push(link);
    }

    pub fn bone_id(&mut self, bone_name: &str) -> usize {
        if let Some(id) = self.bone_ids.get(bone_name) {
            return *id;
        }

        let id = self.bone_names.len();
        self.bone_names.push(bone_name.to_string());
        self.bone_ids.insert(bone_name.to_string(), id);
        id
    }

    pub fn find_bone_id(&self, bone_name: &str) -> Option<usize> {
        self.bone_ids.get(bone_name).copied()
    }

    pub fn bone_name(&self, bone_id: usize) -> Option<&str> {
        self.bone_names.get(bone_id).map(String::as_str)
    }

    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.links.len()
    }

    pub fn link_count(&self, vertex_index: usize) -> usize {
        self.links.get(vertex_index).map_or(0, Vec::len)
    }

    pub fn link(&self, vertex_index: usize, link_index: usize) -> Option<Link> {
        self.links.get(vertex_index)?.get(link_index).copied()
    }

    pub fn links(&self, vertex_index: usize) -> &[Link] {
        self.links.get(vertex_index).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoneData {
    pub world_transform: Affine3A,
    /// No ancestor in the source hierarchy is a bone.
    pub is_root: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureMap {
    Diffuse,
    Specular,
    Bump,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialData {
    diffuse_texture: String,
    specular_texture: String,
    bump_texture: String,
    no_draw: bool,
}

impl MaterialData {
    pub fn new() -> MaterialData {
        MaterialData::default()
    }

    pub fn texture(&self, map: TextureMap) -> &str {
        match map {
            TextureMap::Diffuse => &self.diffuse_texture,
            TextureMap::Specular => &self.specular_texture,
            TextureMap::Bump => &self.bump_texture,
        }
    }

    pub fn set_texture(&mut self, map: TextureMap, file: &str) {
        let slot = match map {
            TextureMap::Diffuse => &mut self.diffuse_texture,
            TextureMap::Specular => &mut self.specular_texture,
            TextureMap::Bump => &mut self.bump_texture,
        };
        *slot = file.to_string();
    }

    pub fn is_no_draw(&self) -> bool {
        self.no_draw
    }

    pub fn set_no_draw(&mut self, no_draw: bool) {
        self.no_draw = no_draw;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshVertexUvData {
    pub uvs: Vec<Vec2>,
    pub custom_name: String,
}

impl MeshVertexUvData {
    pub fn count(&self) -> usize {
        self.uvs.len()
    }
}

/// Linear RGBA colors, one per mesh vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshVertexColorData {
    pub colors: Vec<Vec4>,
    pub custom_name: String,
}

impl MeshVertexColorData {
    pub fn count(&self) -> usize {
        self.colors.len()
    }
}
