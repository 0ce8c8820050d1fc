use std::path::{Path, PathBuf};

use bitflags::bitflags;
use cgf_files_derive_parseable::{Parse, Write};
use glam::{Affine3A, Vec2, Vec3};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::common::types::Matrix34;
use crate::skeleton::types::SkinningInfo;

pub const FOURCC_HEADER: u32 = u32::from_le_bytes(*b"CFHD");
pub const FOURCC_EXPORT_FLAGS: u32 = u32::from_le_bytes(*b"EXPF");
pub const FOURCC_MATERIALS: u32 = u32::from_le_bytes(*b"MTLS");
pub const FOURCC_NODE: u32 = u32::from_le_bytes(*b"NODE");
pub const FOURCC_MESH: u32 = u32::from_le_bytes(*b"MESH");

pub const CHUNK_FILE_VERSION: u32 = 0x746;

/// Node names are stored in 64 byte fields, including the terminator.
pub const MAX_NODE_NAME_LENGTH: usize = 64;
pub const MAX_MATERIAL_NAME_LENGTH: usize = 128;

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum FileType {
    Cgf = 0,
    Chr = 1,
    Skin = 2,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum PhysicalizeType {
    #[default]
    None = -1,
    Default = 0x1000,
    NoCollide = 0x1001,
    Obstruct = 0x1002,
    DefaultProxy = 0x10FF,
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ExportFlags: u32 {
        const MERGE_ALL_NODES = 0x0001;
        const USE_CUSTOM_NORMALS = 0x0002;
        const COMPILED_CGF = 0x0004;
        const HAVE_PHYSICS_PROXY = 0x0008;
        const HAVE_AUTO_LODS = 0x0010;
        const NO_MESH = 0x0020;
        const EIGHT_WEIGHTS_PER_VERTEX = 0x0040;
        const WANT_F32_VERTICES = 0x0080;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportInfo {
    pub merge_all_nodes: bool,
    pub use_custom_normals: bool,
    pub compiled_cgf: bool,
    pub have_physics_proxy: bool,
    pub have_auto_lods: bool,
    pub no_mesh: bool,
    pub eight_weights_per_vertex: bool,
    pub want_f32_vertices: bool,
    pub author_tool_version: u32,
}

impl ExportInfo {
    pub fn flags(&self) -> ExportFlags {
        let mut flags = ExportFlags::empty();
        flags.set(ExportFlags::MERGE_ALL_NODES, self.merge_all_nodes);
        flags.set(ExportFlags::USE_CUSTOM_NORMALS, self.use_custom_normals);
        flags.set(ExportFlags::COMPILED_CGF, self.compiled_cgf);
        flags.set(ExportFlags::HAVE_PHYSICS_PROXY, self.have_physics_proxy);
        flags.set(ExportFlags::HAVE_AUTO_LODS, self.have_auto_lods);
        flags.set(ExportFlags::NO_MESH, self.no_mesh);
        flags.set(ExportFlags::EIGHT_WEIGHTS_PER_VERTEX, self.eight_weights_per_vertex);
        flags.set(ExportFlags::WANT_F32_VERTICES, self.want_f32_vertices);
        flags
    }

    pub fn from_chunk(chunk: &ExportFlagsChunk) -> ExportInfo {
        let flags = ExportFlags::from_bits_truncate(chunk.flags);
        ExportInfo {
            merge_all_nodes: flags.contains(ExportFlags::MERGE_ALL_NODES),
            use_custom_normals: flags.contains(ExportFlags::USE_CUSTOM_NORMALS),
            compiled_cgf: flags.contains(ExportFlags::COMPILED_CGF),
            have_physics_proxy: flags.contains(ExportFlags::HAVE_PHYSICS_PROXY),
            have_auto_lods: flags.contains(ExportFlags::HAVE_AUTO_LODS),
            no_mesh: flags.contains(ExportFlags::NO_MESH),
            eight_weights_per_vertex: flags.contains(ExportFlags::EIGHT_WEIGHTS_PER_VERTEX),
            want_f32_vertices: flags.contains(ExportFlags::WANT_F32_VERTICES),
            author_tool_version: chunk.author_tool_version,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Parse, Write)]
pub struct ChunkFileHeader {
    pub file_type: u32,
    pub version: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Parse, Write)]
pub struct ExportFlagsChunk {
    pub flags: u32,
    pub author_tool_version: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCgf {
    pub name: String,
    pub physicalize_type: PhysicalizeType,
    pub sub_materials: Vec<Option<MaterialCgf>>,
}

impl MaterialCgf {
    pub fn new(name: &str, physicalize_type: PhysicalizeType) -> MaterialCgf {
        MaterialCgf {
            name: truncate_name(name, MAX_MATERIAL_NAME_LENGTH).to_string(),
            physicalize_type,
            sub_materials: Vec::new(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum NodeType {
    #[default]
    Helper = 0,
    Mesh = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Parse, Write)]
pub struct MeshFace {
    pub v: [u32; 3],
    pub subset: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct MeshSubset {
    pub mat_id: i32,
    pub physicalize_type: PhysicalizeType,
}

#[derive(Debug, Copy, Clone, PartialEq, Parse, Write)]
pub struct MeshSubsetRecord {
    pub mat_id: i32,
    pub physicalize_type: i32,
}

/// Vertex colors, stored as RGBA bytes.
pub type MeshColor = [u8; 4];

#[derive(Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    pub colors: Vec<MeshColor>,
    pub faces: Vec<MeshFace>,
    pub subsets: Vec<MeshSubset>,
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("positions (len)", &self.positions.len())
            .field("normals (len)", &self.normals.len())
            .field("texcoords (len)", &self.texcoords.len())
            .field("colors (len)", &self.colors.len())
            .field("faces (len)", &self.faces.len())
            .field("subsets", &self.subsets)
            .finish()
    }
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    pub fn set_vertex_count(&mut self, count: usize) {
        self.positions.resize(count, Vec3::ZERO);
        self.normals.resize(count, Vec3::ZERO);
    }

    pub fn set_face_count(&mut self, count: usize) {
        self.faces.resize(count, MeshFace::default());
    }

    pub fn realloc_texcoords(&mut self, count: usize) {
        self.texcoords.clear();
        self.texcoords.resize(count, Vec2::ZERO);
    }

    pub fn realloc_colors(&mut self, count: usize) {
        self.colors.clear();
        self.colors.resize(count, [0xFF; 4]);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeCgf {
    pub name: String,
    pub node_type: NodeType,
    pub parent: Option<usize>,
    pub physics_proxy: bool,
    pub has_common_material: bool,
    pub identity_matrix: bool,
    pub local_tm: Affine3A,
    pub world_tm: Affine3A,
    pub mesh: Option<Mesh>,
}

impl Default for NodeCgf {
    fn default() -> Self {
        NodeCgf {
            name: String::new(),
            node_type: NodeType::Helper,
            parent: None,
            physics_proxy: false,
            has_common_material: false,
            identity_matrix: true,
            local_tm: Affine3A::IDENTITY,
            world_tm: Affine3A::IDENTITY,
            mesh: None,
        }
    }
}

impl NodeCgf {
    pub fn set_name(&mut self, name: &str) {
        self.name = truncate_name(name, MAX_NODE_NAME_LENGTH).to_string();
    }
}

/// The on-disk form of a node; `mesh_chunk` indexes the MESH chunks in file order, -1 for none.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub node_type: NodeType,
    pub parent: i32,
    pub physics_proxy: bool,
    pub has_common_material: bool,
    pub identity_matrix: bool,
    pub local_tm: Matrix34,
    pub world_tm: Matrix34,
    pub mesh_chunk: i32,
}

/// The in-memory counterpart of a geometry chunk file, filled by the exporters.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentCgf {
    filename: PathBuf,
    pub export_info: ExportInfo,
    pub nodes: Vec<NodeCgf>,
    pub common_material: Option<MaterialCgf>,
    pub skinning_info: SkinningInfo,
}

impl ContentCgf {
    pub fn new(filename: impl Into<PathBuf>) -> ContentCgf {
        ContentCgf {
            filename: filename.into(),
            export_info: ExportInfo::default(),
            nodes: Vec::new(),
            common_material: None,
            skinning_info: SkinningInfo::default(),
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn add_node(&mut self, node: NodeCgf) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Keeps the trailing part of `name` so that it fits into a `max_len` byte field with terminator.
pub fn truncate_name(name: &str, max_len: usize) -> &str {
    if name.len() < max_len {
        return name;
    }

    let mut offset = name.len() - max_len + 1;
    while !name.is_char_boundary(offset) {
        offset += 1;
    }
    &name[offset..]
}
