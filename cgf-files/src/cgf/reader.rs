use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec2, Vec3};
use log::trace;

use crate::ChunkFileError;
use crate::cgf::types::{
    CHUNK_FILE_VERSION, ChunkFileHeader, ExportFlagsChunk, ExportInfo, FOURCC_EXPORT_FLAGS, FOURCC_HEADER,
    FOURCC_MATERIALS, FOURCC_MESH, FOURCC_NODE, FileType, MaterialCgf, Mesh, MeshColor, MeshFace, MeshSubset,
    MeshSubsetRecord, NodeRecord, NodeType, PhysicalizeType,
};
use crate::common::reader::{get_optional_chunk_by_name, read_chunk_array, read_counted, read_string};
use crate::common::types::{IffChunk, Matrix34, magic_to_string};
use crate::skeleton::types::{BoneEntity, FOURCC_BONE_ENTITIES, FOURCC_BONE_INITIAL_MATRICES, FOURCC_BONE_NAMES};

/// A parsed chunk file: the header's file type plus every chunk in file order.
#[derive(Debug, Clone)]
pub struct ChunkFileAsset {
    pub file_type: FileType,
    pub chunks: Vec<IffChunk>,
}

impl ChunkFileAsset {
    pub fn has_chunk(&self, magic: u32) -> bool {
        self.chunks.iter().any(|chunk| chunk.magic == magic)
    }

    pub fn chunk_count(&self, magic: u32) -> usize {
        self.chunks.iter().filter(|chunk| chunk.magic == magic).count()
    }

    fn chunks_by_magic(&self, magic: u32) -> impl Iterator<Item = &IffChunk> {
        self.chunks.iter().filter(move |chunk| chunk.magic == magic)
    }

    pub fn export_info(&self) -> Result<Option<ExportInfo>, ChunkFileError> {
        let chunk =
            get_optional_chunk_by_name::<ExportFlagsChunk>(&self.chunks, &magic_to_string(FOURCC_EXPORT_FLAGS))?;
        Ok(chunk.as_ref().map(ExportInfo::from_chunk))
    }

    pub fn materials(&self) -> Result<Option<MaterialCgf>, ChunkFileError> {
        let Some(chunk) = self.chunks_by_magic(FOURCC_MATERIALS).next() else {
            return Ok(None);
        };

        let mut rdr = Cursor::new(&chunk.data);
        let mut material = read_material(&mut rdr)?;
        let count = rdr.read_u32::<LittleEndian>()?;
        for _ in 0..count {
            let sub_material = match rdr.read_u8()? {
                0 => None,
                _ => Some(read_material(&mut rdr)?),
            };
            material.sub_materials.push(sub_material);
        }
        Ok(Some(material))
    }

    pub fn nodes(&self) -> Result<Vec<NodeRecord>, ChunkFileError> {
        self.chunks_by_magic(FOURCC_NODE)
            .map(|chunk| read_node(&mut Cursor::new(&chunk.data)))
            .collect()
    }

    pub fn meshes(&self) -> Result<Vec<Mesh>, ChunkFileError> {
        self.chunks_by_magic(FOURCC_MESH)
            .map(|chunk| read_mesh(&mut Cursor::new(&chunk.data)))
            .collect()
    }

    pub fn bone_entities(&self) -> Result<Vec<BoneEntity>, ChunkFileError> {
        match self.chunks_by_magic(FOURCC_BONE_ENTITIES).next() {
            Some(chunk) => read_counted(&mut Cursor::new(&chunk.data)),
            None => Ok(Vec::new()),
        }
    }

    pub fn bone_names(&self) -> Result<Vec<String>, ChunkFileError> {
        let Some(chunk) = self.chunks_by_magic(FOURCC_BONE_NAMES).next() else {
            return Ok(Vec::new());
        };

        let mut rdr = Cursor::new(&chunk.data);
        let count = rdr.read_u32::<LittleEndian>()?;
        (0..count).map(|_| read_string(&mut rdr)).collect()
    }

    pub fn bone_initial_matrices(&self) -> Result<Vec<Matrix34>, ChunkFileError> {
        match self.chunks_by_magic(FOURCC_BONE_INITIAL_MATRICES).next() {
            Some(chunk) => read_counted(&mut Cursor::new(&chunk.data)),
            None => Ok(Vec::new()),
        }
    }

    /// The magics of all chunks in file order, mostly useful for diagnostics.
    pub fn chunk_magics(&self) -> Vec<String> {
        self.chunks.iter().map(IffChunk::magic_str).collect()
    }
}

pub struct ChunkFileReader {}

impl ChunkFileReader {
    pub fn parse_asset<R: Read>(rdr: &mut R) -> Result<ChunkFileAsset, ChunkFileError> {
        let header_chunk = IffChunk::read_next_chunk(rdr)?;
        if header_chunk.magic != FOURCC_HEADER {
            return Err(ChunkFileError::InvalidMagicValue {
                magic: header_chunk.magic,
            });
        }

        let header: ChunkFileHeader = header_chunk.parse()?;
        if header.version != CHUNK_FILE_VERSION {
            return Err(ChunkFileError::UnsupportedVersion {
                version: header.version,
            });
        }
        let file_type = FileType::try_from(header.file_type)?;

        let mut chunks = vec![header_chunk];
        chunks.extend(read_chunk_array::<IffChunk, R>(rdr)?);
        trace!("Parsed {:?} with {} chunks", file_type, chunks.len());

        Ok(ChunkFileAsset { file_type, chunks })
    }

    pub fn parse_file(path: &Path) -> Result<ChunkFileAsset, ChunkFileError> {
        let mut rdr = BufReader::new(File::open(path)?);
        ChunkFileReader::parse_asset(&mut rdr)
    }
}

fn read_physicalize_type(value: i32) -> Result<PhysicalizeType, ChunkFileError> {
    PhysicalizeType::try_from(value).map_err(|_| ChunkFileError::FormatError {
        reason: "Unknown physicalize type",
    })
}

fn read_material<R: Read>(rdr: &mut R) -> Result<MaterialCgf, ChunkFileError> {
    let name = read_string(rdr)?;
    let physicalize_type = read_physicalize_type(rdr.read_i32::<LittleEndian>()?)?;
    Ok(MaterialCgf::new(&name, physicalize_type))
}

fn read_bool<R: Read>(rdr: &mut R) -> Result<bool, ChunkFileError> {
    Ok(rdr.read_u8()? != 0)
}

fn read_node<R: Read>(rdr: &mut R) -> Result<NodeRecord, ChunkFileError> {
    use crate::common::reader::Parseable;

    let name = read_string(rdr)?;
    let node_type = NodeType::try_from(rdr.read_u32::<LittleEndian>()?).map_err(|_| ChunkFileError::FormatError {
        reason: "Unknown node type",
    })?;

    Ok(NodeRecord {
        name,
        node_type,
        parent: rdr.read_i32::<LittleEndian>()?,
        physics_proxy: read_bool(rdr)?,
        has_common_material: read_bool(rdr)?,
        identity_matrix: read_bool(rdr)?,
        local_tm: Matrix34::parse(rdr)?,
        world_tm: Matrix34::parse(rdr)?,
        mesh_chunk: rdr.read_i32::<LittleEndian>()?,
    })
}

fn read_mesh<R: Read>(rdr: &mut R) -> Result<Mesh, ChunkFileError> {
    let positions = read_counted::<Vec3, R>(rdr)?;
    let normals = read_counted::<Vec3, R>(rdr)?;
    let texcoords = read_counted::<Vec2, R>(rdr)?;
    let colors = read_counted::<MeshColor, R>(rdr)?;
    let faces = read_counted::<MeshFace, R>(rdr)?;
    let subsets = read_counted::<MeshSubsetRecord, R>(rdr)?
        .into_iter()
        .map(|record| {
            Ok(MeshSubset {
                mat_id: record.mat_id,
                physicalize_type: read_physicalize_type(record.physicalize_type)?,
            })
        })
        .collect::<Result<Vec<_>, ChunkFileError>>()?;

    Ok(Mesh {
        positions,
        normals,
        texcoords,
        colors,
        faces,
        subsets,
    })
}
