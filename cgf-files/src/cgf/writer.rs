use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, trace};

use crate::ChunkFileError;
use crate::cgf::types::{
    CHUNK_FILE_VERSION, ChunkFileHeader, ContentCgf, ExportFlagsChunk, FOURCC_EXPORT_FLAGS, FOURCC_HEADER,
    FOURCC_MATERIALS, FOURCC_MESH, FOURCC_NODE, FileType, MaterialCgf, Mesh, MeshSubsetRecord, NodeCgf,
};
use crate::common::types::Matrix34;
use crate::common::writer::{ChunkFile, Writable, write_count, write_counted, write_cstring};
use crate::skeleton::types::{
    BoneEntity, FOURCC_BONE_ENTITIES, FOURCC_BONE_INITIAL_MATRICES, FOURCC_BONE_NAMES,
};
use crate::skeleton::writer::prepare_skeleton_data_chunks;

/// Serializes parts of a `ContentCgf` into chunks of a `ChunkFile`.
pub struct CgfSaver<'a> {
    content: &'a ContentCgf,
    chunk_file: &'a mut ChunkFile,
}

impl<'a> CgfSaver<'a> {
    pub fn new(content: &'a ContentCgf, chunk_file: &'a mut ChunkFile) -> CgfSaver<'a> {
        CgfSaver { content, chunk_file }
    }

    pub fn content(&self) -> &'a ContentCgf {
        self.content
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_file.chunks.len()
    }

    pub fn save_header(&mut self, file_type: FileType) -> Result<(), ChunkFileError> {
        let header = ChunkFileHeader {
            file_type: file_type.into(),
            version: CHUNK_FILE_VERSION,
        };
        self.add_record(FOURCC_HEADER, &header)
    }

    pub fn save_export_flags(&mut self) -> Result<(), ChunkFileError> {
        let export_info = &self.content.export_info;
        let chunk = ExportFlagsChunk {
            flags: export_info.flags().bits(),
            author_tool_version: export_info.author_tool_version,
        };
        self.add_record(FOURCC_EXPORT_FLAGS, &chunk)
    }

    pub fn save_materials(&mut self) -> Result<(), ChunkFileError> {
        let Some(material) = &self.content.common_material else {
            trace!("No common material, skipping MTLS");
            return Ok(());
        };

        let mut data = Vec::new();
        write_material(&mut data, material)?;
        write_count(&mut data, material.sub_materials.len())?;
        for sub_material in &material.sub_materials {
            match sub_material {
                Some(sub_material) => {
                    data.write_u8(1)?;
                    write_material(&mut data, sub_material)?;
                }
                None => data.write_u8(0)?,
            }
        }

        self.chunk_file.add_chunk(FOURCC_MATERIALS, data)?;
        Ok(())
    }

    /// Saves every node as is, each mesh into its own MESH chunk preceding the NODE chunk.
    pub fn save_uncompiled_nodes(&mut self) -> Result<(), ChunkFileError> {
        let mut mesh_chunk_count = 0i32;
        for node in &self.content.nodes {
            let mesh_chunk = match &node.mesh {
                Some(mesh) => {
                    let mut data = Vec::new();
                    write_mesh(&mut data, mesh)?;
                    self.chunk_file.add_chunk(FOURCC_MESH, data)?;
                    mesh_chunk_count += 1;
                    mesh_chunk_count - 1
                }
                None => -1,
            };

            let mut data = Vec::new();
            write_node(&mut data, node, mesh_chunk)?;
            self.chunk_file.add_chunk(FOURCC_NODE, data)?;
        }

        debug!(
            "Saved {} nodes with {} meshes",
            self.content.nodes.len(),
            mesh_chunk_count
        );
        Ok(())
    }

    pub fn save_bones(&mut self, bone_entities: &[BoneEntity]) -> Result<(), ChunkFileError> {
        let mut data = Vec::new();
        write_counted(&mut data, bone_entities)?;
        self.chunk_file.add_chunk(FOURCC_BONE_ENTITIES, data)?;
        Ok(())
    }

    /// `names` holds the NUL-terminated names back to back plus one trailing NUL.
    pub fn save_bone_names(&mut self, names: &[u8], bone_count: usize) -> Result<(), ChunkFileError> {
        let mut data = Vec::with_capacity(names.len() + 4);
        write_count(&mut data, bone_count)?;
        data.write_all(names)?;
        self.chunk_file.add_chunk(FOURCC_BONE_NAMES, data)?;
        Ok(())
    }

    pub fn save_bone_initial_matrices(&mut self, matrices: &[Matrix34]) -> Result<(), ChunkFileError> {
        let mut data = Vec::new();
        write_counted(&mut data, matrices)?;
        self.chunk_file.add_chunk(FOURCC_BONE_INITIAL_MATRICES, data)?;
        Ok(())
    }

    fn add_record<T: Writable>(&mut self, magic: u32, record: &T) -> Result<(), ChunkFileError> {
        let mut data = Vec::new();
        record.write(&mut data)?;
        self.chunk_file.add_chunk(magic, data)?;
        Ok(())
    }
}

fn write_material<W: Write>(wtr: &mut W, material: &MaterialCgf) -> Result<(), ChunkFileError> {
    write_cstring(wtr, &material.name)?;
    wtr.write_i32::<LittleEndian>(material.physicalize_type.into())?;
    Ok(())
}

fn write_mesh<W: Write>(wtr: &mut W, mesh: &Mesh) -> Result<(), ChunkFileError> {
    write_counted(wtr, &mesh.positions)?;
    write_counted(wtr, &mesh.normals)?;
    write_counted(wtr, &mesh.texcoords)?;
    write_counted(wtr, &mesh.colors)?;
    write_counted(wtr, &mesh.faces)?;

    let subsets = mesh
        .subsets
        .iter()
        .map(|subset| MeshSubsetRecord {
            mat_id: subset.mat_id,
            physicalize_type: subset.physicalize_type.into(),
        })
        .collect::<Vec<_>>();
    write_counted(wtr, &subsets)?;
    Ok(())
}

fn write_node<W: Write>(wtr: &mut W, node: &NodeCgf, mesh_chunk: i32) -> Result<(), ChunkFileError> {
    let parent = match node.parent {
        Some(parent) => i32::try_from(parent).map_err(|_| ChunkFileError::FormatError {
            reason: "Node parent index exceeds i32",
        })?,
        None => -1,
    };

    write_cstring(wtr, &node.name)?;
    wtr.write_u32::<LittleEndian>(node.node_type.into())?;
    wtr.write_i32::<LittleEndian>(parent)?;
    wtr.write_u8(node.physics_proxy as u8)?;
    wtr.write_u8(node.has_common_material as u8)?;
    wtr.write_u8(node.identity_matrix as u8)?;
    Matrix34::from(&node.local_tm).write(wtr)?;
    Matrix34::from(&node.world_tm).write(wtr)?;
    wtr.write_i32::<LittleEndian>(mesh_chunk)?;
    Ok(())
}

/// Turns a `ContentCgf` into the chunk layout of the requested asset type and writes it to
/// the content's filename.
pub struct ChunkFileWriter {}

impl ChunkFileWriter {
    pub fn build_cgf(content: &ContentCgf) -> Result<ChunkFile, ChunkFileError> {
        let mut chunk_file = ChunkFile::new();
        let mut saver = CgfSaver::new(content, &mut chunk_file);
        saver.save_header(FileType::Cgf)?;
        saver.save_export_flags()?;
        saver.save_materials()?;
        saver.save_uncompiled_nodes()?;
        Ok(chunk_file)
    }

    pub fn build_chr(content: &ContentCgf) -> Result<ChunkFile, ChunkFileError> {
        let mut chunk_file = ChunkFile::new();
        let mut saver = CgfSaver::new(content, &mut chunk_file);
        saver.save_header(FileType::Chr)?;
        saver.save_export_flags()?;
        prepare_skeleton_data_chunks(&mut saver)?;
        Ok(chunk_file)
    }

    pub fn build_skin(content: &ContentCgf) -> Result<ChunkFile, ChunkFileError> {
        let mut chunk_file = ChunkFile::new();
        let mut saver = CgfSaver::new(content, &mut chunk_file);
        saver.save_header(FileType::Skin)?;
        saver.save_export_flags()?;
        saver.save_materials()?;
        saver.save_uncompiled_nodes()?;
        prepare_skeleton_data_chunks(&mut saver)?;
        Ok(chunk_file)
    }

    pub fn write_cgf(content: &ContentCgf) -> Result<(), ChunkFileError> {
        ChunkFileWriter::build_cgf(content)?.write(content.filename())
    }

    pub fn write_chr(content: &ContentCgf) -> Result<(), ChunkFileError> {
        ChunkFileWriter::build_chr(content)?.write(content.filename())
    }

    pub fn write_skin(content: &ContentCgf) -> Result<(), ChunkFileError> {
        ChunkFileWriter::build_skin(content)?.write(content.filename())
    }
}
