use std::io::Cursor;

use glam::{Affine3A, Vec2, Vec3};

use crate::ChunkFileError;
use crate::cgf::reader::ChunkFileReader;
use crate::cgf::types::{
    ContentCgf, ExportFlags, FOURCC_MATERIALS, FOURCC_MESH, FOURCC_NODE, FileType, MAX_NODE_NAME_LENGTH,
    MaterialCgf, Mesh, MeshFace, MeshSubset, NodeCgf, NodeType, PhysicalizeType, truncate_name,
};
use crate::cgf::writer::ChunkFileWriter;
use crate::common::types::Matrix34;

fn triangle_mesh() -> Mesh {
    let mut mesh = Mesh::default();
    mesh.set_vertex_count(3);
    mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    mesh.normals = vec![Vec3::Z; 3];
    mesh.realloc_texcoords(3);
    mesh.texcoords[1] = Vec2::new(1.0, 0.0);
    mesh.realloc_colors(3);
    mesh.set_face_count(1);
    mesh.faces[0] = MeshFace { v: [0, 1, 2], subset: 0 };
    mesh.subsets.push(MeshSubset {
        mat_id: 0,
        physicalize_type: PhysicalizeType::Default,
    });
    mesh
}

fn content_with_mesh() -> ContentCgf {
    content_with_mesh_at("triangle.cgf")
}

fn content_with_mesh_at(filename: impl Into<std::path::PathBuf>) -> ContentCgf {
    let mut content = ContentCgf::new(filename);
    content.export_info.merge_all_nodes = true;
    content.export_info.want_f32_vertices = true;

    let mut material = MaterialCgf::new("triangle", PhysicalizeType::None);
    material
        .sub_materials
        .push(Some(MaterialCgf::new("stone", PhysicalizeType::Default)));
    material.sub_materials.push(None);
    content.common_material = Some(material);

    let mut root = NodeCgf::default();
    root.set_name("RootNode");
    let root = content.add_node(root);

    let mut node = NodeCgf::default();
    node.set_name("RootNode.Triangle");
    node.node_type = NodeType::Mesh;
    node.parent = Some(root);
    node.has_common_material = true;
    node.identity_matrix = false;
    node.local_tm = Affine3A::from_translation(Vec3::new(0.0, 0.0, 2.0));
    node.world_tm = node.local_tm;
    node.mesh = Some(triangle_mesh());
    content.add_node(node);
    content
}

#[test]
fn export_flags_bits() {
    let content = content_with_mesh();
    let flags = content.export_info.flags();
    assert_eq!(flags, ExportFlags::MERGE_ALL_NODES | ExportFlags::WANT_F32_VERTICES);
    assert_eq!(flags.bits(), 0x81);
}

#[test]
fn truncate_name_keeps_tail() {
    assert_eq!(truncate_name("short", MAX_NODE_NAME_LENGTH), "short");

    let long = format!("{}tail", "x".repeat(100));
    let truncated = truncate_name(&long, MAX_NODE_NAME_LENGTH);
    assert_eq!(truncated.len(), MAX_NODE_NAME_LENGTH - 1);
    assert!(truncated.ends_with("tail"));

    let mut node = NodeCgf::default();
    node.set_name(&long);
    assert_eq!(node.name.len(), MAX_NODE_NAME_LENGTH - 1);
}

#[test]
fn cgf_layout() -> Result<(), anyhow::Error> {
    let content = content_with_mesh();
    let chunk_file = ChunkFileWriter::build_cgf(&content)?;

    let magics = chunk_file.chunks.iter().map(|chunk| chunk.magic_str()).collect::<Vec<_>>();
    assert_eq!(magics, vec!["CFHD", "EXPF", "MTLS", "NODE", "MESH", "NODE"]);
    Ok(())
}

#[test]
fn cgf_reads_back() -> Result<(), anyhow::Error> {
    let content = content_with_mesh();
    let mut buf = Vec::new();
    ChunkFileWriter::build_cgf(&content)?.write_to(&mut buf)?;

    let asset = ChunkFileReader::parse_asset(&mut Cursor::new(&buf))?;
    assert_eq!(asset.file_type, FileType::Cgf);
    assert_eq!(asset.chunk_count(FOURCC_NODE), 2);
    assert_eq!(asset.chunk_count(FOURCC_MESH), 1);
    assert!(asset.has_chunk(FOURCC_MATERIALS));

    let export_info = asset.export_info()?.expect("EXPF chunk");
    assert_eq!(export_info, content.export_info);

    let material = asset.materials()?.expect("MTLS chunk");
    assert_eq!(&material, content.common_material.as_ref().unwrap());

    let nodes = asset.nodes()?;
    assert_eq!(nodes[0].name, "RootNode");
    assert_eq!(nodes[0].parent, -1);
    assert_eq!(nodes[0].mesh_chunk, -1);
    assert_eq!(nodes[1].name, "RootNode.Triangle");
    assert_eq!(nodes[1].node_type, NodeType::Mesh);
    assert_eq!(nodes[1].parent, 0);
    assert_eq!(nodes[1].mesh_chunk, 0);
    assert!(nodes[1].has_common_material);
    assert_eq!(nodes[1].local_tm, Matrix34::from(&content.nodes[1].local_tm));

    let meshes = asset.meshes()?;
    assert_eq!(meshes.len(), 1);
    assert_eq!(&meshes[0], content.nodes[1].mesh.as_ref().unwrap());
    assert_eq!(meshes[0].colors[0], [0xFF; 4]);
    Ok(())
}

#[test]
fn rejects_foreign_files() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"MD20");
    buf.extend_from_slice(&0u32.to_le_bytes());

    let result = ChunkFileReader::parse_asset(&mut Cursor::new(&buf));
    assert!(matches!(result, Err(ChunkFileError::InvalidMagicValue { .. })));
}

#[test]
fn rejects_unknown_versions() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"CFHD");
    buf.extend_from_slice(&8u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0x700u32.to_le_bytes());

    let result = ChunkFileReader::parse_asset(&mut Cursor::new(&buf));
    assert!(matches!(
        result,
        Err(ChunkFileError::UnsupportedVersion { version: 0x700 })
    ));
}

#[test]
fn write_replaces_target() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("triangle.cgf");
    std::fs::write(&path, b"stale")?;

    let content = content_with_mesh_at(&path);
    ChunkFileWriter::write_cgf(&content)?;

    let asset = ChunkFileReader::parse_file(&path)?;
    assert_eq!(asset.nodes()?.len(), 2);
    let leftovers = std::fs::read_dir(dir.path())?.count();
    assert_eq!(leftovers, 1);
    Ok(())
}

#[test]
fn failed_write_leaves_no_file() {
    let content = ContentCgf::new("/nonexistent-directory/for/sure/out.cgf");
    assert!(ChunkFileWriter::write_cgf(&content).is_err());
    assert!(!std::path::Path::new("/nonexistent-directory/for/sure/out.cgf").exists());
}
