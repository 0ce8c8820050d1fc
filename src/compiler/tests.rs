use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cgf_files::cgf::types::ContentCgf;
use glam::{Affine3A, Vec3};
use tempfile::tempdir;

use crate::compiler::SceneCompiler;
use crate::compiler::asset_writer::{AssetWriter, RecordingAssetWriter};
use crate::compiler::import_request::{AssetImportRequest, ManifestAction};
use crate::compiler::meta_info::{DefaultManifestMetaInfo, ManifestMetaInfoProvider};
use crate::events::result::ProcessingResult;
use crate::importer::source::{SourceMesh, SourceNode, SourceScene};
use crate::scene::Scene;
use crate::scene::content::{BoneData, Face, MeshData, NodeContent};
use crate::scene::manifest::SceneManifest;
use crate::scene::manifest::groups::{ManifestObject, ManifestObjectType, MeshGroup, SkeletonGroup, SkinGroup};
use crate::scene::manifest::rules::{CommentRule, OriginRule, PhysicsRule, Rule, RuleType};

/// Remembers the filename of every asset instead of writing it.
#[derive(Default)]
struct FilenameWriter {
    files: RefCell<Vec<PathBuf>>,
}

impl FilenameWriter {
    fn push(&self, content: &ContentCgf) -> bool {
        self.files.borrow_mut().push(content.filename().to_path_buf());
        true
    }
}

impl AssetWriter for FilenameWriter {
    fn write_cgf(&self, content: &ContentCgf) -> bool {
        self.push(content)
    }

    fn write_chr(&self, content: &ContentCgf) -> bool {
        self.push(content)
    }

    fn write_skin(&self, content: &ContentCgf) -> bool {
        self.push(content)
    }
}

fn compiler() -> (SceneCompiler, Rc<FilenameWriter>) {
    let writer = Rc::new(FilenameWriter::default());
    let compiler = SceneCompiler::new(writer.clone(), Box::new(DefaultManifestMetaInfo::new()));
    (compiler, writer)
}

fn triangle() -> Option<NodeContent> {
    let mut mesh = MeshData::new();
    mesh.add_position(Vec3::ZERO);
    mesh.add_position(Vec3::X);
    mesh.add_position(Vec3::Y);
    mesh.add_face(Face::new(0, 1, 2), 0);
    Some(NodeContent::Mesh(mesh))
}

fn root_bone() -> Option<NodeContent> {
    Some(NodeContent::Bone(BoneData {
        world_transform: Affine3A::IDENTITY,
        is_root: true,
    }))
}

fn quad_source() -> SourceMesh {
    SourceMesh {
        control_points: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        polygon_sizes: vec![4],
        polygon_vertices: vec![0, 1, 2, 3],
        ..SourceMesh::default()
    }
}

fn write_source(directory: &Path, name: &str, children: Vec<SourceNode>) -> Result<PathBuf, anyhow::Error> {
    let source = SourceScene {
        root: Some(SourceNode {
            name: "RootNode".to_string(),
            children,
            ..SourceNode::default()
        }),
        ..SourceScene::default()
    };
    let path = directory.join(format!("{}.json", name));
    std::fs::write(&path, serde_json::to_string(&source)?)?;
    Ok(path)
}

#[test]
fn default_manifest_needs_meshes() {
    let mut scene = Scene::new("empty");
    let meta_info = DefaultManifestMetaInfo::new();

    let result = AssetImportRequest::update_manifest(&mut scene, ManifestAction::ConstructDefault, &meta_info);
    assert_eq!(result, ProcessingResult::Failure);
    assert!(scene.manifest().is_empty());
}

#[test]
fn default_manifest_selects_every_mesh() {
    let mut scene = Scene::new("crate");
    let root = scene.graph().get_root();
    let group = scene.graph_mut().add_child(root, "group", None).unwrap();
    scene.graph_mut().add_child(group, "box", triangle()).unwrap();
    let meta_info = DefaultManifestMetaInfo::new();

    let result = AssetImportRequest::update_manifest(&mut scene, ManifestAction::ConstructDefault, &meta_info);
    assert_eq!(result, ProcessingResult::Success);
    assert_eq!(scene.manifest().entry_count(), 1);

    let (name, group) = scene.manifest().mesh_groups().next().unwrap();
    assert_eq!(name, "crate");
    assert!(group.node_selection.is_selected("group"));
    assert!(group.node_selection.is_selected("group.box"));
    assert_eq!(group.rules.rule_count(), 0);
}

#[test]
fn existing_mesh_groups_are_kept() {
    let mut scene = Scene::new("crate");
    let root = scene.graph().get_root();
    scene.graph_mut().add_child(root, "box", triangle()).unwrap();
    scene
        .manifest_mut()
        .add_entry("custom", ManifestObject::MeshGroup(MeshGroup::default()));
    let meta_info = DefaultManifestMetaInfo::new();

    let result = AssetImportRequest::update_manifest(&mut scene, ManifestAction::ConstructDefault, &meta_info);
    assert_eq!(result, ProcessingResult::Ignored);
    assert_eq!(scene.manifest().entry_count(), 1);

    let mut empty = Scene::new("empty");
    let result = AssetImportRequest::update_manifest(&mut empty, ManifestAction::Update, &meta_info);
    assert_eq!(result, ProcessingResult::Ignored);
    assert!(empty.manifest().is_empty());
}

#[test]
fn new_objects_are_initialized_from_the_scene() {
    let mut scene = Scene::new("actor");
    let root = scene.graph().get_root();
    let hips = scene.graph_mut().add_child(root, "hips", root_bone()).unwrap();
    scene.graph_mut().add_child(hips, "box", triangle()).unwrap();
    let meta_info = DefaultManifestMetaInfo::new();

    let mut skeleton = ManifestObject::SkeletonGroup(SkeletonGroup::default());
    meta_info.initialize_object(&scene, &mut skeleton);
    assert_eq!(skeleton.as_skeleton_group().unwrap().selected_root_bone, "hips");

    let mut skin = ManifestObject::SkinGroup(SkinGroup::default());
    meta_info.initialize_object(&scene, &mut skin);
    assert!(skin.as_skin_group().unwrap().node_selection.is_selected("hips.box"));

    let mut mesh_group = MeshGroup::default();
    mesh_group.rules.add_rule(Rule::Physics(PhysicsRule::default()));
    let mut object = ManifestObject::MeshGroup(mesh_group);
    meta_info.initialize_object(&scene, &mut object);
    let mesh_group = object.as_mesh_group().unwrap();
    assert!(mesh_group.node_selection.is_selected("hips.box"));
    let physics = mesh_group.rules.find_rule::<PhysicsRule>().unwrap();
    assert_eq!(physics.node_selection.selected_node_count(), 0);
    assert!(physics.node_selection.is_unselected("hips.box"));
}

#[test]
fn modifiers_exclude_rules_already_present() {
    let meta_info = DefaultManifestMetaInfo::new();

    let mut mesh_group = MeshGroup::default();
    mesh_group.rules.add_rule(Rule::Origin(OriginRule::default()));
    mesh_group.rules.add_rule(Rule::Comment(CommentRule::default()));
    let modifiers = meta_info.available_modifiers(&ManifestObject::MeshGroup(mesh_group));
    assert_eq!(
        modifiers,
        vec![
            RuleType::Comment,
            RuleType::Material,
            RuleType::MeshAdvanced,
            RuleType::Physics
        ]
    );

    let skeleton = ManifestObject::SkeletonGroup(SkeletonGroup::default());
    assert_eq!(meta_info.available_modifiers(&skeleton), vec![RuleType::Comment]);
}

#[test]
fn categories_cover_every_object_type() {
    let categories = DefaultManifestMetaInfo::new().category_assignments();
    assert_eq!(
        categories,
        vec![
            ("Meshes", ManifestObjectType::MeshGroup),
            ("Actors", ManifestObjectType::SkeletonGroup),
            ("Skins", ManifestObjectType::SkinGroup),
        ]
    );
}

#[test]
fn recording_writer_keeps_successful_files() {
    let inner = Rc::new(FilenameWriter::default());
    let recorder = RecordingAssetWriter::new(inner.clone());

    assert!(recorder.write_cgf(&ContentCgf::new("out/a.cgf")));
    assert!(recorder.write_chr(&ContentCgf::new("out/a.chr")));
    assert_eq!(
        recorder.written_files(),
        vec![PathBuf::from("out/a.cgf"), PathBuf::from("out/a.chr")]
    );
    assert_eq!(inner.files.borrow().len(), 2);
}

#[test]
fn empty_manifest_exports_nothing() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let (compiler, writer) = compiler();
    let scene = Scene::new("empty");

    assert_eq!(compiler.export_scene(&scene, dir.path()), ProcessingResult::Ignored);
    assert!(writer.files.borrow().is_empty());
    Ok(())
}

#[test_log::test]
fn compile_builds_a_default_mesh_group() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let output = dir.path().join("out");
    let source = write_source(
        dir.path(),
        "crate",
        vec![SourceNode {
            name: "box".to_string(),
            mesh: Some(quad_source()),
            ..SourceNode::default()
        }],
    )?;
    let (compiler, writer) = compiler();

    assert!(compiler.compile(&source, &output));
    assert_eq!(*writer.files.borrow(), vec![output.join("crate.cgf")]);
    Ok(())
}

#[test_log::test]
fn compile_uses_an_existing_manifest() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let output = dir.path().join("out");
    let source = write_source(
        dir.path(),
        "actor",
        vec![SourceNode {
            name: "hips".to_string(),
            is_bone: true,
            children: vec![SourceNode {
                name: "spine".to_string(),
                is_bone: true,
                ..SourceNode::default()
            }],
            ..SourceNode::default()
        }],
    )?;

    let mut manifest = SceneManifest::new();
    manifest.add_entry(
        "actor",
        ManifestObject::SkeletonGroup(SkeletonGroup {
            selected_root_bone: "RootNode.hips".to_string(),
            ..SkeletonGroup::default()
        }),
    );
    let mut scene = Scene::new("actor");
    scene.set_source_filename(&source);
    manifest.save_to_file(&scene.manifest_filename())?;

    let (compiler, writer) = compiler();
    assert!(compiler.compile(&source, &output));
    assert_eq!(*writer.files.borrow(), vec![output.join("actor.chr")]);
    Ok(())
}

#[test]
fn compile_without_meshes_or_manifest_fails() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let source = write_source(
        dir.path(),
        "empty",
        vec![SourceNode {
            name: "helper".to_string(),
            ..SourceNode::default()
        }],
    )?;
    let (compiler, writer) = compiler();

    assert!(!compiler.compile(&source, &dir.path().join("out")));
    assert!(writer.files.borrow().is_empty());
    Ok(())
}

#[test]
fn compile_fails_for_missing_sources() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let (compiler, writer) = compiler();

    assert!(!compiler.compile(&dir.path().join("missing.json"), &dir.path().join("out")));
    assert!(writer.files.borrow().is_empty());
    Ok(())
}

#[test_log::test]
fn empty_manifest_file_is_replaced_by_the_default() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let output = dir.path().join("out");
    let source = write_source(
        dir.path(),
        "crate",
        vec![SourceNode {
            name: "box".to_string(),
            mesh: Some(quad_source()),
            ..SourceNode::default()
        }],
    )?;
    let mut scene = Scene::new("crate");
    scene.set_source_filename(&source);
    SceneManifest::new().save_to_file(&scene.manifest_filename())?;

    let meta_info = DefaultManifestMetaInfo::new();
    let loaded = AssetImportRequest::load_scene(&source, &meta_info).ok_or_else(|| anyhow::anyhow!("scene not loaded"))?;
    assert_eq!(loaded.manifest().entry_count(), 1);
    assert!(loaded.manifest().mesh_groups().next().is_some());

    let (compiler, writer) = compiler();
    assert!(compiler.compile(&source, &output));
    assert_eq!(*writer.files.borrow(), vec![output.join("crate.cgf")]);
    Ok(())
}

#[test]
fn scene_without_meshes_or_manifest_is_not_loaded() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let source = write_source(
        dir.path(),
        "helpers",
        vec![SourceNode {
            name: "helper".to_string(),
            ..SourceNode::default()
        }],
    )?;

    assert!(AssetImportRequest::load_scene(&source, &DefaultManifestMetaInfo::new()).is_none());
    Ok(())
}
