use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cgf_files::cgf::types::{ContentCgf, MeshFace, MeshSubset, NodeType, PhysicalizeType};
use cgf_files::common::crc::crc32_lowercase;
use glam::{Affine3A, Quat, Vec2, Vec3, Vec4};
use mtl_parser::group::MaterialGroup;
use mtl_parser::material::{Material, PHYSICS_NO_DRAW_NAME, TextureMapType};
use tempfile::tempdir;

use crate::compiler::SceneCompiler;
use crate::compiler::asset_writer::AssetWriter;
use crate::compiler::meta_info::DefaultManifestMetaInfo;
use crate::events::result::ProcessingResult;
use crate::exporters::cgf::color_stream::to_mesh_color;
use crate::exporters::cgf::mesh::DEFAULT_NORMAL;
use crate::exporters::cgf::world_matrix::concatenate_matrices_upwards;
use crate::exporters::mtl::{GroupMaterials, MaterialInfo, MtlMaterialExporter};
use crate::exporters::skin::skin_group::detect_root_bone_name;
use crate::exporters::{create_output_filename, ensure_target_folder_exists};
use crate::scene::Scene;
use crate::scene::content::{
    BoneData, Face, MaterialData, MeshData, MeshVertexColorData, MeshVertexUvData, NodeContent, TextureMap,
};
use crate::scene::graph::{NodeIndex, SceneGraph};
use crate::scene::manifest::groups::{ManifestObject, MeshGroup, SkeletonGroup, SkinGroup};
use crate::scene::manifest::rules::{MaterialRule, MeshAdvancedRule, OriginRule, PhysicsRule, Rule};
use crate::scene::selection::SceneGraphSelector;

#[derive(Default)]
struct MemoryAssetWriter {
    cgf: RefCell<Vec<ContentCgf>>,
    chr: RefCell<Vec<ContentCgf>>,
    skin: RefCell<Vec<ContentCgf>>,
}

impl AssetWriter for MemoryAssetWriter {
    fn write_cgf(&self, content: &ContentCgf) -> bool {
        self.cgf.borrow_mut().push(content.clone());
        true
    }

    fn write_chr(&self, content: &ContentCgf) -> bool {
        self.chr.borrow_mut().push(content.clone());
        true
    }

    fn write_skin(&self, content: &ContentCgf) -> bool {
        self.skin.borrow_mut().push(content.clone());
        true
    }
}

fn export(scene: &Scene, output_directory: &Path) -> (ProcessingResult, Rc<MemoryAssetWriter>) {
    let writer = Rc::new(MemoryAssetWriter::default());
    let compiler = SceneCompiler::new(writer.clone(), Box::new(DefaultManifestMetaInfo::new()));
    (compiler.export_scene(scene, output_directory), writer)
}

fn scene_in(directory: &Path) -> Scene {
    let mut scene = Scene::new("test");
    scene.set_source_filename(directory.join("test.json"));
    scene
}

/// A quad made of two triangles with the given material ids.
fn quad_mesh(material_ids: [u32; 2]) -> Option<NodeContent> {
    let mut mesh = MeshData::new();
    mesh.add_position(Vec3::new(0.0, 0.0, 0.0));
    mesh.add_position(Vec3::new(1.0, 0.0, 0.0));
    mesh.add_position(Vec3::new(1.0, 1.0, 0.0));
    mesh.add_position(Vec3::new(0.0, 1.0, 0.0));
    mesh.add_face(Face::new(0, 1, 2), material_ids[0]);
    mesh.add_face(Face::new(0, 2, 3), material_ids[1]);
    Some(NodeContent::Mesh(mesh))
}

fn translation(x: f32, y: f32, z: f32) -> Option<NodeContent> {
    Some(NodeContent::Transform(Affine3A::from_translation(Vec3::new(x, y, z))))
}

fn add_end_point(graph: &mut SceneGraph, parent: NodeIndex, name: &str, content: NodeContent) -> NodeIndex {
    let index = graph.add_child(parent, name, Some(content)).unwrap();
    assert!(graph.make_end_point(index));
    index
}

fn add_mesh_group(scene: &mut Scene, name: &str, configure: impl FnOnce(&SceneGraph, &mut MeshGroup)) {
    let mut group = MeshGroup::default();
    SceneGraphSelector::select_all(scene.graph(), &mut group.node_selection);
    configure(scene.graph(), &mut group);
    assert!(scene.manifest_mut().add_entry(name, ManifestObject::MeshGroup(group)));
}

fn bone(is_root: bool, y: f32) -> Option<NodeContent> {
    Some(NodeContent::Bone(BoneData {
        world_transform: Affine3A::from_translation(Vec3::new(0.0, y, 0.0)),
        is_root,
    }))
}

/// root -> spine -> head, plus a mesh next to the spine
fn add_skeleton(graph: &mut SceneGraph) {
    let root = graph.add_child(graph.get_root(), "root", bone(true, 0.0)).unwrap();
    let spine = graph.add_child(root, "spine", bone(false, 1.0)).unwrap();
    graph.add_child(spine, "head", bone(false, 2.0)).unwrap();
    graph.add_child(root, "mesh", quad_mesh([0, 0])).unwrap();
}

#[test]
fn output_filenames() {
    let directory = Path::new("out");
    assert_eq!(create_output_filename("", directory, "cgf"), None);
    assert_eq!(
        create_output_filename("crate", directory, "cgf"),
        Some(PathBuf::from("out/crate.cgf"))
    );
    assert_eq!(
        create_output_filename("crate.lod1", directory, "cgf"),
        Some(PathBuf::from("out/crate.lod1.cgf"))
    );
}

#[test]
fn target_folders_are_created() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let filename = dir.path().join("a").join("b").join("crate.cgf");
    assert!(ensure_target_folder_exists(&filename));
    assert!(dir.path().join("a").join("b").is_dir());
    assert!(ensure_target_folder_exists(Path::new("crate.cgf")));
    Ok(())
}

#[test_log::test]
fn mesh_group_exports_faces_and_default_streams() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out");
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    scene.graph_mut().add_child(root, "box", quad_mesh([0, 1])).unwrap();
    add_mesh_group(&mut scene, "crate", |_, _| {});

    let (result, writer) = export(&scene, &output);
    assert_eq!(result, ProcessingResult::Success);

    let cgf = writer.cgf.borrow();
    assert_eq!(cgf.len(), 1);
    let content = &cgf[0];
    assert_eq!(content.filename(), output.join("crate.cgf"));
    assert!(content.export_info.merge_all_nodes);
    assert!(!content.export_info.no_mesh);
    assert!(!content.export_info.have_physics_proxy);
    assert!(!content.export_info.want_f32_vertices);
    assert_eq!(content.export_info.author_tool_version, 1);

    let common_material = content.common_material.as_ref().unwrap();
    assert_eq!(common_material.name, "crate");
    assert!(common_material.sub_materials.is_empty());

    assert_eq!(content.node_count(), 1);
    let node = &content.nodes[0];
    assert_eq!(node.name, "box");
    assert_eq!(node.node_type, NodeType::Mesh);
    assert!(!node.physics_proxy);
    assert!(node.has_common_material);
    assert!(node.identity_matrix);
    assert_eq!(node.world_tm, Affine3A::IDENTITY);

    let mesh = node.mesh.as_ref().unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.positions[2], Vec3::new(1.0, 1.0, 0.0));
    assert!(mesh.normals.iter().all(|normal| *normal == DEFAULT_NORMAL));
    assert_eq!(mesh.texcoords, vec![Vec2::ZERO; 4]);
    assert!(mesh.colors.is_empty());
    assert_eq!(
        mesh.faces,
        vec![
            MeshFace {
                v: [0, 1, 2],
                subset: 0
            },
            MeshFace {
                v: [0, 2, 3],
                subset: 1
            },
        ]
    );
    assert_eq!(
        mesh.subsets,
        vec![
            MeshSubset {
                mat_id: 0,
                physicalize_type: PhysicalizeType::Default
            },
            MeshSubset {
                mat_id: 1,
                physicalize_type: PhysicalizeType::Default
            },
        ]
    );
}

#[test_log::test]
fn physics_proxies_come_first_with_a_single_subset() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    scene.graph_mut().add_child(root, "box", quad_mesh([0, 1])).unwrap();
    scene.graph_mut().add_child(root, "proxy", quad_mesh([2, 3])).unwrap();
    add_mesh_group(&mut scene, "crate", |graph, group| {
        group.node_selection.remove_selected_node("proxy");

        let mut physics = PhysicsRule::default();
        SceneGraphSelector::unselect_all(graph, &mut physics.node_selection);
        physics.node_selection.add_selected_node("proxy");
        group.rules.add_rule(Rule::Physics(physics));
    });

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);

    let cgf = writer.cgf.borrow();
    let content = &cgf[0];
    assert!(content.export_info.have_physics_proxy);
    assert_eq!(content.node_count(), 2);

    let proxy = &content.nodes[0];
    assert_eq!(proxy.name, "proxy");
    assert!(proxy.physics_proxy);
    let proxy_mesh = proxy.mesh.as_ref().unwrap();
    assert_eq!(
        proxy_mesh.subsets,
        vec![MeshSubset {
            mat_id: 0,
            physicalize_type: PhysicalizeType::DefaultProxy
        }]
    );
    assert!(proxy_mesh.faces.iter().all(|face| face.subset == 0));

    let render = &content.nodes[1];
    assert_eq!(render.name, "box");
    assert!(!render.physics_proxy);
    assert_eq!(render.mesh.as_ref().unwrap().subset_count(), 2);

    // the no-draw material was generated for the proxy and mirrored into the container
    let materials = MaterialGroup::read_file(&dir.path().join("crate.mtl")).unwrap();
    assert_eq!(materials.find_material_index(PHYSICS_NO_DRAW_NAME), Some(0));
    let sub_materials = &content.common_material.as_ref().unwrap().sub_materials;
    assert_eq!(sub_materials.len(), 1);
    let no_draw = sub_materials[0].as_ref().unwrap();
    assert_eq!(no_draw.name, PHYSICS_NO_DRAW_NAME);
    assert_eq!(no_draw.physicalize_type, PhysicalizeType::DefaultProxy);
}

#[test]
fn uv_stream_is_copied() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let mesh = graph.add_child(root, "box", quad_mesh([0, 0])).unwrap();
    let uvs = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    add_end_point(
        graph,
        mesh,
        "map1",
        NodeContent::UvStream(MeshVertexUvData {
            uvs: uvs.clone(),
            custom_name: "map1".to_string(),
        }),
    );
    add_mesh_group(&mut scene, "crate", |_, _| {});

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    assert_eq!(cgf[0].nodes[0].mesh.as_ref().unwrap().texcoords, uvs);
}

#[test]
fn disabled_uv_stream_leaves_zeroed_texcoords() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let mesh = graph.add_child(root, "box", quad_mesh([0, 0])).unwrap();
    add_end_point(
        graph,
        mesh,
        "map1",
        NodeContent::UvStream(MeshVertexUvData {
            uvs: vec![Vec2::ONE; 4],
            custom_name: "map1".to_string(),
        }),
    );
    add_mesh_group(&mut scene, "crate", |_, group| {
        group.rules.add_rule(Rule::MeshAdvanced(MeshAdvancedRule {
            uv_stream_name: "Disabled".to_string(),
            ..MeshAdvancedRule::default()
        }));
    });

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    assert_eq!(cgf[0].nodes[0].mesh.as_ref().unwrap().texcoords, vec![Vec2::ZERO; 4]);
}

#[test_log::test]
fn uv_stream_with_wrong_length_fails_the_group() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let mesh = graph.add_child(root, "box", quad_mesh([0, 0])).unwrap();
    add_end_point(
        graph,
        mesh,
        "map1",
        NodeContent::UvStream(MeshVertexUvData {
            uvs: vec![Vec2::ZERO; 3],
            custom_name: "map1".to_string(),
        }),
    );
    add_mesh_group(&mut scene, "crate", |_, _| {});

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Failure);
    assert!(writer.cgf.borrow().is_empty());
}

#[test]
fn colors_are_clamped_to_bytes() {
    assert_eq!(to_mesh_color(Vec4::new(1.0, 0.0, 0.5, 2.0)), [255, 0, 127, 255]);
    assert_eq!(to_mesh_color(Vec4::new(-1.0, 0.25, 1.0, 0.0)), [0, 63, 255, 0]);
}

#[test]
fn color_stream_is_converted() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let mesh = graph.add_child(root, "box", quad_mesh([0, 0])).unwrap();
    add_end_point(
        graph,
        mesh,
        "colors",
        NodeContent::ColorStream(MeshVertexColorData {
            colors: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 4],
            custom_name: "colors".to_string(),
        }),
    );
    add_mesh_group(&mut scene, "crate", |_, _| {});

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    assert_eq!(cgf[0].nodes[0].mesh.as_ref().unwrap().colors, vec![[255, 0, 0, 255]; 4]);
}

#[test]
fn world_matrices_concatenate_end_point_transforms() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_child(graph.get_root(), "parent", translation(1.0, 0.0, 0.0)).unwrap();
    let mesh = graph.add_child(parent, "box", quad_mesh([0, 0])).unwrap();
    add_end_point(
        &mut graph,
        mesh,
        "transform",
        NodeContent::Transform(Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0))),
    );
    let loose = graph.add_child(graph.get_root(), "loose", quad_mesh([0, 0])).unwrap();

    let world = concatenate_matrices_upwards(&graph, mesh).unwrap();
    assert!(world.abs_diff_eq(Affine3A::from_translation(Vec3::new(1.0, 2.0, 0.0)), 1e-6));
    assert_eq!(concatenate_matrices_upwards(&graph, loose), None);
}

#[test]
fn origin_rule_moves_and_scales_the_group() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let parent = graph.add_child(root, "parent", translation(1.0, 0.0, 0.0)).unwrap();
    graph.add_child(parent, "box", quad_mesh([0, 0])).unwrap();
    add_mesh_group(&mut scene, "crate", |_, group| {
        group.rules.add_rule(Rule::Origin(OriginRule {
            translation: Vec3::new(0.0, 0.0, 5.0),
            scale: 2.0,
            ..OriginRule::default()
        }));
    });

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    let node = &cgf[0].nodes[0];
    let expected = Affine3A::from_scale_rotation_translation(Vec3::splat(2.0), Quat::IDENTITY, Vec3::new(2.0, 0.0, 5.0));
    assert!(node.world_tm.abs_diff_eq(expected, 1e-5));
    assert!(!node.identity_matrix);
}

#[test]
fn origin_node_becomes_the_new_origin() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let parent = graph.add_child(root, "parent", translation(1.0, 0.0, 0.0)).unwrap();
    graph.add_child(parent, "box", quad_mesh([0, 0])).unwrap();
    add_mesh_group(&mut scene, "crate", |_, group| {
        group.rules.add_rule(Rule::Origin(OriginRule {
            origin_node_name: "parent".to_string(),
            use_root_as_origin: false,
            ..OriginRule::default()
        }));
    });

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    let node = &cgf[0].nodes[0];
    assert!(node.world_tm.abs_diff_eq(Affine3A::IDENTITY, 1e-6));
    assert!(!node.identity_matrix);
}

#[test]
fn mesh_advanced_rule_configures_the_container() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let parent = graph.add_child(root, "parent", translation(1.0, 0.0, 0.0)).unwrap();
    graph.add_child(parent, "box", quad_mesh([0, 0])).unwrap();
    add_mesh_group(&mut scene, "crate", |_, group| {
        group.rules.add_rule(Rule::MeshAdvanced(MeshAdvancedRule {
            use_32bit_vertices: true,
            merge_meshes: false,
            ..MeshAdvancedRule::default()
        }));
    });

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    let cgf = writer.cgf.borrow();
    let content = &cgf[0];
    assert!(content.export_info.want_f32_vertices);
    assert!(!content.export_info.merge_all_nodes);

    // unmerged nodes are placed through their local matrix
    let node = &content.nodes[0];
    assert_eq!(node.world_tm, Affine3A::IDENTITY);
    assert!(node.local_tm.abs_diff_eq(Affine3A::from_translation(Vec3::X), 1e-6));
}

/// box uses stone and wood, barrel only wood
fn material_scene(directory: &Path, merge_meshes: bool) -> Scene {
    let mut scene = scene_in(directory);
    let root = scene.graph().get_root();
    let graph = scene.graph_mut();
    let crate_box = graph.add_child(root, "box", quad_mesh([0, 1])).unwrap();
    add_end_point(graph, crate_box, "stone", NodeContent::Material(MaterialData::new()));
    add_end_point(graph, crate_box, "wood", NodeContent::Material(MaterialData::new()));
    let barrel = graph.add_child(root, "barrel", quad_mesh([0, 0])).unwrap();
    add_end_point(graph, barrel, "wood", NodeContent::Material(MaterialData::new()));

    add_mesh_group(&mut scene, "crate", |_, group| {
        group.rules.add_rule(Rule::MeshAdvanced(MeshAdvancedRule {
            merge_meshes,
            ..MeshAdvancedRule::default()
        }));
    });
    scene
}

#[test_log::test]
fn merged_material_ids_are_relocated_on_faces() {
    let dir = tempdir().unwrap();
    let scene = material_scene(dir.path(), true);

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);

    let materials = MaterialGroup::read_file(&dir.path().join("crate.mtl")).unwrap();
    let names = materials.materials().iter().map(Material::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["stone", "wood"]);

    let cgf = writer.cgf.borrow();
    let content = &cgf[0];
    let sub_materials = content.common_material.as_ref().unwrap().sub_materials.iter();
    let sub_names = sub_materials
        .map(|material| material.as_ref().unwrap().name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(sub_names, vec!["stone", "wood"]);

    let crate_box = content.nodes[0].mesh.as_ref().unwrap();
    assert_eq!(crate_box.faces.iter().map(|face| face.subset).collect::<Vec<_>>(), vec![0, 1]);

    let barrel = content.nodes[1].mesh.as_ref().unwrap();
    assert_eq!(content.nodes[1].name, "barrel");
    assert_eq!(barrel.faces.iter().map(|face| face.subset).collect::<Vec<_>>(), vec![1, 1]);
    assert_eq!(barrel.subsets[0].mat_id, 0);
}

#[test]
fn unmerged_material_ids_are_relocated_on_subsets() {
    let dir = tempdir().unwrap();
    let scene = material_scene(dir.path(), false);

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);

    let cgf = writer.cgf.borrow();
    let barrel = cgf[0].nodes[1].mesh.as_ref().unwrap();
    assert_eq!(barrel.subsets[0].mat_id, 1);
    assert!(barrel.faces.iter().all(|face| face.subset == 0));
}

#[test]
fn disabled_materials_do_not_touch_the_mtl_file() {
    let dir = tempdir().unwrap();
    let mut scene = material_scene(dir.path(), true);
    let Some(ManifestObject::MeshGroup(group)) = scene.manifest_mut().find_value_mut("crate") else {
        panic!("mesh group missing");
    };
    group.rules.add_rule(Rule::Material(MaterialRule {
        enable_materials: false,
        ..MaterialRule::default()
    }));

    let (result, _) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Success);
    assert!(!dir.path().join("crate.mtl").exists());
}

fn write_existing_materials(path: &Path) -> Result<(), mtl_parser::MtlError> {
    let mut group = MaterialGroup::new();
    let mut stone = Material::new("stone");
    stone.set_texture(TextureMapType::Diffuse, "old.dds");
    group.add_material(stone);
    group.add_material(Material::new("old"));
    let mut no_draw = Material::new(PHYSICS_NO_DRAW_NAME);
    no_draw.enable_physical_material(true);
    group.add_material(no_draw);
    group.write_file(path)
}

fn stone_materials<'a>(data: &'a MaterialData, rule: MaterialRule) -> GroupMaterials<'a> {
    GroupMaterials {
        materials: vec![MaterialInfo {
            name: "stone".to_string(),
            material_data: Some(data),
            uses_vertex_coloring: true,
            physicalize: false,
        }],
        rule,
    }
}

fn stone_data(texture_root: &Path) -> MaterialData {
    let mut data = MaterialData::new();
    let texture = texture_root.join("textures").join("stone.dds");
    data.set_texture(TextureMap::Diffuse, &texture.to_string_lossy());
    data
}

#[test]
fn mtl_file_is_created_with_relative_textures() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let path = dir.path().join("crate.mtl");
    let data = stone_data(dir.path());

    MtlMaterialExporter::write_material_file(&path, &stone_materials(&data, MaterialRule::default()), dir.path())?;

    let group = MaterialGroup::read_file(&path)?;
    assert_eq!(group.material_count(), 1);
    let stone = group.material(0).unwrap();
    assert_eq!(stone.name(), "stone");
    assert!(stone.uses_vertex_color());
    assert!(!stone.is_physical_material());
    assert_eq!(stone.texture(TextureMapType::Diffuse), Some("textures/stone.dds"));
    Ok(())
}

#[test]
fn existing_materials_keep_their_textures_without_update() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let path = dir.path().join("crate.mtl");
    write_existing_materials(&path)?;
    let data = stone_data(dir.path());

    MtlMaterialExporter::write_material_file(&path, &stone_materials(&data, MaterialRule::default()), dir.path())?;

    let group = MaterialGroup::read_file(&path)?;
    let names = group.materials().iter().map(Material::name).collect::<Vec<_>>();
    // no proxies left, so the no-draw material goes
    assert_eq!(names, vec!["stone", "old"]);
    let stone = group.material(0).unwrap();
    assert_eq!(stone.texture(TextureMapType::Diffuse), Some("old.dds"));
    assert!(stone.uses_vertex_color());
    Ok(())
}

#[test]
fn update_and_remove_unused_rewrite_the_file() -> Result<(), anyhow::Error> {
    let dir = tempdir()?;
    let path = dir.path().join("crate.mtl");
    write_existing_materials(&path)?;
    let data = stone_data(dir.path());
    let rule = MaterialRule {
        enable_materials: true,
        remove_unused_materials: true,
        update_materials: true,
    };

    MtlMaterialExporter::write_material_file(&path, &stone_materials(&data, rule), dir.path())?;

    let group = MaterialGroup::read_file(&path)?;
    assert_eq!(group.material_count(), 1);
    let stone = group.material(0).unwrap();
    assert_eq!(stone.name(), "stone");
    assert_eq!(stone.texture(TextureMapType::Diffuse), Some("textures/stone.dds"));
    Ok(())
}

#[test]
fn material_group_lists_proxy_material_first() {
    let dir = tempdir().unwrap();
    let mut scene = material_scene(dir.path(), true);
    let root = scene.graph().get_root();
    scene.graph_mut().add_child(root, "proxy", quad_mesh([0, 0])).unwrap();

    let mut group = scene.manifest().mesh_groups().next().unwrap().1.clone();
    let mut physics = PhysicsRule::default();
    SceneGraphSelector::unselect_all(scene.graph(), &mut physics.node_selection);
    physics.node_selection.add_selected_node("proxy");
    group.rules.add_rule(Rule::Physics(physics));

    let materials = MtlMaterialExporter::build_material_group(&group, &scene);
    let names = materials.materials.iter().map(|info| info.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec![PHYSICS_NO_DRAW_NAME, "stone", "wood"]);
    assert!(materials.materials[0].physicalize);
    assert!(materials.materials[0].material_data.is_none());
    assert!(!materials.materials[1].uses_vertex_coloring);
}

#[test_log::test]
fn skeleton_group_exports_bone_hierarchy() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out");
    let mut scene = scene_in(dir.path());
    add_skeleton(scene.graph_mut());
    scene.manifest_mut().add_entry(
        "actor",
        ManifestObject::SkeletonGroup(SkeletonGroup {
            selected_root_bone: "root".to_string(),
            ..SkeletonGroup::default()
        }),
    );

    let (result, writer) = export(&scene, &output);
    assert_eq!(result, ProcessingResult::Success);
    assert!(writer.cgf.borrow().is_empty());

    let chr = writer.chr.borrow();
    assert_eq!(chr.len(), 1);
    assert_eq!(chr[0].filename(), output.join("actor.chr"));

    let skinning_info = &chr[0].skinning_info;
    let names = skinning_info.bones_desc.iter().map(|desc| desc.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["root", "spine", "head"]);
    assert_eq!(skinning_info.bones_desc[1].controller_id, crc32_lowercase("root.spine"));
    assert!(
        skinning_info.bones_desc[2]
            .default_b2w
            .abs_diff_eq(Affine3A::from_translation(Vec3::new(0.0, 2.0, 0.0)), 1e-6)
    );

    let entities = &skinning_info.bone_entities;
    assert_eq!(entities.len(), 3);
    let hierarchy = entities
        .iter()
        .map(|entity| (entity.bone_id, entity.parent_id, entity.n_children))
        .collect::<Vec<_>>();
    assert_eq!(hierarchy, vec![(0, -1, 1), (1, 0, 1), (2, 1, 0)]);
    assert!(entities.iter().all(|entity| entity.phys.phys_geom == -1));
    assert_eq!(entities[2].controller_id, crc32_lowercase("root.spine.head"));
}

#[test_log::test]
fn missing_root_bone_fails_the_skeleton_group() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    add_skeleton(scene.graph_mut());
    scene.manifest_mut().add_entry(
        "actor",
        ManifestObject::SkeletonGroup(SkeletonGroup {
            selected_root_bone: "pelvis".to_string(),
            ..SkeletonGroup::default()
        }),
    );

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Failure);
    assert!(writer.chr.borrow().is_empty());
}

#[test]
fn root_bone_is_detected_breadth_first() {
    let mut graph = SceneGraph::new();
    assert_eq!(detect_root_bone_name(&graph), None);

    let group = graph.add_child(graph.get_root(), "group", None).unwrap();
    graph.add_child(group, "hips", bone(true, 0.0)).unwrap();
    graph.add_child(graph.get_root(), "pelvis", bone(true, 0.0)).unwrap();
    assert_eq!(detect_root_bone_name(&graph), Some("pelvis"));
}

#[test]
fn skin_group_exports_the_detected_skeleton() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out");
    let mut scene = scene_in(dir.path());
    add_skeleton(scene.graph_mut());
    scene
        .manifest_mut()
        .add_entry("body", ManifestObject::SkinGroup(SkinGroup::default()));

    let (result, writer) = export(&scene, &output);
    assert_eq!(result, ProcessingResult::Success);

    let skin = writer.skin.borrow();
    assert_eq!(skin.len(), 1);
    assert_eq!(skin[0].filename(), output.join("body.skin"));
    assert_eq!(skin[0].skinning_info.bones_desc.len(), 3);
    assert_eq!(skin[0].skinning_info.bone_entities.len(), 3);
}

#[test]
fn skin_group_without_bones_fails() {
    let dir = tempdir().unwrap();
    let mut scene = scene_in(dir.path());
    let root = scene.graph().get_root();
    scene.graph_mut().add_child(root, "box", quad_mesh([0, 0])).unwrap();
    scene
        .manifest_mut()
        .add_entry("body", ManifestObject::SkinGroup(SkinGroup::default()));

    let (result, writer) = export(&scene, &dir.path().join("out"));
    assert_eq!(result, ProcessingResult::Failure);
    assert!(writer.skin.borrow().is_empty());
}
