//! Keeps the `.mtl` file next to the scene source in sync with the materials the mesh groups
//! use. Runs before the geometry export, which maps mesh material ids onto this file.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, error, info};
use mtl_parser::group::MaterialGroup;
use mtl_parser::material::{Material, PHYSICS_NO_DRAW_NAME, TextureMapType};
use mtl_parser::{MTL_EXTENSION, MtlError};

use crate::events::contexts::{CallContext, ContextKind, PreExportContext};
use crate::events::phase::PhaseMask;
use crate::events::registry::{CallProcessor, CallProcessorBinder, CallProcessorRegistry};
use crate::events::result::{ProcessingResult, ProcessingResultCombiner};
use crate::exporters::create_output_filename;
use crate::scene::Scene;
use crate::scene::content::{ContentKind, MaterialData, TextureMap};
use crate::scene::graph::{NodeIndex, SceneGraph};
use crate::scene::manifest::groups::MeshGroup;
use crate::scene::manifest::rules::{MaterialRule, MeshAdvancedRule, PhysicsRule};
use crate::scene::selection::SceneGraphSelector;
use crate::scene::views::of_kind;

/// One material a mesh group needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInfo<'a> {
    pub name: String,
    pub material_data: Option<&'a MaterialData>,
    pub uses_vertex_coloring: bool,
    pub physicalize: bool,
}

/// The materials of a mesh group plus how to merge them into an existing file.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMaterials<'a> {
    pub materials: Vec<MaterialInfo<'a>>,
    pub rule: MaterialRule,
}

#[derive(Debug, Default)]
pub struct MtlMaterialExporter {}

/// `texture` relative to `root`, unchanged if it lies elsewhere.
fn relative_texture_path(texture: &str, root: &Path) -> String {
    if root.as_os_str().is_empty() {
        return texture.to_string();
    }

    match Path::new(texture).strip_prefix(root) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => texture.to_string(),
    }
}

impl MtlMaterialExporter {
    pub fn new() -> MtlMaterialExporter {
        MtlMaterialExporter {}
    }

    /// Physics no-draw material first if the group has physics proxies, then every material
    /// of the render meshes in selection order, each name once.
    pub fn build_material_group<'a>(group: &MeshGroup, scene: &'a Scene) -> GroupMaterials<'a> {
        let graph = scene.graph();
        let rule = group.rules.find_rule::<MaterialRule>().cloned().unwrap_or_default();
        let mut materials = Vec::new();

        let has_valid_proxies = group.rules.find_rule::<PhysicsRule>().is_some_and(|physics_rule| {
            SceneGraphSelector::generate_target_nodes(graph, &physics_rule.node_selection, SceneGraphSelector::is_mesh)
                .iter()
                .any(|name| graph.find(name).is_some())
        });
        if has_valid_proxies {
            materials.push(MaterialInfo {
                name: PHYSICS_NO_DRAW_NAME.to_string(),
                material_data: None,
                uses_vertex_coloring: false,
                physicalize: true,
            });
        }

        let mut used_materials = HashSet::new();
        let targets = SceneGraphSelector::generate_target_nodes(graph, &group.node_selection, SceneGraphSelector::is_mesh);
        for node_index in targets.iter().filter_map(|name| graph.find(name)) {
            for material_index in of_kind(graph, graph.children(node_index), ContentKind::Material) {
                let Some(full_name) = graph.get_node_name(material_index) else {
                    continue;
                };
                let name = SceneGraph::get_short_name(full_name);
                if !used_materials.insert(name.to_string()) {
                    continue;
                }

                materials.push(MaterialInfo {
                    name: name.to_string(),
                    material_data: graph
                        .get_node_content(material_index)
                        .and_then(|content| content.as_material()),
                    uses_vertex_coloring: MtlMaterialExporter::uses_vertex_coloring(group, graph, node_index),
                    physicalize: false,
                });
            }
        }

        GroupMaterials { materials, rule }
    }

    /// A mesh advanced rule decides explicitly, otherwise any color stream on the mesh enables
    /// vertex coloring.
    fn uses_vertex_coloring(group: &MeshGroup, graph: &SceneGraph, mesh_node: NodeIndex) -> bool {
        match group.rules.find_rule::<MeshAdvancedRule>() {
            Some(rule) => !rule.is_vertex_color_stream_disabled() && !rule.vertex_color_stream_name.is_empty(),
            None => of_kind(graph, graph.children(mesh_node), ContentKind::ColorStream)
                .next()
                .is_some(),
        }
    }

    fn create_material(info: &MaterialInfo<'_>, texture_root: &Path) -> Material {
        let mut material = Material::new(&info.name);
        material.enable_use_vertex_color(info.uses_vertex_coloring);
        material.enable_physical_material(info.physicalize);

        if let Some(data) = info.material_data {
            let maps = [
                (TextureMap::Diffuse, TextureMapType::Diffuse),
                (TextureMap::Specular, TextureMapType::Specular),
                (TextureMap::Bump, TextureMapType::Bump),
            ];
            for (source, target) in maps {
                material.set_texture(target, &relative_texture_path(data.texture(source), texture_root));
            }
        }
        material
    }

    /// Merges `materials` into the file at `path`, creating it if needed.
    pub fn write_material_file(path: &Path, materials: &GroupMaterials<'_>, texture_root: &Path) -> Result<(), MtlError> {
        let mut material_group = match path.exists() {
            true => {
                info!("Updating existing material file {}", path.display());
                MaterialGroup::read_file(path)?
            }
            false => {
                info!("Generating material file {}", path.display());
                MaterialGroup::new()
            }
        };

        let mut has_physical_material = false;
        let mut keep = HashSet::new();
        for info in &materials.materials {
            let material = MtlMaterialExporter::create_material(info, texture_root);
            has_physical_material |= info.physicalize;
            keep.insert(info.name.clone());

            let existing = material_group
                .find_material_index(&info.name)
                .and_then(|index| material_group.material_mut(index));
            match existing {
                Some(existing) if materials.rule.update_materials => {
                    existing.set_name(material.name());
                    existing.enable_use_vertex_color(material.uses_vertex_color());
                    existing.enable_physical_material(material.is_physical_material());
                    for map in [TextureMapType::Diffuse, TextureMapType::Specular, TextureMapType::Bump] {
                        existing.set_texture(map, material.texture(map).unwrap_or_default());
                    }
                }
                // vertex coloring follows the mesh rules even without an update request
                Some(existing) => existing.enable_use_vertex_color(material.uses_vertex_color()),
                None => {
                    material_group.add_material(material);
                }
            }
        }

        if !has_physical_material {
            material_group.remove_material(PHYSICS_NO_DRAW_NAME);
        }

        if materials.rule.remove_unused_materials {
            let unused = material_group
                .materials()
                .iter()
                .map(|material| material.name().to_string())
                .filter(|name| !keep.contains(name))
                .collect::<Vec<_>>();
            for name in unused {
                debug!("Removing unused material {}", name);
                material_group.remove_material(&name);
            }
        }

        material_group.write_file(path)
    }

    fn export_group(scene: &Scene, group_name: &str, group: &MeshGroup) -> ProcessingResult {
        let materials = MtlMaterialExporter::build_material_group(group, scene);
        if !materials.rule.enable_materials {
            debug!("Materials are disabled for group '{}'", group_name);
            return ProcessingResult::Ignored;
        }
        if materials.materials.is_empty() {
            return ProcessingResult::Ignored;
        }

        let source_directory = scene.source_directory();
        let Some(filename) = create_output_filename(group_name, source_directory, MTL_EXTENSION) else {
            error!("Unable to write the material file of an unnamed group");
            return ProcessingResult::Failure;
        };

        match MtlMaterialExporter::write_material_file(&filename, &materials, source_directory) {
            Ok(()) => ProcessingResult::Success,
            Err(err) => {
                error!("Unable to write material file {}: {:?}", filename.display(), err);
                ProcessingResult::Failure
            }
        }
    }

    fn process_scene(context: &PreExportContext<'_>) -> ProcessingResult {
        context
            .scene
            .manifest()
            .mesh_groups()
            .map(|(group_name, group)| MtlMaterialExporter::export_group(context.scene, group_name, group))
            .collect::<ProcessingResultCombiner>()
            .result()
    }
}

impl CallProcessor for MtlMaterialExporter {
    fn process(&mut self, _registry: &CallProcessorRegistry, context: &mut CallContext<'_>) -> ProcessingResult {
        match context {
            CallContext::PreExport(context) => MtlMaterialExporter::process_scene(context),
            _ => ProcessingResult::Ignored,
        }
    }
}

impl CallProcessorBinder for MtlMaterialExporter {
    fn bindings() -> Vec<(ContextKind, PhaseMask)> {
        vec![(ContextKind::PreExport, PhaseMask::all())]
    }
}
