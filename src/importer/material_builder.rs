use crate::importer::source::SourceMaterial;
use crate::scene::content::{MaterialData, NodeContent, TextureMap};
use crate::scene::graph::{NodeIndex, SceneGraph};

pub struct MaterialBuilder {}

impl MaterialBuilder {
    pub fn build_material(material: &SourceMaterial) -> MaterialData {
        let mut data = MaterialData::new();
        data.set_texture(TextureMap::Diffuse, &material.diffuse_texture);
        data.set_texture(TextureMap::Specular, &material.specular_texture);
        data.set_texture(TextureMap::Bump, &material.bump_texture);
        data
    }

    /// Materials are always end points below the node that uses them. Invalid or duplicate
    /// names are skipped by the graph.
    pub fn build_material_nodes(graph: &mut SceneGraph, target: NodeIndex, materials: &[SourceMaterial]) -> usize {
        let mut added = 0;
        for material in materials {
            let content = NodeContent::Material(MaterialBuilder::build_material(material));
            if let Some(node) = graph.add_child(target, &material.name, Some(content)) {
                graph.make_end_point(node);
                added += 1;
            }
        }
        added
    }
}
