use crate::scene::Scene;
use crate::scene::content::ContentKind;
use crate::scene::manifest::groups::{ManifestObject, ManifestObjectType};
use crate::scene::manifest::rules::{Rule, RuleType};
use crate::scene::selection::SceneGraphSelector;
use crate::scene::views::{Traversal, of_kind};

/// Knowledge about manifest objects that tools need without hard coding each group type:
/// how a new object starts out, which rules can still be added and how objects are grouped.
pub trait ManifestMetaInfoProvider {
    /// Brings a freshly created object into its default state for `scene`.
    fn initialize_object(&self, scene: &Scene, object: &mut ManifestObject);

    /// Rule kinds that can still be added to `object`.
    fn available_modifiers(&self, object: &ManifestObject) -> Vec<RuleType>;

    /// `(category name, object type)` pairs, in display order.
    fn category_assignments(&self) -> Vec<(&'static str, ManifestObjectType)>;
}

#[derive(Debug, Default)]
pub struct DefaultManifestMetaInfo {}

impl DefaultManifestMetaInfo {
    pub fn new() -> DefaultManifestMetaInfo {
        DefaultManifestMetaInfo {}
    }
}

impl ManifestMetaInfoProvider for DefaultManifestMetaInfo {
    fn initialize_object(&self, scene: &Scene, object: &mut ManifestObject) {
        let graph = scene.graph();
        match object {
            ManifestObject::MeshGroup(group) => {
                SceneGraphSelector::select_all(graph, &mut group.node_selection);
                for rule in group.rules.rules_mut() {
                    if let Rule::Physics(physics) = rule {
                        SceneGraphSelector::unselect_all(graph, &mut physics.node_selection);
                    }
                }
            }
            ManifestObject::SkinGroup(group) => {
                SceneGraphSelector::select_all(graph, &mut group.node_selection);
            }
            ManifestObject::SkeletonGroup(group) => {
                if group.selected_root_bone.is_empty() {
                    let nodes = graph.downwards(graph.get_root(), Traversal::BreadthFirst);
                    if let Some(name) = of_kind(graph, nodes, ContentKind::RootBone)
                        .next()
                        .and_then(|index| graph.get_node_name(index))
                    {
                        group.selected_root_bone = name.to_string();
                    }
                }
            }
        }
    }

    fn available_modifiers(&self, object: &ManifestObject) -> Vec<RuleType> {
        let rules = object.rules();
        let candidates: &[RuleType] = match object {
            ManifestObject::MeshGroup(_) => &[
                RuleType::Comment,
                RuleType::Material,
                RuleType::MeshAdvanced,
                RuleType::Origin,
                RuleType::Physics,
            ],
            ManifestObject::SkeletonGroup(_) | ManifestObject::SkinGroup(_) => &[RuleType::Comment],
        };

        // comments can be added any number of times, every other rule once
        candidates
            .iter()
            .copied()
            .filter(|rule_type| *rule_type == RuleType::Comment || !rules.contains_rule_type(*rule_type))
            .collect()
    }

    fn category_assignments(&self) -> Vec<(&'static str, ManifestObjectType)> {
        vec![
            ("Meshes", ManifestObjectType::MeshGroup),
            ("Actors", ManifestObjectType::SkeletonGroup),
            ("Skins", ManifestObjectType::SkinGroup),
        ]
    }
}
