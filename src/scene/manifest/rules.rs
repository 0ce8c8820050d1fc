use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::selection::SceneNodeSelectionList;

/// Stream names set to this value disable the stream export.
pub const DISABLED_STREAM_NAME: &str = "Disabled";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RuleType {
    Comment,
    Material,
    MeshAdvanced,
    Origin,
    Physics,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "$type")]
pub enum Rule {
    Comment(CommentRule),
    Material(MaterialRule),
    MeshAdvanced(MeshAdvancedRule),
    Origin(OriginRule),
    Physics(PhysicsRule),
}

impl Rule {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Rule::Comment(_) => RuleType::Comment,
            Rule::Material(_) => RuleType::Material,
            Rule::MeshAdvanced(_) => RuleType::MeshAdvanced,
            Rule::Origin(_) => RuleType::Origin,
            Rule::Physics(_) => RuleType::Physics,
        }
    }
}

/// Implemented by every rule payload so containers can be queried by type.
pub trait RuleKind: Sized {
    fn from_rule(rule: &Rule) -> Option<&Self>;
    fn from_rule_mut(rule: &mut Rule) -> Option<&mut Self>;
}

macro_rules! rule_kind {
    ($variant:ident, $ty:ty) => {
        impl RuleKind for $ty {
            fn from_rule(rule: &Rule) -> Option<&Self> {
                match rule {
                    Rule::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_rule_mut(rule: &mut Rule) -> Option<&mut Self> {
                match rule {
                    Rule::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

rule_kind!(Comment, CommentRule);
rule_kind!(Material, MaterialRule);
rule_kind!(MeshAdvanced, MeshAdvancedRule);
rule_kind!(Origin, OriginRule);
rule_kind!(Physics, PhysicsRule);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct RuleContainer {
    rules: Vec<Rule>,
}

impl RuleContainer {
    pub fn new() -> RuleContainer {
        RuleContainer::default()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    pub fn contains_rule_type(&self, rule_type: RuleType) -> bool {
        self.rules.iter().any(|rule| rule.rule_type() == rule_type)
    }

    /// The first rule of the given kind.
    pub fn find_rule<T: RuleKind>(&self) -> Option<&T> {
        self.rules.iter().find_map(T::from_rule)
    }

    pub fn find_rule_mut<T: RuleKind>(&mut self) -> Option<&mut T> {
        self.rules.iter_mut().find_map(T::from_rule_mut)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CommentRule {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MaterialRule {
    pub enable_materials: bool,
    pub remove_unused_materials: bool,
    pub update_materials: bool,
}

impl Default for MaterialRule {
    fn default() -> Self {
        MaterialRule {
            enable_materials: true,
            remove_unused_materials: false,
            update_materials: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MeshAdvancedRule {
    pub use_32bit_vertices: bool,
    pub merge_meshes: bool,
    pub vertex_color_stream_name: String,
    pub uv_stream_name: String,
}

impl Default for MeshAdvancedRule {
    fn default() -> Self {
        MeshAdvancedRule {
            use_32bit_vertices: false,
            merge_meshes: true,
            vertex_color_stream_name: String::new(),
            uv_stream_name: String::new(),
        }
    }
}

impl MeshAdvancedRule {
    pub fn is_vertex_color_stream_disabled(&self) -> bool {
        self.vertex_color_stream_name == DISABLED_STREAM_NAME
    }

    pub fn is_uv_stream_disabled(&self) -> bool {
        self.uv_stream_name == DISABLED_STREAM_NAME
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OriginRule {
    pub origin_node_name: String,
    pub use_root_as_origin: bool,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for OriginRule {
    fn default() -> Self {
        OriginRule {
            origin_node_name: String::new(),
            use_root_as_origin: true,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

/// Selects the nodes that are exported as physics proxies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PhysicsRule {
    #[serde(default)]
    pub node_selection: SceneNodeSelectionList,
}
