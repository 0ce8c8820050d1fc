use serde::{Deserialize, Serialize};

use crate::scene::manifest::rules::RuleContainer;
use crate::scene::selection::SceneNodeSelectionList;

/// Everything selected is compiled into one `.cgf`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MeshGroup {
    #[serde(default)]
    pub node_selection: SceneNodeSelectionList,
    #[serde(default)]
    pub rules: RuleContainer,
}

/// The bone hierarchy below `selected_root_bone` is compiled into one `.chr`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SkeletonGroup {
    #[serde(default)]
    pub selected_root_bone: String,
    #[serde(default)]
    pub rules: RuleContainer,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SkinGroup {
    #[serde(default)]
    pub node_selection: SceneNodeSelectionList,
    #[serde(default)]
    pub rules: RuleContainer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ManifestObjectType {
    MeshGroup,
    SkeletonGroup,
    SkinGroup,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "$type")]
pub enum ManifestObject {
    MeshGroup(MeshGroup),
    SkeletonGroup(SkeletonGroup),
    SkinGroup(SkinGroup),
}

impl ManifestObject {
    pub fn object_type(&self) -> ManifestObjectType {
        match self {
            ManifestObject::MeshGroup(_) => ManifestObjectType::MeshGroup,
            ManifestObject::SkeletonGroup(_) => ManifestObjectType::SkeletonGroup,
            ManifestObject::SkinGroup(_) => ManifestObjectType::SkinGroup,
        }
    }

    pub fn rules(&self) -> &RuleContainer {
        match self {
            ManifestObject::MeshGroup(group) => &group.rules,
            ManifestObject::SkeletonGroup(group) => &group.rules,
            ManifestObject::SkinGroup(group) => &group.rules,
        }
    }

    pub fn rules_mut(&mut self) -> &mut RuleContainer {
        match self {
            ManifestObject::MeshGroup(group) => &mut group.rules,
            ManifestObject::SkeletonGroup(group) => &mut group.rules,
            ManifestObject::SkinGroup(group) => &mut group.rules,
        }
    }

    pub fn as_mesh_group(&self) -> Option<&MeshGroup> {
        match self {
            ManifestObject::MeshGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_skeleton_group(&self) -> Option<&SkeletonGroup> {
        match self {
            ManifestObject::SkeletonGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_skin_group(&self) -> Option<&SkinGroup> {
        match self {
            ManifestObject::SkinGroup(group) => Some(group),
            _ => None,
        }
    }
}
