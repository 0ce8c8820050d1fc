use std::path::{Path, PathBuf};

use cgf_files::cgf::types::{ContentCgf, Mesh, NodeCgf, PhysicalizeType};
use cgf_files::skeleton::types::SkinningInfo;

use crate::events::phase::Phase;
use crate::scene::Scene;
use crate::scene::graph::NodeIndex;
use crate::scene::manifest::groups::{MeshGroup, SkeletonGroup, SkinGroup};

/// Identifies a [`CallContext`] variant when binding processors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ContextKind {
    PreExport,
    Export,
    PostExport,
    CgfMeshGroup,
    CgfContainer,
    CgfNode,
    CgfMeshNode,
    ChrSkeletonGroup,
    Skeleton,
    SkinGroup,
}

/// Everything that can be dispatched through a
/// [`CallProcessorRegistry`](crate::events::registry::CallProcessorRegistry).
/// Narrower contexts borrow from the broader context they were created from.
pub enum CallContext<'a> {
    PreExport(PreExportContext<'a>),
    Export(ExportContext<'a>),
    PostExport(PostExportContext<'a>),
    CgfMeshGroup(CgfMeshGroupContext<'a>),
    CgfContainer(CgfContainerContext<'a>),
    CgfNode(CgfNodeContext<'a>),
    CgfMeshNode(CgfMeshNodeContext<'a>),
    ChrSkeletonGroup(ChrSkeletonGroupContext<'a>),
    Skeleton(SkeletonContext<'a>),
    SkinGroup(SkinGroupContext<'a>),
}

impl CallContext<'_> {
    pub fn kind(&self) -> ContextKind {
        match self {
            CallContext::PreExport(_) => ContextKind::PreExport,
            CallContext::Export(_) => ContextKind::Export,
            CallContext::PostExport(_) => ContextKind::PostExport,
            CallContext::CgfMeshGroup(_) => ContextKind::CgfMeshGroup,
            CallContext::CgfContainer(_) => ContextKind::CgfContainer,
            CallContext::CgfNode(_) => ContextKind::CgfNode,
            CallContext::CgfMeshNode(_) => ContextKind::CgfMeshNode,
            CallContext::ChrSkeletonGroup(_) => ContextKind::ChrSkeletonGroup,
            CallContext::Skeleton(_) => ContextKind::Skeleton,
            CallContext::SkinGroup(_) => ContextKind::SkinGroup,
        }
    }

    /// Pipeline level contexts have no phase.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            CallContext::PreExport(_) | CallContext::Export(_) | CallContext::PostExport(_) => None,
            CallContext::CgfMeshGroup(context) => Some(context.phase),
            CallContext::CgfContainer(context) => Some(context.phase),
            CallContext::CgfNode(context) => Some(context.phase),
            CallContext::CgfMeshNode(context) => Some(context.phase),
            CallContext::ChrSkeletonGroup(context) => Some(context.phase),
            CallContext::Skeleton(context) => Some(context.phase),
            CallContext::SkinGroup(context) => Some(context.phase),
        }
    }
}

pub struct PreExportContext<'a> {
    pub scene: &'a Scene,
}

pub struct ExportContext<'a> {
    pub scene: &'a Scene,
    pub output_directory: &'a Path,
}

pub struct PostExportContext<'a> {
    pub scene: &'a Scene,
    pub output_directory: &'a Path,
    pub written_files: &'a [PathBuf],
}

pub struct CgfMeshGroupContext<'a> {
    pub scene: &'a Scene,
    pub output_directory: &'a Path,
    pub group_name: &'a str,
    pub group: &'a MeshGroup,
    pub phase: Phase,
}

impl<'a> CgfMeshGroupContext<'a> {
    pub fn new(
        scene: &'a Scene,
        output_directory: &'a Path,
        group_name: &'a str,
        group: &'a MeshGroup,
        phase: Phase,
    ) -> CgfMeshGroupContext<'a> {
        CgfMeshGroupContext {
            scene,
            output_directory,
            group_name,
            group,
            phase,
        }
    }
}

pub struct CgfContainerContext<'a> {
    pub scene: &'a Scene,
    pub group_name: &'a str,
    pub group: &'a MeshGroup,
    pub container: &'a mut ContentCgf,
    pub phase: Phase,
}

impl<'a> CgfContainerContext<'a> {
    pub fn new(parent: &CgfMeshGroupContext<'a>, container: &'a mut ContentCgf, phase: Phase) -> CgfContainerContext<'a> {
        CgfContainerContext {
            scene: parent.scene,
            group_name: parent.group_name,
            group: parent.group,
            container,
            phase,
        }
    }
}

/// One target node of a mesh group. `node` is added to the container once all phases ran.
pub struct CgfNodeContext<'a> {
    pub scene: &'a Scene,
    pub group_name: &'a str,
    pub group: &'a MeshGroup,
    pub container: &'a mut ContentCgf,
    pub node: &'a mut NodeCgf,
    pub node_name: &'a str,
    pub node_index: NodeIndex,
    pub physicalize_type: PhysicalizeType,
    pub phase: Phase,
}

impl<'a> CgfNodeContext<'a> {
    pub fn new(
        parent: &'a mut CgfContainerContext<'_>,
        node: &'a mut NodeCgf,
        node_name: &'a str,
        node_index: NodeIndex,
        physicalize_type: PhysicalizeType,
        phase: Phase,
    ) -> CgfNodeContext<'a> {
        CgfNodeContext {
            scene: parent.scene,
            group_name: parent.group_name,
            group: parent.group,
            container: &mut *parent.container,
            node,
            node_name,
            node_index,
            physicalize_type,
            phase,
        }
    }
}

pub struct CgfMeshNodeContext<'a> {
    pub scene: &'a Scene,
    pub group_name: &'a str,
    pub group: &'a MeshGroup,
    pub container: &'a mut ContentCgf,
    pub mesh: &'a mut Mesh,
    pub node_name: &'a str,
    pub node_index: NodeIndex,
    pub physicalize_type: PhysicalizeType,
    pub phase: Phase,
}

impl<'a> CgfMeshNodeContext<'a> {
    pub fn new(parent: &'a mut CgfNodeContext<'_>, mesh: &'a mut Mesh, phase: Phase) -> CgfMeshNodeContext<'a> {
        CgfMeshNodeContext {
            scene: parent.scene,
            group_name: parent.group_name,
            group: parent.group,
            container: &mut *parent.container,
            mesh,
            node_name: parent.node_name,
            node_index: parent.node_index,
            physicalize_type: parent.physicalize_type,
            phase,
        }
    }

    pub fn is_physics_proxy(&self) -> bool {
        matches!(
            self.physicalize_type,
            PhysicalizeType::DefaultProxy | PhysicalizeType::Obstruct
        )
    }
}

pub struct ChrSkeletonGroupContext<'a> {
    pub scene: &'a Scene,
    pub output_directory: &'a Path,
    pub group_name: &'a str,
    pub group: &'a SkeletonGroup,
    pub phase: Phase,
}

/// Shared by CHR and SKIN export: fills `skinning_info` with the hierarchy below `root_bone_name`.
pub struct SkeletonContext<'a> {
    pub scene: &'a Scene,
    pub root_bone_name: &'a str,
    pub skinning_info: &'a mut SkinningInfo,
    pub phase: Phase,
}

pub struct SkinGroupContext<'a> {
    pub scene: &'a Scene,
    pub output_directory: &'a Path,
    pub group_name: &'a str,
    pub group: &'a SkinGroup,
    pub phase: Phase,
}
