use cgf_files_derive_parseable::{Parse, Write};
use glam::Affine3A;

use crate::cgf::types::truncate_name;

pub const FOURCC_BONE_ENTITIES: u32 = u32::from_le_bytes(*b"BONE");
pub const FOURCC_BONE_NAMES: u32 = u32::from_le_bytes(*b"BONL");
pub const FOURCC_BONE_INITIAL_MATRICES: u32 = u32::from_le_bytes(*b"BONM");

/// Bone names are stored in 32 byte fields, including the terminator.
pub const MAX_BONE_NAME_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct BoneDesc {
    pub name: String,
    pub controller_id: u32,
    pub default_b2w: Affine3A,
    pub default_w2b: Affine3A,
}

impl BoneDesc {
    pub fn new(name: &str, controller_id: u32, default_b2w: Affine3A) -> BoneDesc {
        BoneDesc {
            name: truncate_name(name, MAX_BONE_NAME_LENGTH).to_string(),
            controller_id,
            default_b2w,
            default_w2b: default_b2w.inverse(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Parse, Write)]
pub struct BonePhysics {
    pub phys_geom: i32,
    pub flags: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Parse, Write)]
pub struct BoneEntity {
    pub bone_id: i32,
    pub parent_id: i32,
    pub n_children: i32,
    pub controller_id: u32,
    pub prop: [u8; 32],
    pub phys: BonePhysics,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinningInfo {
    pub bones_desc: Vec<BoneDesc>,
    pub bone_entities: Vec<BoneEntity>,
}
