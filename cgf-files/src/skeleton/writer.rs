use glam::{Quat, Vec4};
use log::{debug, error};

use crate::ChunkFileError;
use crate::cgf::writer::CgfSaver;
use crate::common::types::Matrix34;
use crate::common::writer::write_cstring;
use crate::skeleton::types::MAX_BONE_NAME_LENGTH;

const QUAT_COMPARE_THRESHOLD: f32 = 0.09;

/// Component-wise comparison that treats `q` and `-q` as the same rotation.
pub fn is_quat_equivalent(a: Quat, b: Quat, epsilon: f32) -> bool {
    let a = Vec4::from(a);
    let b = Vec4::from(b);
    (a - b).abs().max_element() <= epsilon || (a + b).abs().max_element() <= epsilon
}

/// Validates the skinning info and appends the bone entity, bone name and initial matrix chunks.
/// On error no chunk has been appended.
pub fn prepare_skeleton_data_chunks(saver: &mut CgfSaver) -> Result<(), ChunkFileError> {
    let skinning_info = &saver.content().skinning_info;
    let bones_desc = &skinning_info.bones_desc;

    let Some(root_bone) = bones_desc.first() else {
        error!("Skeleton has no bones.");
        return Err(ChunkFileError::SkeletonError {
            reason: "no bone descriptors",
        });
    };

    let (_, root_rotation, _) = root_bone.default_b2w.to_scale_rotation_translation();
    if !is_quat_equivalent(root_rotation, Quat::IDENTITY, QUAT_COMPARE_THRESHOLD) {
        error!("Skeleton root bone orientation is not identity.");
        return Err(ChunkFileError::SkeletonError {
            reason: "root bone orientation is not identity",
        });
    }

    if skinning_info.bone_entities.len() != bones_desc.len() {
        error!(
            "Bone description number ({}) and bone entity data number ({}) don't match.",
            bones_desc.len(),
            skinning_info.bone_entities.len()
        );
        return Err(ChunkFileError::SkeletonError {
            reason: "bone descriptor and bone entity counts differ",
        });
    }

    let bone_entities = skinning_info
        .bone_entities
        .iter()
        .map(|entity| {
            let mut entity = *entity;
            entity.phys.phys_geom = -1;
            entity
        })
        .collect::<Vec<_>>();

    let mut bone_names = Vec::with_capacity(MAX_BONE_NAME_LENGTH * bones_desc.len() + 1);
    for bone in bones_desc {
        write_cstring(&mut bone_names, &bone.name)?;
    }
    bone_names.push(0);

    let initial_matrices = bones_desc
        .iter()
        .map(|bone| Matrix34::from(&bone.default_b2w))
        .collect::<Vec<_>>();

    saver.save_bones(&bone_entities)?;
    saver.save_bone_names(&bone_names, bones_desc.len())?;
    saver.save_bone_initial_matrices(&initial_matrices)?;

    debug!("Prepared skeleton chunks for {} bones", bones_desc.len());
    Ok(())
}
