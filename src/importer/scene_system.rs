use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Mat3A, Quat, Vec3};

use crate::importer::source::{SourceSettings, UpAxis};

/// Converts source units and axes into the target system: metres, Z up.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSystem {
    unit_size_in_meters: f32,
    bone_scale_factor: f32,
    adjust_transform: Option<(Affine3A, Affine3A)>,
}

impl Default for SceneSystem {
    fn default() -> Self {
        SceneSystem {
            unit_size_in_meters: 1.0,
            bone_scale_factor: 100.0,
            adjust_transform: None,
        }
    }
}

impl SceneSystem {
    pub fn new(settings: &SourceSettings) -> SceneSystem {
        let adjust = match settings.up_axis {
            UpAxis::Z => None,
            UpAxis::Y => Some(Quat::from_rotation_x(FRAC_PI_2)),
            UpAxis::X => Some(Quat::from_rotation_y(-FRAC_PI_2)),
        }
        .map(|rotation| {
            let adjust = Affine3A::from_quat(rotation);
            (adjust, adjust.inverse())
        });

        SceneSystem {
            unit_size_in_meters: settings.unit_size_in_meters,
            // bones are expected in centimetres
            bone_scale_factor: settings.unit_size_in_meters * 100.0,
            adjust_transform: adjust,
        }
    }

    pub fn unit_size_in_meters(&self) -> f32 {
        self.unit_size_in_meters
    }

    pub fn swap_vec3_for_up_axis(&self, vector: Vec3) -> Vec3 {
        match &self.adjust_transform {
            Some((adjust, _)) => adjust.transform_vector3(vector),
            None => vector,
        }
    }

    pub fn swap_transform_for_up_axis(&self, transform: Affine3A) -> Affine3A {
        match &self.adjust_transform {
            Some((adjust, inverse)) => *adjust * transform * *inverse,
            None => transform,
        }
    }

    pub fn convert_unit(&self, position: Vec3) -> Vec3 {
        position * self.unit_size_in_meters
    }

    /// Scales the translation only.
    pub fn convert_transform_unit(&self, transform: Affine3A) -> Affine3A {
        let mut transform = transform;
        transform.translation *= self.unit_size_in_meters;
        transform
    }

    pub fn convert_bone_unit(&self, transform: Affine3A) -> Affine3A {
        Affine3A {
            matrix3: transform.matrix3 * Mat3A::from_diagonal(Vec3::splat(self.bone_scale_factor)),
            translation: transform.translation * self.bone_scale_factor,
        }
    }
}
