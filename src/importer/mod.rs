use thiserror::Error;

pub mod bone_builder;
pub mod material_builder;
pub mod mesh_builder;
pub mod scene_importer;
pub mod scene_system;
pub mod skin_builder;
pub mod source;


#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O Error")]
    IOError(#[from] std::io::Error),
    #[error("Malformed scene description")]
    JsonError(#[from] serde_json::Error),
    #[error("Scene has no root node")]
    NoRootNode,
}
