use thiserror::Error;

pub mod group;
pub mod material;

pub const MTL_EXTENSION: &str = "mtl";

#[derive(Error, Debug)]
pub enum MtlError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error("Malformed material file: {0}")]
    DeserializeError(#[from] quick_xml::DeError),

    #[error("Failed to serialize the material group: {0}")]
    SerializeError(String),
}
