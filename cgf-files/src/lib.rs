use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkFileError {
    #[error("The file's magic value does not match the expectation {magic}")]
    InvalidMagicValue { magic: u32 },

    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error("Unsupported chunk file version {version:#x}")]
    UnsupportedVersion { version: u32 },

    /// The skeleton data cannot be turned into chunks, nothing has been written.
    #[error("Invalid skeleton: {reason}")]
    SkeletonError { reason: &'static str },

    #[error("Chunk {magic} is larger than the format allows")]
    ChunkTooLarge { magic: String },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    StringConversationError(#[from] std::ffi::IntoStringError),

    #[error(transparent)]
    UTF8ConversationError(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    EnumConversationError(#[from] num_enum::TryFromPrimitiveError<cgf::types::FileType>),
}

pub mod cgf;
pub mod common;
pub mod skeleton;
