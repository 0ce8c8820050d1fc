use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Vec2, Vec3};
use log::{debug, trace};
use tempfile::NamedTempFile;

use crate::ChunkFileError;
use crate::common::types::IffChunk;

pub trait Writable {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError>;
}

impl Writable for u8 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        Ok(wtr.write_u8(*self)?)
    }
}

impl Writable for u16 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        Ok(wtr.write_u16::<LittleEndian>(*self)?)
    }
}

impl Writable for u32 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        Ok(wtr.write_u32::<LittleEndian>(*self)?)
    }
}

impl Writable for i32 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        Ok(wtr.write_i32::<LittleEndian>(*self)?)
    }
}

impl Writable for f32 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        Ok(wtr.write_f32::<LittleEndian>(*self)?)
    }
}

impl Writable for Vec2 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        wtr.write_f32::<LittleEndian>(self.x)?;
        wtr.write_f32::<LittleEndian>(self.y)?;
        Ok(())
    }
}

impl Writable for Vec3 {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        wtr.write_f32::<LittleEndian>(self.x)?;
        wtr.write_f32::<LittleEndian>(self.y)?;
        wtr.write_f32::<LittleEndian>(self.z)?;
        Ok(())
    }
}

impl<T: Writable, const N: usize> Writable for [T; N] {
    fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        for element in self {
            element.write(wtr)?;
        }
        Ok(())
    }
}

pub(crate) fn write_cstring<W: Write>(wtr: &mut W, text: &str) -> Result<(), ChunkFileError> {
    if text.as_bytes().contains(&0) {
        return Err(ChunkFileError::FormatError {
            reason: "Strings must not contain NUL bytes",
        });
    }
    wtr.write_all(text.as_bytes())?;
    wtr.write_u8(0)?;
    Ok(())
}

pub(crate) fn write_count<W: Write>(wtr: &mut W, count: usize) -> Result<(), ChunkFileError> {
    let count = u32::try_from(count).map_err(|_| ChunkFileError::FormatError {
        reason: "Element count exceeds u32",
    })?;
    Ok(wtr.write_u32::<LittleEndian>(count)?)
}

/// Writes a `u32` element count followed by the elements, see `read_counted`.
pub(crate) fn write_counted<T: Writable, W: Write>(wtr: &mut W, elements: &[T]) -> Result<(), ChunkFileError> {
    write_count(wtr, elements.len())?;
    for element in elements {
        element.write(wtr)?;
    }
    Ok(())
}

/// An in-memory list of chunks that is flushed to disk in one go.
#[derive(Debug, Default)]
pub struct ChunkFile {
    pub chunks: Vec<IffChunk>,
}

impl ChunkFile {
    pub fn new() -> ChunkFile {
        ChunkFile::default()
    }

    pub fn add_chunk(&mut self, magic: u32, data: Vec<u8>) -> Result<usize, ChunkFileError> {
        let chunk = IffChunk::new(magic, data)?;
        trace!("Adding chunk {} ({} bytes)", chunk.magic_str(), chunk.size);
        self.chunks.push(chunk);
        Ok(self.chunks.len() - 1)
    }

    pub fn write_to<W: Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        for chunk in &self.chunks {
            chunk.write_chunk(wtr)?;
        }
        Ok(())
    }

    /// Writes into a temporary file in the target directory and persists it over `path`, so
    /// readers never observe a partial file.
    pub fn write(&self, path: &Path) -> Result<(), ChunkFileError> {
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(directory)?;
        let mut wtr = BufWriter::new(temp_file.as_file_mut());
        self.write_to(&mut wtr)?;
        wtr.flush()?;
        drop(wtr);

        temp_file.persist(path).map_err(|err| err.error)?;
        debug!("Wrote {} chunks to {}", self.chunks.len(), path.display());
        Ok(())
    }
}
