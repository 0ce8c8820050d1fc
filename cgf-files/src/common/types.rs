use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use cgf_files_derive_parseable::{Parse, Write};
use glam::{Affine3A, Mat3A, Vec3A};

use crate::ChunkFileError;
use crate::common::reader::Parseable;

#[derive(Debug, Clone, PartialEq)]
pub struct IffChunk {
    pub magic: u32,
    pub size: u32,
    pub data: Vec<u8>,
}

impl IffChunk {
    pub fn new(magic: u32, data: Vec<u8>) -> Result<IffChunk, ChunkFileError> {
        let size = u32::try_from(data.len()).map_err(|_| ChunkFileError::ChunkTooLarge {
            magic: magic_to_string(magic),
        })?;

        Ok(IffChunk { magic, size, data })
    }

    pub fn magic_str(&self) -> String {
        magic_to_string(self.magic)
    }

    pub fn parse<T: Parseable<T>>(&self) -> Result<T, ChunkFileError> {
        T::parse(&mut Cursor::new(&self.data))
    }

    pub fn read_next_chunk<R: Read>(rdr: &mut R) -> Result<IffChunk, ChunkFileError> {
        let magic = rdr.read_u32::<LittleEndian>()?;
        let size = rdr.read_u32::<LittleEndian>()?;
        let mut data = vec![0; size as usize];
        rdr.read_exact(&mut data)?;

        Ok(IffChunk { magic, size, data })
    }

    pub fn write_chunk<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), ChunkFileError> {
        wtr.write_u32::<LittleEndian>(self.magic)?;
        wtr.write_u32::<LittleEndian>(self.size)?;
        wtr.write_all(&self.data)?;
        Ok(())
    }
}

impl Parseable<IffChunk> for IffChunk {
    fn parse<R: Read>(rdr: &mut R) -> Result<IffChunk, ChunkFileError> {
        IffChunk::read_next_chunk(rdr)
    }
}

pub fn magic_to_string(magic: u32) -> String {
    String::from_utf8_lossy(&magic.to_le_bytes()[..]).into_owned()
}

/// 3x4 matrix stored as four columns: the three basis axes followed by the translation.
#[derive(Debug, Copy, Clone, PartialEq, Default, Parse, Write)]
pub struct Matrix34 {
    pub columns: [[f32; 3]; 4],
}

impl From<&Affine3A> for Matrix34 {
    fn from(value: &Affine3A) -> Self {
        let axis = |v: Vec3A| [v.x, v.y, v.z];
        Matrix34 {
            columns: [
                axis(value.matrix3.x_axis),
                axis(value.matrix3.y_axis),
                axis(value.matrix3.z_axis),
                axis(value.translation),
            ],
        }
    }
}

impl From<&Matrix34> for Affine3A {
    fn from(value: &Matrix34) -> Self {
        let axis = |c: [f32; 3]| Vec3A::from_array(c);
        Affine3A {
            matrix3: Mat3A::from_cols(
                axis(value.columns[0]),
                axis(value.columns[1]),
                axis(value.columns[2]),
            ),
            translation: axis(value.columns[3]),
        }
    }
}
