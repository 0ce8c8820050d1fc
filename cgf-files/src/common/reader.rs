use std::ffi::CString;
use std::io::ErrorKind::UnexpectedEof;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Vec2, Vec3};

use crate::ChunkFileError;
use crate::common::types::IffChunk;

pub trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ChunkFileError>;
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ChunkFileError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<u16> for u16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u16, ChunkFileError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ChunkFileError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<i32> for i32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<i32, ChunkFileError> {
        Ok(rdr.read_i32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ChunkFileError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

impl Parseable<Vec2> for Vec2 {
    fn parse<R: Read>(rdr: &mut R) -> Result<Vec2, ChunkFileError> {
        Ok(Vec2::new(
            rdr.read_f32::<LittleEndian>()?,
            rdr.read_f32::<LittleEndian>()?,
        ))
    }
}

impl Parseable<Vec3> for Vec3 {
    fn parse<R: Read>(rdr: &mut R) -> Result<Vec3, ChunkFileError> {
        Ok(Vec3::new(
            rdr.read_f32::<LittleEndian>()?,
            rdr.read_f32::<LittleEndian>()?,
            rdr.read_f32::<LittleEndian>()?,
        ))
    }
}

impl<T: Parseable<T> + Copy + Default, const N: usize> Parseable<[T; N]> for [T; N] {
    fn parse<R: Read>(rdr: &mut R) -> Result<[T; N], ChunkFileError> {
        let mut array = [T::default(); N];
        for element in array.iter_mut() {
            *element = T::parse(rdr)?;
        }
        Ok(array)
    }
}

pub(crate) fn read_cstring<R: Read>(rdr: &mut R) -> Result<CString, ChunkFileError> {
    let mut buf = Vec::new();
    loop {
        let c = rdr.read_u8()?;
        if c == 0 {
            // SAFETY: We can ensure, that there are no nul-bytes in buf
            return Ok(unsafe { CString::from_vec_unchecked(buf) });
        }
        buf.push(c);
    }
}

pub(crate) fn read_string<R: Read>(rdr: &mut R) -> Result<String, ChunkFileError> {
    Ok(read_cstring(rdr)?.into_string()?)
}

/// Reads a `u32` element count followed by that many elements.
pub(crate) fn read_counted<T: Parseable<T>, R: Read>(rdr: &mut R) -> Result<Vec<T>, ChunkFileError> {
    let count = rdr.read_u32::<LittleEndian>()?;
    (0..count).map(|_| T::parse(rdr)).collect()
}

pub fn read_chunk_array<T: Parseable<T>, R: Read>(rdr: &mut R) -> Result<Vec<T>, ChunkFileError> {
    let mut list = Vec::<T>::new();
    let mut element = T::parse(rdr);
    while element.is_ok() {
        list.push(element?);
        element = T::parse(rdr);
    }

    // weird error handling because when EoF, we get that inside a parser error.
    match element {
        Err(ChunkFileError::IOError(internal)) if internal.kind() == UnexpectedEof => (),
        err => return err.map(|_| Vec::with_capacity(0)),
    };
    Ok(list)
}

pub(crate) fn get_optional_chunk_by_name<T: Parseable<T>>(
    chunk_list: &[IffChunk],
    chunk_magic: &str,
) -> Result<Option<T>, ChunkFileError> {
    chunk_list
        .iter()
        .find(|chunk| chunk.magic_str().eq(chunk_magic))
        .map(|chunk| chunk.parse::<T>())
        .transpose()
}
