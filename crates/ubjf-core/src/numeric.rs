//! The numeric decoder (§4.D): fixed-width integers and floats, always
//! big-endian on the wire.
//!
//! `from_be_bytes` already performs the swap-or-no-op `spec.md` §9
//! describes picking with `cfg(target_endian)` — there is no host-endianness
//! branch to write in Rust.

use crate::source::{ByteSource, SourceError};

pub(crate) fn read_u8<S: ByteSource>(src: &mut S) -> Result<u8, SourceError<S::Error>> {
    let mut buf = [0u8; 1];
    src.read(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_i8<S: ByteSource>(src: &mut S) -> Result<i8, SourceError<S::Error>> {
    Ok(read_u8(src)? as i8)
}

pub(crate) fn read_i16<S: ByteSource>(src: &mut S) -> Result<i16, SourceError<S::Error>> {
    let mut buf = [0u8; 2];
    src.read(&mut buf)?;
    Ok(i16::from_be_bytes(buf))
}

pub(crate) fn read_i32<S: ByteSource>(src: &mut S) -> Result<i32, SourceError<S::Error>> {
    let mut buf = [0u8; 4];
    src.read(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub(crate) fn read_i64<S: ByteSource>(src: &mut S) -> Result<i64, SourceError<S::Error>> {
    let mut buf = [0u8; 8];
    src.read(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub(crate) fn read_f32<S: ByteSource>(src: &mut S) -> Result<f32, SourceError<S::Error>> {
    let mut buf = [0u8; 4];
    src.read(&mut buf)?;
    Ok(f32::from_be_bytes(buf))
}

pub(crate) fn read_f64<S: ByteSource>(src: &mut S) -> Result<f64, SourceError<S::Error>> {
    let mut buf = [0u8; 8];
    src.read(&mut buf)?;
    Ok(f64::from_be_bytes(buf))
}
