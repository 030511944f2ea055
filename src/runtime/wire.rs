//! The binary encoding shared by proxies and stubs.
//!
//! Values are written back to back with no framing or tags. Numbers are
//! little endian, `bool` is one byte, strings and byte buffers carry a `u64`
//! length prefix. Both sides must therefore agree on the exact sequence of
//! types, which is what the generated code guarantees.

use std::string::FromUtf8Error;

use super::Status;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
    #[error("length prefix {0} does not fit in memory")]
    LengthOverflow(u64),
}

/// A value with a fixed wire encoding.
pub trait Wire: Sized {
    fn encode(&self, writer: &mut WireWriter);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError>;
}

#[derive(Clone, Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> WireWriter {
        WireWriter::default()
    }

    pub fn write<T: Wire>(&mut self, value: &T) {
        value.encode(self);
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, value: &str) {
        self.write_blob(value.as_bytes());
    }

    pub fn write_blob(&mut self, value: &[u8]) {
        self.write(&(value.len() as u64));
        self.write_raw(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Clone, Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> WireReader<'a> {
        WireReader { buf }
    }

    pub fn read<T: Wire>(&mut self) -> Result<T, WireError> {
        T::decode(self)
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.buf.len() < len {
            return Err(WireError::UnexpectedEnd {
                needed: len,
                remaining: self.buf.len(),
            });
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_raw(N)?);
        Ok(out)
    }

    pub fn read_blob(&mut self) -> Result<&'a [u8], WireError> {
        let len: u64 = self.read()?;
        let len = usize::try_from(len).map_err(|_| WireError::LengthOverflow(len))?;
        self.read_raw(len)
    }

    pub fn read_string(&mut self) -> Result<String, WireError> {
        Ok(String::from_utf8(self.read_blob()?.to_vec())?)
    }

    pub fn remaining(&self) -> usize {
        self.buf.len()
    }
}

macro_rules! impl_wire_for_numbers {
    ($($ty:ty),* $(,)?) => {$(
        impl Wire for $ty {
            fn encode(&self, writer: &mut WireWriter) {
                writer.write_raw(&self.to_le_bytes());
            }

            fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
                reader.read_array().map(<$ty>::from_le_bytes)
            }
        }
    )*};
}

impl_wire_for_numbers!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl Wire for bool {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write(&u8::from(*self));
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read::<u8>().map(|byte| byte != 0)
    }
}

impl Wire for String {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write_str(self);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read_string()
    }
}

impl Wire for Vec<u8> {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write_blob(self);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read_blob().map(<[u8]>::to_vec)
    }
}

impl Wire for Status {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read().map(Status)
    }
}

/// A 128-bit unique id, transferred as its 16 raw bytes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Guid(pub [u8; 16]);

impl Wire for Guid {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write_raw(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read_array().map(Guid)
    }
}

/// The transmissible identity of an object living on the other side.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

impl Wire for ObjectId {
    fn encode(&self, writer: &mut WireWriter) {
        writer.write(&self.0);
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        reader.read().map(ObjectId)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip<T: Wire + PartialEq + Debug>(values: &[T]) {
        for value in values {
            let mut writer = WireWriter::new();
            writer.write(value);
            let bytes = writer.into_bytes();
            let mut reader = WireReader::new(&bytes);
            assert_eq!(&reader.read::<T>().unwrap(), value);
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn test_every_primitive_round_trips() {
        round_trip(&[false, true]);
        round_trip(&[i8::MIN, -1, 0, i8::MAX]);
        round_trip(&[i16::MIN, 0, i16::MAX]);
        round_trip(&[i32::MIN, -1, 0, 5, i32::MAX]);
        round_trip(&[i64::MIN, 0, i64::MAX]);
        round_trip(&[0u8, 0x7f, u8::MAX]);
        round_trip(&[0u16, u16::MAX]);
        round_trip(&[0u32, 0x7FFF_FFFF, u32::MAX]);
        round_trip(&[0u64, u64::MAX]);
        round_trip(&[0.0f32, -1.5, f32::MAX, f32::MIN_POSITIVE]);
        round_trip(&[0.0f64, 3.25, f64::MAX]);
        round_trip(&[String::new(), "héllo".to_string()]);
        round_trip(&[Vec::new(), vec![0u8, 1, 255]]);
        round_trip(&[Status::OK, Status::FAIL, Status(42)]);
        round_trip(&[Guid::default(), Guid([0xAB; 16])]);
        round_trip(&[ObjectId(0), ObjectId(u64::MAX)]);
    }

    #[test]
    fn test_layout_is_little_endian_and_untagged() {
        let mut writer = WireWriter::new();
        writer.write(&2i32);
        writer.write(&true);
        writer.write_str("ab");
        assert_eq!(
            writer.as_bytes(),
            [2, 0, 0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 0, b'a', b'b']
        );
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let mut reader = WireReader::new(&[1, 2]);
        assert!(matches!(
            reader.read::<i32>(),
            Err(WireError::UnexpectedEnd {
                needed: 4,
                remaining: 2
            })
        ));
    }

    #[test]
    fn test_length_prefix_beyond_buffer() {
        let mut writer = WireWriter::new();
        writer.write(&100u64);
        writer.write_raw(b"abc");
        let bytes = writer.into_bytes();
        assert!(matches!(
            WireReader::new(&bytes).read_string(),
            Err(WireError::UnexpectedEnd {
                needed: 100,
                remaining: 3
            })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = WireWriter::new();
        writer.write_blob(&[0xff, 0xfe]);
        let bytes = writer.into_bytes();
        assert!(matches!(
            WireReader::new(&bytes).read::<String>(),
            Err(WireError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_failure_maps_to_status() {
        let error = WireReader::new(&[]).read::<u8>().unwrap_err();
        assert_eq!(Status::from(error), Status::DESERIALIZATION_FAILED);
    }
}
