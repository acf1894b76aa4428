use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Every stream written with a header starts with these bytes.
pub const STREAM_MAGIC: &[u8; 8] = b"HRSTREAM";
/// Current stream layout version.
pub const STREAM_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum ObjStreamError {
    #[error("failed to encode value: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode value: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("the stream is not in the required mode")]
    WrongMode,
    #[error("the stream does not start with a valid header")]
    BadHeader,
    #[error("stream version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
    /// The stream contains an object id that could not be turned into the
    /// expected object. The reader has no way of knowing how long the
    /// unknown record is, so the rest of the stream is lost.
    #[error("unexpected object ({module_id}, {class_id}) in stream, stream is corrupt")]
    UnexpectedObject { module_id: u16, class_id: u16 },
}

fn config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Write half of an object stream.
#[derive(Debug, Default)]
pub struct ObjStreamWriter {
    buf: Vec<u8>,
}

impl ObjStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer that already contains the stream header.
    pub fn with_header() -> Self {
        let mut res = Self::new();
        res.buf.extend_from_slice(STREAM_MAGIC);
        res.buf.extend_from_slice(&STREAM_VERSION.to_le_bytes());
        res
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ObjStreamError> {
        let bytes = bincode::serde::encode_to_vec(value, config())?;
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Read half of an object stream.
#[derive(Debug)]
pub struct ObjStreamReader<'a> {
    data: &'a [u8],
    pos: usize,
    version: u32,
}

impl<'a> ObjStreamReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            version: STREAM_VERSION,
        }
    }

    /// Creates a reader and consumes the stream header.
    pub fn with_header(data: &'a [u8]) -> Result<Self, ObjStreamError> {
        let header_len = STREAM_MAGIC.len() + std::mem::size_of::<u32>();
        if data.len() < header_len || &data[..STREAM_MAGIC.len()] != STREAM_MAGIC {
            return Err(ObjStreamError::BadHeader);
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[STREAM_MAGIC.len()..header_len]);
        let version = u32::from_le_bytes(version);
        if version != STREAM_VERSION {
            return Err(ObjStreamError::VersionMismatch {
                found: version,
                expected: STREAM_VERSION,
            });
        }
        Ok(Self {
            data,
            pos: header_len,
            version,
        })
    }

    pub fn read<T: DeserializeOwned>(&mut self) -> Result<T, ObjStreamError> {
        let (value, read_bytes) =
            bincode::serde::decode_from_slice::<T, _>(&self.data[self.pos..], config())?;
        self.pos += read_bytes;
        Ok(value)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }
}

/// Symmetric view over either half of a stream.
///
/// Plain data that is written and read the same way can be handled with a
/// single `io` call instead of separate save and load code.
#[derive(Debug)]
pub enum ObjStream<'a, 'd> {
    Writing(&'a mut ObjStreamWriter),
    Reading(&'a mut ObjStreamReader<'d>),
}

impl<'a, 'd> ObjStream<'a, 'd> {
    pub fn is_writing(&self) -> bool {
        matches!(self, ObjStream::Writing(_))
    }

    /// Writes `value` when writing, overwrites it with the next record when reading.
    pub fn io<T: Serialize + DeserializeOwned>(
        &mut self,
        value: &mut T,
    ) -> Result<(), ObjStreamError> {
        match self {
            ObjStream::Writing(writer) => writer.write(value),
            ObjStream::Reading(reader) => {
                *value = reader.read()?;
                Ok(())
            }
        }
    }

    pub fn writer(&mut self) -> Result<&mut ObjStreamWriter, ObjStreamError> {
        match self {
            ObjStream::Writing(writer) => Ok(writer),
            ObjStream::Reading(_) => Err(ObjStreamError::WrongMode),
        }
    }

    pub fn reader(&mut self) -> Result<&mut ObjStreamReader<'d>, ObjStreamError> {
        match self {
            ObjStream::Writing(_) => Err(ObjStreamError::WrongMode),
            ObjStream::Reading(reader) => Ok(reader),
        }
    }
}
