use std::fmt;

use crate::error::{ErrorKind, Result};
use crate::proto::Endianness;
use crate::signature::{Signature, SignatureBuilder};
use crate::{Encode, Error};

use super::{padding_to, ArrayWriter};

/// A reserved location in a [`BodyBuf`] which can be patched later.
///
/// Used for array byte lengths, which are written before the elements they
/// describe and fixed up afterwards.
#[derive(Clone, Copy)]
pub struct Reserved(usize);

/// A buffer for encoding message bodies.
///
/// The buffer carries the endianness values are encoded with and accumulates
/// the signature of every value stored at the top level, which is what ends
/// up in the `SIGNATURE` header field of the message carrying the body.
///
/// Buffers grow on demand by default. A buffer constructed with [`fixed()`]
/// refuses to grow past its capacity and fails with a buffer-too-small
/// error instead.
///
/// [`fixed()`]: Self::fixed
///
/// # Examples
///
/// ```
/// use minibus::{BodyBuf, Signature};
/// use minibus::proto::Endianness;
///
/// let mut buf = BodyBuf::with_endianness(Endianness::LITTLE);
/// buf.store(&10u8)?;
/// buf.store(&"dbus")?;
///
/// assert_eq!(buf.signature(), Signature::new(b"ys")?);
/// assert_eq!(buf.get(), &[10, 0, 0, 0, 4, 0, 0, 0, b'd', b'b', b'u', b's', 0]);
/// # Ok::<_, minibus::Error>(())
/// ```
pub struct BodyBuf {
    data: Vec<u8>,
    endianness: Endianness,
    signature: SignatureBuilder,
    limit: Option<usize>,
}

impl BodyBuf {
    /// Construct a new empty buffer in the native endianness.
    pub fn new() -> Self {
        Self::with_endianness(Endianness::NATIVE)
    }

    /// Construct a new empty buffer with the specified endianness.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            data: Vec::new(),
            endianness,
            signature: SignatureBuilder::new(),
            limit: None,
        }
    }

    /// Construct a buffer which refuses to grow past `capacity` bytes.
    ///
    /// Exceeding the capacity fails with a buffer-too-small error carrying
    /// the byte index at which the write was attempted.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            endianness: Endianness::NATIVE,
            signature: SignatureBuilder::new(),
            limit: Some(capacity),
        }
    }

    /// Get the endianness of the buffer.
    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Set the endianness of the buffer.
    ///
    /// This only makes sense on an empty buffer; values already written are
    /// not re-encoded.
    #[inline]
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// The signature of the values stored at the top level of this buffer.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The number of bytes written.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Test if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the written bytes.
    #[inline]
    pub fn get(&self) -> &[u8] {
        &self.data
    }

    /// Clear the buffer and its signature.
    pub fn clear(&mut self) {
        self.data.clear();
        self.signature.clear();
    }

    /// Store a value, extending the buffer signature with the value's.
    ///
    /// The buffer must be discarded if this errors, since it may have been
    /// partially written to.
    pub fn store<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Encode,
    {
        T::signature(&mut self.signature)?;
        value.encode(self)
    }

    /// Write an array with the given element alignment.
    ///
    /// The returned writer reserves the length prefix and back-patches it
    /// when finished. This is a low level entry point; arrays of a uniform
    /// element type are more conveniently stored through [`store()`].
    ///
    /// [`store()`]: Self::store
    pub fn write_array(&mut self, element_alignment: usize) -> Result<ArrayWriter<'_>> {
        ArrayWriter::new(self, element_alignment)
    }

    /// Pad the buffer up to `alignment`, writing zero bytes.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = padding_to(self.data.len(), alignment);
        self.reserve(padding)?;

        for _ in 0..padding {
            self.data.push(0);
        }

        Ok(())
    }

    /// Write a single byte.
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.data.push(value);
        Ok(())
    }

    /// Align to 2 and write a 16-bit unsigned integer.
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.align(2)?;
        let bytes = match self.endianness {
            Endianness::BIG => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        };
        self.put_slice(&bytes)
    }

    /// Align to 4 and write a 32-bit unsigned integer.
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        self.align(4)?;
        let bytes = match self.endianness {
            Endianness::BIG => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        };
        self.put_slice(&bytes)
    }

    /// Align to 8 and write a 64-bit unsigned integer.
    pub fn put_u64(&mut self, value: u64) -> Result<()> {
        self.align(8)?;
        let bytes = match self.endianness {
            Endianness::BIG => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        };
        self.put_slice(&bytes)
    }

    /// Align to 2 and write a 16-bit signed integer.
    #[inline]
    pub fn put_i16(&mut self, value: i16) -> Result<()> {
        self.put_u16(value as u16)
    }

    /// Align to 4 and write a 32-bit signed integer.
    #[inline]
    pub fn put_i32(&mut self, value: i32) -> Result<()> {
        self.put_u32(value as u32)
    }

    /// Align to 8 and write a 64-bit signed integer.
    #[inline]
    pub fn put_i64(&mut self, value: i64) -> Result<()> {
        self.put_u64(value as u64)
    }

    /// Align to 8 and write a double-precision float.
    #[inline]
    pub fn put_f64(&mut self, value: f64) -> Result<()> {
        self.put_u64(value.to_bits())
    }

    /// Write raw bytes without alignment.
    pub fn put_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Write raw bytes followed by a nul byte.
    pub fn put_slice_nul(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len() + 1)?;
        self.data.extend_from_slice(bytes);
        self.data.push(0);
        Ok(())
    }

    /// Align to 4 and reserve space for a 32-bit length to be patched later.
    pub fn reserve_u32(&mut self) -> Result<Reserved> {
        self.align(4)?;
        let at = self.data.len();
        self.put_slice(&[0; 4])?;
        Ok(Reserved(at))
    }

    /// Patch a previously reserved 32-bit slot.
    pub fn patch_u32(&mut self, reserved: Reserved, value: u32) {
        let Reserved(at) = reserved;
        let bytes = match self.endianness {
            Endianness::BIG => value.to_be_bytes(),
            _ => value.to_le_bytes(),
        };
        self.data[at..at + 4].copy_from_slice(&bytes);
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.data.len() + additional > limit {
                return Err(Error::new(ErrorKind::BufferTooSmall(self.data.len())));
            }
        }

        Ok(())
    }
}

impl Default for BodyBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BodyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyBuf")
            .field("len", &self.data.len())
            .field("endianness", &self.endianness)
            .field("signature", &self.signature.as_str())
            .finish()
    }
}
