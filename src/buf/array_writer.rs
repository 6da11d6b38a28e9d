use crate::error::{ErrorKind, Result};
use crate::{BodyBuf, Encode, Error};

use super::{Reserved, MAX_ARRAY_LENGTH};

/// Writes a length-prefixed array into a [`BodyBuf`].
///
/// The 32-bit byte length of an array precedes its elements on the wire, so
/// the writer reserves it up front and patches it in [`finish()`]. The
/// padding up to the element alignment is emitted on construction, even if
/// no element is ever written: an empty array still carries its length and
/// element-alignment padding.
///
/// The recorded length covers exactly the bytes between the end of that
/// padding and the last element; trailing padding belonging to whatever
/// follows the array is not counted.
///
/// [`finish()`]: Self::finish
#[must_use = "arrays must be finalized using ArrayWriter::finish"]
pub struct ArrayWriter<'a> {
    buf: &'a mut BodyBuf,
    len: Reserved,
    start: usize,
}

impl<'a> ArrayWriter<'a> {
    pub(crate) fn new(buf: &'a mut BodyBuf, element_alignment: usize) -> Result<Self> {
        let len = buf.reserve_u32()?;
        buf.align(element_alignment)?;
        let start = buf.len();

        Ok(Self { buf, len, start })
    }

    /// Encode a single element into the array.
    #[inline]
    pub fn write<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Encode,
    {
        value.encode(self.buf)
    }

    /// Access the underlying buffer to write an element manually.
    #[inline]
    pub fn buf(&mut self) -> &mut BodyBuf {
        self.buf
    }

    /// Finish the array, back-patching the reserved length.
    pub fn finish(self) -> Result<()> {
        let len = (self.buf.len() - self.start) as u64;

        if len > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(len)));
        }

        self.buf.patch_u32(self.len, len as u32);
        Ok(())
    }
}
