use crate::error::{ErrorKind, Result};
use crate::{Cursor, Decode, Error};

/// Reads a length-prefixed array from a [`Cursor`].
///
/// Consumes the 32-bit byte length and the padding up to the element
/// alignment (which is not counted in the length), then yields elements
/// until the declared span is exhausted. [`finish()`] verifies that the
/// elements consumed exactly the declared number of bytes.
///
/// [`finish()`]: Self::finish
pub struct ArrayReader<'a, 'de> {
    cursor: &'a mut Cursor<'de>,
    end: usize,
}

impl<'a, 'de> ArrayReader<'a, 'de> {
    pub(crate) fn new(cursor: &'a mut Cursor<'de>, element_alignment: usize) -> Result<Self> {
        let at = cursor.pos();
        let len = cursor.take_u32()? as usize;
        cursor.align(element_alignment)?;

        let end = cursor.pos() + len;

        if end > cursor.len() {
            return Err(Error::new(ErrorKind::OutOfRange(at)));
        }

        Ok(Self { cursor, end })
    }

    /// Test if more elements remain in the declared span.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor.pos() < self.end
    }

    /// The current absolute position of the underlying cursor.
    #[inline]
    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    /// Access the underlying cursor to read an element manually.
    #[inline]
    pub fn cursor(&mut self) -> &mut Cursor<'de> {
        self.cursor
    }

    /// Decode the next element.
    #[inline]
    pub fn read_next<T>(&mut self) -> Result<T>
    where
        T: Decode<'de>,
    {
        self.cursor.read()
    }

    /// Finish the array, verifying the declared span was consumed exactly.
    pub fn finish(self) -> Result<()> {
        if self.cursor.pos() != self.end {
            return Err(Error::new(ErrorKind::OutOfRange(self.cursor.pos())));
        }

        Ok(())
    }
}
