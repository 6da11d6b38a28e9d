use std::fmt;
use std::ops::Deref;

use super::{Signature, SignatureBuf, SignatureError, MAX_DEPTH, MAX_SIGNATURE};

/// A bounded signature composer.
///
/// The codec uses this to derive the signature of stored values. Containers
/// are framed through the `open_*` / `close_*` pairs so that the builder can
/// enforce the protocol's length and depth limits while composing.
#[derive(Clone)]
pub struct SignatureBuilder {
    data: [u8; MAX_SIGNATURE],
    len: usize,
    depth: usize,
}

impl SignatureBuilder {
    /// Construct a new empty builder.
    pub const fn new() -> Self {
        Self {
            data: [0; MAX_SIGNATURE],
            len: 0,
            depth: 0,
        }
    }

    /// Open an array, pushing `a` onto the signature.
    pub fn open_array(&mut self) -> Result<(), SignatureError> {
        self.open(b'a')
    }

    /// Close a previously opened array.
    pub fn close_array(&mut self) {
        self.depth -= 1;
    }

    /// Open a struct, pushing `(` onto the signature.
    pub fn open_struct(&mut self) -> Result<(), SignatureError> {
        self.open(b'(')
    }

    /// Close a previously opened struct.
    pub fn close_struct(&mut self) -> Result<(), SignatureError> {
        self.push(b')')?;
        self.depth -= 1;
        Ok(())
    }

    /// Open a dict entry, pushing `{` onto the signature.
    pub fn open_dict_entry(&mut self) -> Result<(), SignatureError> {
        self.open(b'{')
    }

    /// Close a previously opened dict entry.
    pub fn close_dict_entry(&mut self) -> Result<(), SignatureError> {
        self.push(b'}')?;
        self.depth -= 1;
        Ok(())
    }

    /// Extend the builder with a complete signature.
    pub fn extend_from_signature<S>(&mut self, other: S) -> Result<(), SignatureError>
    where
        S: AsRef<Signature>,
    {
        let bytes = other.as_ref().as_bytes();

        if self.len + bytes.len() > MAX_SIGNATURE {
            return Err(SignatureError::too_long());
        }

        self.data[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Clear the builder.
    pub fn clear(&mut self) {
        self.len = 0;
        self.depth = 0;
    }

    /// Convert the composed signature into an owned [`SignatureBuf`].
    pub fn to_signature_buf(&self) -> SignatureBuf {
        // SAFETY: The builder only composes well-formed signatures.
        unsafe { SignatureBuf::from_slice_unchecked(self.as_slice()) }
    }

    fn open(&mut self, byte: u8) -> Result<(), SignatureError> {
        use super::SignatureErrorKind;

        if self.depth == MAX_DEPTH {
            return Err(SignatureError::new(SignatureErrorKind::ExceededMaximumDepth));
        }

        self.push(byte)?;
        self.depth += 1;
        Ok(())
    }

    fn push(&mut self, byte: u8) -> Result<(), SignatureError> {
        if self.len == MAX_SIGNATURE {
            return Err(SignatureError::too_long());
        }

        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl Default for SignatureBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SignatureBuilder {
    type Target = Signature;

    #[inline]
    fn deref(&self) -> &Self::Target {
        // SAFETY: The builder only composes well-formed signatures.
        unsafe { Signature::new_unchecked(self.as_slice()) }
    }
}

impl fmt::Debug for SignatureBuilder {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SignatureBuilder")
            .field(&self.as_str())
            .finish()
    }
}
