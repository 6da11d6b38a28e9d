use std::fmt;

use super::{validate, OwnedObjectPath, PathError};

/// A validated D-Bus object path.
///
/// The path may be of any length, begins with `/`, and consists of
/// `[A-Z][a-z][0-9]_` elements separated by single slashes. The root path
/// `/` is valid.
///
/// # Examples
///
/// ```
/// use minibus::ObjectPath;
///
/// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
///
/// assert!(ObjectPath::new("/").is_ok());
/// assert!(ObjectPath::new("/a//b").is_err());
/// ```
#[derive(Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct ObjectPath(str);

impl ObjectPath {
    /// The root object path, `/`.
    pub const ROOT: &'static ObjectPath = ObjectPath::new_const("/");

    /// Construct a new object path with validation inside of a constant
    /// context.
    ///
    /// Panics in case the path is invalid.
    #[inline]
    #[track_caller]
    pub const fn new_const(path: &str) -> &ObjectPath {
        if validate(path.as_bytes()).is_err() {
            panic!("Invalid D-Bus object path");
        }

        // SAFETY: The string slice is repr transparent over this type.
        unsafe { Self::new_unchecked(path) }
    }

    /// Try to construct a new object path with validation.
    #[inline]
    pub const fn new(path: &str) -> Result<&ObjectPath, PathError> {
        if let Err(error) = validate(path.as_bytes()) {
            return Err(error);
        }

        // SAFETY: The string slice is repr transparent over this type.
        unsafe { Ok(Self::new_unchecked(path)) }
    }

    /// Construct a new object path without validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the path is valid.
    pub(crate) const unsafe fn new_unchecked(path: &str) -> &Self {
        &*(path as *const _ as *const ObjectPath)
    }

    /// Get the object path as a string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the object path as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectPath").field(&&self.0).finish()
    }
}

impl fmt::Display for ObjectPath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<ObjectPath> for ObjectPath {
    #[inline]
    fn as_ref(&self) -> &ObjectPath {
        self
    }
}

impl ToOwned for ObjectPath {
    type Owned = OwnedObjectPath;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        OwnedObjectPath::from_path(self)
    }
}

impl PartialEq<str> for ObjectPath {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&str> for ObjectPath {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &self.0 == *other
    }
}

impl<'a> TryFrom<&'a str> for &'a ObjectPath {
    type Error = PathError;

    #[inline]
    fn try_from(path: &'a str) -> Result<Self, Self::Error> {
        ObjectPath::new(path)
    }
}
