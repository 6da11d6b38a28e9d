use std::fmt;

/// Trim ASCII whitespace from the end of a byte slice.
pub(crate) fn trim_line_ending(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., last] = bytes {
        if !matches!(last, b'\r' | b'\n') {
            break;
        }

        bytes = rest;
    }

    bytes
}

/// Split a byte slice once at the given byte.
pub(crate) fn split_once(bytes: &[u8], byte: u8) -> Option<(&[u8], &[u8])> {
    let n = bytes.iter().position(|&b| b == byte)?;
    let (head, tail) = bytes.split_at(n);
    Some((head, &tail[1..]))
}

/// Format a byte slice as a string, replacing non-printable characters.
pub(crate) struct LossyStr<'a>(&'a [u8]);

impl<'a> LossyStr<'a> {
    #[inline]
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for LossyStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.0))
    }
}
