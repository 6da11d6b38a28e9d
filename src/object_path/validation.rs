use super::{PathError, PathErrorKind};

/// Validate an object path.
///
/// * The path must begin with `/` and consist of elements separated by `/`.
/// * Each element must only contain the characters `[A-Z][a-z][0-9]_`.
/// * No element may be the empty string, so `/` may not repeat.
/// * A trailing `/` is only allowed for the root path.
pub(crate) const fn validate(bytes: &[u8]) -> Result<(), PathError> {
    use PathErrorKind::*;

    if bytes.is_empty() {
        return Err(PathError::new(Empty, 0));
    }

    if bytes[0] != b'/' {
        return Err(PathError::new(NotAbsolute, 0));
    }

    if bytes.len() == 1 {
        return Ok(());
    }

    if bytes[bytes.len() - 1] == b'/' {
        return Err(PathError::new(TrailingSlash, bytes.len() - 1));
    }

    let mut n = 1;

    while n < bytes.len() {
        match bytes[n] {
            b'/' => {
                if bytes[n - 1] == b'/' {
                    return Err(PathError::new(MultipleSlashes, n));
                }
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' => {}
            _ => return Err(PathError::new(InvalidCharacter, n)),
        }

        n += 1;
    }

    Ok(())
}
