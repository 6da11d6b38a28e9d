use super::{NameError, NameErrorKind};

const MAX_NAME: usize = 255;

/// Validate an interface or error name.
///
/// Two or more dot-separated elements, characters `[A-Z][a-z][0-9]_`,
/// elements non-empty and not beginning with a digit, length in `[3, 255]`.
pub(crate) const fn validate_interface(bytes: &[u8]) -> Result<(), NameError> {
    use NameErrorKind::*;

    if bytes.len() < 3 {
        return Err(NameError::new(TooShort, 0));
    }

    if bytes.len() > MAX_NAME {
        return Err(NameError::new(TooLong, bytes.len()));
    }

    if !matches!(bytes[0], b'A'..=b'Z' | b'a'..=b'z' | b'_') {
        return Err(NameError::new(InvalidCharacter, 0));
    }

    let mut n = 1;

    while n < bytes.len() {
        match bytes[n] {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'.' => {}
            b'0'..=b'9' => {
                if bytes[n - 1] == b'.' {
                    return Err(NameError::new(InvalidCharacter, n));
                }
            }
            _ => return Err(NameError::new(InvalidCharacter, n)),
        }

        n += 1;
    }

    check_dots(bytes)
}

/// Validate a bus name.
///
/// As an interface name, except a leading `:` marks a unique connection
/// name, `-` is permitted, and elements of unique names may begin with a
/// digit.
pub(crate) const fn validate_bus(bytes: &[u8]) -> Result<(), NameError> {
    use NameErrorKind::*;

    if bytes.len() < 3 {
        return Err(NameError::new(TooShort, 0));
    }

    if bytes.len() > MAX_NAME {
        return Err(NameError::new(TooLong, bytes.len()));
    }

    let unique = bytes[0] == b':';

    if !unique && !matches!(bytes[0], b'A'..=b'Z' | b'a'..=b'z' | b'_') {
        return Err(NameError::new(InvalidCharacter, 0));
    }

    let mut n = 1;

    while n < bytes.len() {
        match bytes[n] {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'-' | b'.' => {}
            b'0'..=b'9' => {
                if !unique && bytes[n - 1] == b'.' {
                    return Err(NameError::new(InvalidCharacter, n));
                }
            }
            _ => return Err(NameError::new(InvalidCharacter, n)),
        }

        n += 1;
    }

    check_dots(bytes)
}

/// Validate a member name.
///
/// A single element of `[A-Z][a-z][0-9]_` characters, no dots, not
/// beginning with a digit, length in `[1, 255]`.
pub(crate) const fn validate_member(bytes: &[u8]) -> Result<(), NameError> {
    use NameErrorKind::*;

    if bytes.is_empty() {
        return Err(NameError::new(TooShort, 0));
    }

    if bytes.len() > MAX_NAME {
        return Err(NameError::new(TooLong, bytes.len()));
    }

    if !matches!(bytes[0], b'A'..=b'Z' | b'a'..=b'z' | b'_') {
        return Err(NameError::new(InvalidCharacter, 0));
    }

    let mut n = 1;

    while n < bytes.len() {
        if !matches!(bytes[n], b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_') {
            return Err(NameError::new(InvalidCharacter, n));
        }

        n += 1;
    }

    Ok(())
}

const fn check_dots(bytes: &[u8]) -> Result<(), NameError> {
    use NameErrorKind::*;

    if bytes[bytes.len() - 1] == b'.' {
        return Err(NameError::new(TrailingDot, bytes.len() - 1));
    }

    let mut n = 1;

    while n < bytes.len() {
        if bytes[n] == b'.' && bytes[n - 1] == b'.' {
            return Err(NameError::new(MultipleDots, n));
        }

        n += 1;
    }

    Ok(())
}
