use crate::proto::Type;

use super::{SignatureError, SignatureErrorKind, MAX_DEPTH, MAX_SIGNATURE};

// Container kinds tracked on the validation stack.
const ARRAY: u8 = 1;
const STRUCT: u8 = 2;
const DICT: u8 = 3;

/// Validate a signature against the type grammar.
///
/// Works in constant contexts so that signatures can be checked at compile
/// time through [`Signature::new_const`].
///
/// [`Signature::new_const`]: crate::Signature::new_const
pub(crate) const fn validate(bytes: &[u8]) -> Result<(), SignatureError> {
    use SignatureErrorKind::*;

    if bytes.len() > MAX_SIGNATURE {
        return Err(SignatureError::new(SignatureTooLong));
    }

    // Each stack entry is an open container: its kind and the number of
    // complete types seen inside it so far.
    let mut stack = [(0u8, 0u8); MAX_DEPTH];
    let mut depth = 0usize;
    let mut n = 0;

    while n < bytes.len() {
        let b = bytes[n];
        n += 1;

        let mut is_basic = match Type::new(b) {
            Type::BYTE
            | Type::BOOLEAN
            | Type::INT16
            | Type::UINT16
            | Type::INT32
            | Type::UINT32
            | Type::INT64
            | Type::UINT64
            | Type::DOUBLE
            | Type::STRING
            | Type::OBJECT_PATH
            | Type::SIGNATURE
            | Type::UNIX_FD => true,
            // A variant is a single complete type, but not a basic one.
            Type::VARIANT => false,
            Type::ARRAY => {
                if depth == MAX_DEPTH {
                    return Err(SignatureError::new(ExceededMaximumDepth));
                }

                stack[depth] = (ARRAY, 0);
                depth += 1;
                continue;
            }
            Type::OPEN_PAREN => {
                if depth == MAX_DEPTH {
                    return Err(SignatureError::new(ExceededMaximumDepth));
                }

                stack[depth] = (STRUCT, 0);
                depth += 1;
                continue;
            }
            Type::CLOSE_PAREN => {
                if depth == 0 {
                    return Err(SignatureError::new(StructEndedButNotStarted));
                }

                depth -= 1;

                match stack[depth] {
                    (STRUCT, 0) => return Err(SignatureError::new(StructHasNoFields)),
                    (STRUCT, _) => {}
                    (ARRAY, _) => return Err(SignatureError::new(MissingArrayElementType)),
                    _ => return Err(SignatureError::new(StructEndedButNotStarted)),
                }

                false
            }
            Type::OPEN_BRACE => {
                if depth == MAX_DEPTH {
                    return Err(SignatureError::new(ExceededMaximumDepth));
                }

                // A dict entry is only a valid element type for an array.
                if depth == 0 || stack[depth - 1].0 != ARRAY {
                    return Err(SignatureError::new(DictEntryNotInsideArray));
                }

                stack[depth] = (DICT, 0);
                depth += 1;
                continue;
            }
            Type::CLOSE_BRACE => {
                if depth == 0 {
                    return Err(SignatureError::new(DictEndedButNotStarted));
                }

                depth -= 1;

                match stack[depth] {
                    (DICT, 0) => return Err(SignatureError::new(DictEntryHasNoFields)),
                    (DICT, 1) => return Err(SignatureError::new(DictEntryHasOnlyOneField)),
                    (DICT, 2) => {}
                    (DICT, _) => return Err(SignatureError::new(DictEntryHasTooManyFields)),
                    (ARRAY, _) => return Err(SignatureError::new(MissingArrayElementType)),
                    _ => return Err(SignatureError::new(DictEndedButNotStarted)),
                }

                false
            }
            _ => return Err(SignatureError::new(UnknownTypeCode(b))),
        };

        // A complete type closes every array it is the element of.
        while depth > 0 && stack[depth - 1].0 == ARRAY {
            depth -= 1;
            is_basic = false;
        }

        if depth > 0 {
            let (kind, count) = stack[depth - 1];

            if kind == DICT && count == 0 && !is_basic {
                return Err(SignatureError::new(DictKeyMustBeBasicType));
            }

            stack[depth - 1] = (kind, count + 1);
        }
    }

    if depth > 0 {
        return match stack[depth - 1].0 {
            ARRAY => Err(SignatureError::new(MissingArrayElementType)),
            STRUCT => Err(SignatureError::new(StructStartedButNotEnded)),
            _ => Err(SignatureError::new(DictStartedButNotEnded)),
        };
    }

    Ok(())
}
