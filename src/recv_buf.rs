use std::num::NonZeroU32;

use crate::error::{ErrorKind, Result};
use crate::name::{BusName, ErrorName, InterfaceName, MemberName};
use crate::object_path::ObjectPath;
use crate::proto::{Endianness, FieldCode, MessageType};
use crate::signature::Signature;
use crate::{Cursor, Error, Message, MessageKind};

/// Buffer holding a single received message.
///
/// The transport fills the buffer with exactly one framed message; reading
/// borrows the decoded header values and body out of it.
pub struct RecvBuf {
    data: Vec<u8>,
}

impl RecvBuf {
    /// Construct a new empty receive buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Decode the message currently held by the buffer.
    #[inline]
    pub fn read_message(&self) -> Result<Message<'_>> {
        read_message(&self.data)
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub(crate) fn buf_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    #[inline]
    pub(crate) fn get(&self) -> &[u8] {
        &self.data
    }
}

impl Default for RecvBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a single message from its complete wire form.
///
/// `data` must span the entire message: the fixed 16-byte prefix, the field
/// array, the padding up to the body, and exactly `body_length` body bytes.
pub fn read_message(data: &[u8]) -> Result<Message<'_>> {
    let Some(&endian) = data.first() else {
        return Err(Error::new(ErrorKind::OutOfRange(0)));
    };

    let endianness = match Endianness::new(endian) {
        Endianness::LITTLE => Endianness::LITTLE,
        Endianness::BIG => Endianness::BIG,
        _ => return Err(Error::new(ErrorKind::BadMessage)),
    };

    let mut cursor = Cursor::new(data, endianness);
    cursor.take_u8()?;

    let message_type = MessageType::new(cursor.take_u8()?);
    let flags = crate::proto::Flags(cursor.take_u8()?);
    let version = cursor.take_u8()?;

    if version != crate::proto::VERSION {
        return Err(Error::new(ErrorKind::InvalidProtocolVersion(version)));
    }

    let body_length = cursor.take_u32()? as usize;

    let Some(serial) = NonZeroU32::new(cursor.take_u32()?) else {
        return Err(Error::new(ErrorKind::ZeroSerial));
    };

    let mut path = None::<&ObjectPath>;
    let mut interface = None::<&InterfaceName>;
    let mut member = None::<&MemberName>;
    let mut error_name = None::<&ErrorName>;
    let mut reply_serial = None::<NonZeroU32>;
    let mut destination = None::<&BusName>;
    let mut sender = None::<&str>;
    let mut signature = Signature::EMPTY;

    let mut fields = cursor.read_array(8)?;

    while fields.has_next() {
        fields.cursor().align(8)?;

        let code = FieldCode::new(fields.cursor().take_u8()?);
        let at = fields.pos();
        let field_signature = fields.cursor().read::<&Signature>()?;

        // The code fixes the signature of the variant payload.
        let expected = match code {
            FieldCode::PATH => Signature::OBJECT_PATH,
            FieldCode::INTERFACE
            | FieldCode::MEMBER
            | FieldCode::ERROR_NAME
            | FieldCode::DESTINATION
            | FieldCode::SENDER => Signature::STRING,
            FieldCode::REPLY_SERIAL | FieldCode::UNIX_FDS => Signature::UINT32,
            FieldCode::SIGNATURE => Signature::SIGNATURE,
            _ => return Err(Error::new(ErrorKind::UnexpectedVariant(at))),
        };

        if field_signature != expected {
            return Err(Error::new(ErrorKind::UnexpectedVariant(at)));
        }

        match code {
            FieldCode::PATH => path = Some(fields.read_next()?),
            FieldCode::INTERFACE => interface = Some(fields.read_next()?),
            FieldCode::MEMBER => member = Some(fields.read_next()?),
            FieldCode::ERROR_NAME => error_name = Some(fields.read_next()?),
            FieldCode::REPLY_SERIAL => {
                let Some(value) = NonZeroU32::new(fields.read_next()?) else {
                    return Err(Error::new(ErrorKind::ZeroSerial));
                };

                reply_serial = Some(value);
            }
            FieldCode::DESTINATION => destination = Some(fields.read_next()?),
            FieldCode::SENDER => sender = Some(fields.read_next()?),
            FieldCode::SIGNATURE => signature = fields.read_next()?,
            FieldCode::UNIX_FDS => {
                // Structurally understood; descriptor passing is out of
                // scope so the count is dropped.
                let _ = fields.read_next::<u32>()?;
            }
            _ => return Err(Error::new(ErrorKind::UnexpectedVariant(at))),
        }
    }

    fields.finish()?;

    // An absent signature field is equivalent to the empty signature, in
    // which case the body must be zero-length.
    if signature.is_empty() && body_length != 0 {
        return Err(Error::new(ErrorKind::BadMessage));
    }

    // The body begins on the next 8-byte boundary.
    cursor.align(8)?;
    let body = cursor.take_slice(body_length)?;

    let kind = match message_type {
        MessageType::METHOD_CALL => MessageKind::MethodCall {
            path: path.ok_or_else(|| Error::new(ErrorKind::MissingPath))?,
            member: member.ok_or_else(|| Error::new(ErrorKind::MissingMember))?,
        },
        MessageType::METHOD_RETURN => MessageKind::MethodReturn {
            reply_serial: reply_serial.ok_or_else(|| Error::new(ErrorKind::MissingReplySerial))?,
        },
        MessageType::ERROR => MessageKind::Error {
            error: error_name.ok_or_else(|| Error::new(ErrorKind::MissingErrorName))?,
            reply_serial: reply_serial.ok_or_else(|| Error::new(ErrorKind::MissingReplySerial))?,
        },
        MessageType::SIGNAL => MessageKind::Signal {
            path: path.ok_or_else(|| Error::new(ErrorKind::MissingPath))?,
            interface: interface.ok_or_else(|| Error::new(ErrorKind::MissingInterface))?,
            member: member.ok_or_else(|| Error::new(ErrorKind::MissingMember))?,
        },
        _ => return Err(Error::new(ErrorKind::BadMessage)),
    };

    Ok(Message {
        kind,
        serial,
        flags,
        interface,
        destination,
        sender,
        signature,
        body,
        endianness,
    })
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use crate::error::ErrorKind;
    use crate::name::{BusName, ErrorName, InterfaceName, MemberName};
    use crate::object_path::ObjectPath;
    use crate::proto::Endianness;
    use crate::signature::Signature;
    use crate::{BodyBuf, Message, MessageKind, SendBuf};

    use super::read_message;

    const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
    const DESTINATION: &BusName = BusName::new_const("org.freedesktop.DBus");
    const INTERFACE: &InterfaceName = InterfaceName::new_const("org.freedesktop.DBus");
    const REQUEST_NAME: &MemberName = MemberName::new_const("RequestName");

    fn serial(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn round_trip(message: &Message<'_>) -> Vec<u8> {
        let mut send = SendBuf::new();
        send.write_message(message).unwrap();
        send.get().to_vec()
    }

    #[test]
    fn method_call_round_trip() {
        let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
        body.store("com.example.HelloWorld").unwrap();
        body.store(&4u32).unwrap();

        let message = Message::method_call(PATH, REQUEST_NAME, serial(42))
            .with_destination(DESTINATION)
            .with_interface(INTERFACE)
            .with_body(&body);

        let wire = round_trip(&message);
        let decoded = read_message(&wire).unwrap();

        assert_eq!(
            decoded.kind(),
            MessageKind::MethodCall {
                path: PATH,
                member: REQUEST_NAME,
            }
        );
        assert_eq!(decoded.serial(), serial(42));
        assert_eq!(decoded.destination(), Some(DESTINATION));
        assert_eq!(decoded.interface(), Some(INTERFACE));
        assert_eq!(decoded.signature(), Signature::new(b"su").unwrap());

        let mut cursor = decoded.body();
        assert_eq!(cursor.read::<&str>().unwrap(), "com.example.HelloWorld");
        assert_eq!(cursor.read::<u32>().unwrap(), 4);
        assert!(cursor.is_empty());
    }

    #[test]
    fn method_return_round_trip() {
        let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
        body.store(&1u32).unwrap();

        let message = Message::method_return(serial(42), serial(7)).with_body(&body);
        let bytes = round_trip(&message);
        let decoded = read_message(&bytes).unwrap();

        assert_eq!(
            decoded.kind(),
            MessageKind::MethodReturn {
                reply_serial: serial(42),
            }
        );
        assert_eq!(decoded.serial(), serial(7));
        assert_eq!(decoded.body().read::<u32>().unwrap(), 1);
    }

    #[test]
    fn error_round_trip() {
        const NAME: &ErrorName = ErrorName::new_const("org.freedesktop.DBus.Error.Failed");

        let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
        body.store("something failed").unwrap();

        let message = Message::error(NAME, serial(42), serial(8))
            .with_destination(DESTINATION)
            .with_body(&body);

        let bytes = round_trip(&message);
        let decoded = read_message(&bytes).unwrap();

        assert_eq!(
            decoded.kind(),
            MessageKind::Error {
                error: NAME,
                reply_serial: serial(42),
            }
        );
        assert_eq!(decoded.body().read::<&str>().unwrap(), "something failed");
    }

    #[test]
    fn signal_round_trip() {
        const MEMBER: &MemberName = MemberName::new_const("NameAcquired");

        let mut body = BodyBuf::with_endianness(Endianness::LITTLE);
        body.store(":1.42").unwrap();

        let message = Message::signal(PATH, INTERFACE, MEMBER, serial(9)).with_body(&body);
        let bytes = round_trip(&message);
        let decoded = read_message(&bytes).unwrap();

        assert_eq!(
            decoded.kind(),
            MessageKind::Signal {
                path: PATH,
                interface: INTERFACE,
                member: MEMBER,
            }
        );
        assert_eq!(decoded.interface(), Some(INTERFACE));
    }

    #[test]
    fn big_endian_round_trip() {
        let mut body = BodyBuf::with_endianness(Endianness::BIG);
        body.store(&0x12345678u32).unwrap();

        let message = Message::method_return(serial(1), serial(2)).with_body(&body);
        let wire = round_trip(&message);

        assert_eq!(wire[0], b'B');

        let decoded = read_message(&wire).unwrap();
        assert_eq!(decoded.body().read::<u32>().unwrap(), 0x12345678);
    }

    #[test]
    fn missing_reply_serial() {
        // A method return with an empty field array.
        let wire = [
            b'l', 2, 0, 1, // prefix
            0, 0, 0, 0, // body length
            1, 0, 0, 0, // serial
            0, 0, 0, 0, // field array byte length
        ];

        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::MissingReplySerial));
    }

    #[test]
    fn field_signature_must_match_code() {
        // A PATH field whose inline signature claims to be a string.
        let wire = [
            b'l', 1, 0, 1, // prefix
            0, 0, 0, 0, // body length
            1, 0, 0, 0, // serial
            11, 0, 0, 0, // field array byte length
            1, 1, b's', 0, // PATH code with signature `s`
            2, 0, 0, 0, b'/', b'a', 0, // payload
            0, 0, 0, 0, 0, // padding up to the body
        ];

        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::UnexpectedVariant(17)));
    }

    #[test]
    fn unknown_field_code() {
        let wire = [
            b'l', 1, 0, 1, // prefix
            0, 0, 0, 0, // body length
            1, 0, 0, 0, // serial
            8, 0, 0, 0, // field array byte length
            42, 1, b'u', 0, // unknown code
            1, 0, 0, 0, // payload
        ];

        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::UnexpectedVariant(17)));
    }

    #[test]
    fn zero_serial_is_rejected() {
        let wire = [
            b'l', 2, 0, 1, // prefix
            0, 0, 0, 0, // body length
            0, 0, 0, 0, // serial
            0, 0, 0, 0, // field array byte length
        ];

        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::ZeroSerial));
    }

    #[test]
    fn bad_endian_byte() {
        let wire = [b'x', 2, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0];
        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::BadMessage));
    }

    #[test]
    fn unsupported_version() {
        let wire = [b'l', 2, 0, 2, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0];
        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::InvalidProtocolVersion(2)));
    }

    #[test]
    fn absent_signature_requires_empty_body() {
        // A method return declaring 4 body bytes but no signature field.
        let wire = [
            b'l', 2, 0, 1, // prefix
            4, 0, 0, 0, // body length
            2, 0, 0, 0, // serial
            8, 0, 0, 0, // field array byte length
            5, 1, b'u', 0, // REPLY_SERIAL code
            1, 0, 0, 0, // reply serial value
            1, 0, 0, 0, // body
        ];

        let error = read_message(&wire).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::BadMessage));
    }
}
