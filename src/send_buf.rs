use std::num::NonZeroU32;

use crate::buf::MAX_BODY_LENGTH;
use crate::error::{ErrorKind, Result};
use crate::proto::{self, FieldCode};
use crate::signature::Signature;
use crate::{BodyBuf, Encode, Error, Message, MessageKind};

/// Buffer used for encoding messages to be sent.
///
/// The buffer holds the wire form of the last message written to it and
/// allocates serials: monotonically from 1, never 0. Exhausting the 32-bit
/// serial space is a fatal condition.
///
/// # Examples
///
/// ```
/// use minibus::{Message, MemberName, ObjectPath, SendBuf};
///
/// const PATH: &ObjectPath = ObjectPath::new_const("/org/freedesktop/DBus");
/// const HELLO: &MemberName = MemberName::new_const("Hello");
///
/// let mut send = SendBuf::new();
///
/// let serial = send.next_serial()?;
/// assert_eq!(serial.get(), 1);
///
/// send.write_message(&Message::method_call(PATH, HELLO, serial))?;
/// assert_eq!(send.get().len() % 8, 0);
/// # Ok::<_, minibus::Error>(())
/// ```
pub struct SendBuf {
    buf: BodyBuf,
    serial: u32,
}

impl SendBuf {
    /// Construct a new send buffer.
    pub fn new() -> Self {
        Self {
            buf: BodyBuf::new(),
            serial: 0,
        }
    }

    /// Allocate the next serial.
    pub fn next_serial(&mut self) -> Result<NonZeroU32> {
        let Some(serial) = self.serial.checked_add(1).and_then(NonZeroU32::new) else {
            return Err(Error::new(ErrorKind::SerialsExhausted));
        };

        self.serial = serial.get();
        Ok(serial)
    }

    /// The wire form of the last message written.
    #[inline]
    pub fn get(&self) -> &[u8] {
        self.buf.get()
    }

    /// Encode `message` into the buffer, replacing its previous contents.
    ///
    /// The message is encoded in the endianness of its body: the fixed
    /// 16-byte prefix, the field array with every field starting on an
    /// 8-byte boundary, padding up to the next 8-byte boundary, and the
    /// body bytes. The `body_length` of the prefix is the exact length of
    /// the body.
    pub fn write_message(&mut self, message: &Message<'_>) -> Result<()> {
        let Ok(body_length) = u32::try_from(message.body.len()) else {
            return Err(Error::new(ErrorKind::BodyTooLong(message.body.len() as u64)));
        };

        if u64::from(body_length) > MAX_BODY_LENGTH {
            return Err(Error::new(ErrorKind::BodyTooLong(u64::from(body_length))));
        }

        self.buf.clear();
        self.buf.set_endianness(message.endianness);

        self.buf.put_u8(message.endianness.0)?;
        self.buf.put_u8(message.kind.message_type().0)?;
        self.buf.put_u8(message.flags.0)?;
        self.buf.put_u8(proto::VERSION)?;
        self.buf.put_u32(body_length)?;
        self.buf.put_u32(message.serial.get())?;

        let mut array = self.buf.write_array(8)?;

        match message.kind {
            MessageKind::MethodCall { path, member } => {
                write_field(&mut array, FieldCode::PATH, Signature::OBJECT_PATH, path)?;
                write_field(&mut array, FieldCode::MEMBER, Signature::STRING, member)?;

                if let Some(interface) = message.interface {
                    write_field(&mut array, FieldCode::INTERFACE, Signature::STRING, interface)?;
                }
            }
            MessageKind::MethodReturn { reply_serial } => {
                write_field(
                    &mut array,
                    FieldCode::REPLY_SERIAL,
                    Signature::UINT32,
                    &reply_serial.get(),
                )?;
            }
            MessageKind::Error {
                error,
                reply_serial,
            } => {
                write_field(&mut array, FieldCode::ERROR_NAME, Signature::STRING, error)?;
                write_field(
                    &mut array,
                    FieldCode::REPLY_SERIAL,
                    Signature::UINT32,
                    &reply_serial.get(),
                )?;
            }
            MessageKind::Signal {
                path,
                interface,
                member,
            } => {
                write_field(&mut array, FieldCode::PATH, Signature::OBJECT_PATH, path)?;
                write_field(&mut array, FieldCode::INTERFACE, Signature::STRING, interface)?;
                write_field(&mut array, FieldCode::MEMBER, Signature::STRING, member)?;
            }
        }

        if let Some(destination) = message.destination {
            write_field(
                &mut array,
                FieldCode::DESTINATION,
                Signature::STRING,
                destination,
            )?;
        }

        if let Some(sender) = message.sender {
            write_field(&mut array, FieldCode::SENDER, Signature::STRING, sender)?;
        }

        if !message.signature.is_empty() {
            write_field(
                &mut array,
                FieldCode::SIGNATURE,
                Signature::SIGNATURE,
                message.signature,
            )?;
        }

        array.finish()?;

        // The header ends after its padding to an 8-byte boundary.
        self.buf.align(8)?;
        self.buf.put_slice(message.body)?;
        Ok(())
    }
}

/// Write a single `(code, variant)` header field, starting on an 8-byte
/// boundary.
fn write_field<T>(
    array: &mut crate::ArrayWriter<'_>,
    code: FieldCode,
    signature: &Signature,
    value: &T,
) -> Result<()>
where
    T: ?Sized + Encode,
{
    let buf = array.buf();
    buf.align(8)?;
    buf.put_u8(code.0)?;
    signature.encode(buf)?;
    value.encode(buf)
}

impl Default for SendBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
