//! Connecting to a D-Bus endpoint.
//!
//! Addresses use the `unix:path=<filesystem path>` syntax carried by the
//! standard environment variables identifying the session and system buses.

use std::env;
use std::path::PathBuf;

use crate::error::{ErrorKind, Result};
use crate::Error;

#[cfg(feature = "tokio")]
pub use self::transport::Transport;
#[cfg(feature = "tokio")]
pub(crate) use self::transport::recv_message_into;
#[cfg(feature = "tokio")]
mod transport;

const ENV_SESSION_BUS: &str = "DBUS_SESSION_BUS_ADDRESS";
const ENV_SYSTEM_BUS: &str = "DBUS_SYSTEM_BUS_ADDRESS";
const DEFAULT_SYSTEM_BUS: &str = "unix:path=/var/run/dbus/system_bus_socket";

/// The address of a D-Bus endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Address {
    /// A unix domain stream socket at the given filesystem path.
    Unix(PathBuf),
}

impl Address {
    /// Parse an address.
    ///
    /// # Examples
    ///
    /// ```
    /// use minibus::connection::Address;
    ///
    /// let address = Address::parse("unix:path=/run/user/1000/bus")?;
    /// assert_eq!(address, Address::Unix("/run/user/1000/bus".into()));
    /// # Ok::<_, minibus::Error>(())
    /// ```
    pub fn parse(address: &str) -> Result<Self> {
        let Some(path) = address.strip_prefix("unix:path=") else {
            return Err(Error::new(ErrorKind::InvalidAddress));
        };

        if path.is_empty() {
            return Err(Error::new(ErrorKind::InvalidAddress));
        }

        Ok(Address::Unix(PathBuf::from(path)))
    }

    /// The address of the session bus, from `DBUS_SESSION_BUS_ADDRESS`.
    pub fn session_bus() -> Result<Self> {
        let Some(address) = env::var_os(ENV_SESSION_BUS) else {
            return Err(Error::new(ErrorKind::MissingBus));
        };

        let Some(address) = address.to_str() else {
            return Err(Error::new(ErrorKind::InvalidAddress));
        };

        Self::parse(address)
    }

    /// The address of the system bus, from `DBUS_SYSTEM_BUS_ADDRESS` with a
    /// fallback to the well-known default.
    pub fn system_bus() -> Result<Self> {
        let Some(address) = env::var_os(ENV_SYSTEM_BUS) else {
            return Self::parse(DEFAULT_SYSTEM_BUS);
        };

        let Some(address) = address.to_str() else {
            return Err(Error::new(ErrorKind::InvalidAddress));
        };

        Self::parse(address)
    }
}
