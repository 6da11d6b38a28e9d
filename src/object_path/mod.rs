pub use self::object_path::ObjectPath;
mod object_path;

pub use self::owned_object_path::OwnedObjectPath;
mod owned_object_path;

pub use self::path_error::{PathError, PathErrorKind};
mod path_error;

pub(crate) use self::validation::validate;
mod validation;
