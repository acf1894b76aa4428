//! Creation of objects from two integers.
//!
//! One number identifies the module that provides the object, the other the
//! class inside that module. Nothing else about the type is ever stored, so
//! the pair is enough to rebuild any registered object from a binary stream.

pub mod factory;
pub mod object;
pub mod serialize;

pub use factory::{FactoryError, FactoryObject, ObjectFactory};
pub use object::{ObjectFromFactory, ObjectFromFactoryId};
pub use serialize::{serialize_owned, serialize_shared};
