use std::{any::Any, fmt::Debug};

use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};
use serde::{Deserialize, Serialize};

/// Unique identifier for a factory object.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectFromFactoryId {
    pub module_id: u16,
    pub class_id: u16,
}

impl ObjectFromFactoryId {
    /// Written in place of an absent object.
    pub const NONE: Self = Self::new(0, 0);

    pub const fn new(module_id: u16, class_id: u16) -> Self {
        Self {
            module_id,
            class_id,
        }
    }

    /// Module id 0 never names a real module, whatever the class id is.
    pub fn is_none(&self) -> bool {
        self.module_id == 0
    }

    pub fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
        archive.write(self)
    }

    pub fn load(archive: &mut ObjStreamReader) -> Result<Self, ObjStreamError> {
        archive.read()
    }
}

impl std::fmt::Display for ObjectFromFactoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.module_id, self.class_id)
    }
}

/// Base of every object that can be created by an [`crate::ObjectFactory`].
///
/// The id is handed to the object when the factory creates it, so an object
/// always knows under which id it has to be written.
///
/// Only tree shaped data is supported: two slots referring to the same
/// object are written twice and read back as two independent objects.
pub trait ObjectFromFactory: Any + Debug + Send + Sync {
    fn factory_id(&self) -> ObjectFromFactoryId;

    /// Writes the state of the object (without its id).
    fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError>;

    /// Reads back what [`ObjectFromFactory::save`] wrote.
    fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError>;
}
