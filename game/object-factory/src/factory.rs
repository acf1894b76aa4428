use std::any::Any;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::object::{ObjectFromFactory, ObjectFromFactoryId};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryError {
    #[error("the object factory is not initialized")]
    NotInitialized,
    #[error("no object creator is registered for {0}")]
    Unregistered(ObjectFromFactoryId),
    #[error("an object creator for {0} is already registered")]
    DuplicateId(ObjectFromFactoryId),
    #[error("module id 0 is reserved for the absent object, {0} can't be registered")]
    ReservedId(ObjectFromFactoryId),
}

type Creator = Box<dyn Fn(ObjectFromFactoryId) -> Box<dyn Any + Send + Sync> + Send + Sync>;

struct FactoryEntry {
    base: &'static str,
    create: Creator,
}

/// The creation table. Maps a `(module, class)` pair to a function that
/// builds a default initialized object.
///
/// Every creator publishes its objects as one base type `B`, usually a trait
/// object like `dyn MazeElement`. Reading code later narrows created objects
/// to the type it expects, see [`FactoryObject::narrow`].
///
/// All registration happens before the first session reads a stream, after
/// that the factory is only shared immutably.
#[derive(Default)]
pub struct ObjectFactory {
    initialized: bool,
    entries: FxHashMap<ObjectFromFactoryId, FactoryEntry>,
}

impl ObjectFactory {
    /// Must be called before anything is registered or created.
    pub fn init() -> Self {
        log::debug!(target: "object_factory", "object factory initialized");
        Self {
            initialized: true,
            entries: Default::default(),
        }
    }

    /// Releases all creators. The factory can't create objects anymore afterwards.
    pub fn clean(&mut self) {
        log::debug!(
            target: "object_factory",
            "releasing {} object creators",
            self.entries.len()
        );
        self.entries.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn register<B: ?Sized + ObjectFromFactory>(
        &mut self,
        id: ObjectFromFactoryId,
        creator: fn(ObjectFromFactoryId) -> Box<B>,
    ) -> Result<(), FactoryError> {
        if !self.initialized {
            return Err(FactoryError::NotInitialized);
        }
        if id.is_none() {
            return Err(FactoryError::ReservedId(id));
        }
        if self.entries.contains_key(&id) {
            return Err(FactoryError::DuplicateId(id));
        }
        self.entries.insert(
            id,
            FactoryEntry {
                base: std::any::type_name::<B>(),
                create: Box::new(move |id| Box::new(creator(id)) as Box<dyn Any + Send + Sync>),
            },
        );
        Ok(())
    }

    /// Fast object creation.
    pub fn create_object(&self, id: ObjectFromFactoryId) -> Result<FactoryObject, FactoryError> {
        if !self.initialized {
            return Err(FactoryError::NotInitialized);
        }
        let entry = self
            .entries
            .get(&id)
            .ok_or(FactoryError::Unregistered(id))?;
        Ok(FactoryObject {
            id,
            object: (entry.create)(id),
        })
    }

    pub fn is_registered(&self, id: &ObjectFromFactoryId) -> bool {
        self.entries.contains_key(id)
    }

    /// Name of the type the objects of `id` are published as.
    pub fn registered_base(&self, id: &ObjectFromFactoryId) -> Option<&'static str> {
        self.entries.get(id).map(|entry| entry.base)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.entries.keys().collect();
        ids.sort();
        f.debug_struct("ObjectFactory")
            .field("initialized", &self.initialized)
            .field("ids", &ids)
            .finish()
    }
}

/// A freshly created object, not yet narrowed to the type the caller expects.
pub struct FactoryObject {
    id: ObjectFromFactoryId,
    object: Box<dyn Any + Send + Sync>,
}

impl FactoryObject {
    pub fn id(&self) -> ObjectFromFactoryId {
        self.id
    }

    /// Whether [`FactoryObject::narrow`] to `T` would succeed.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        (*self.object).is::<Box<T>>()
    }

    /// Narrows the object to `T`, which must be exactly the base type the
    /// creator was registered with. Gives the object back on failure.
    pub fn narrow<T: ?Sized + 'static>(self) -> Result<Box<T>, FactoryObject> {
        let id = self.id;
        match self.object.downcast::<Box<T>>() {
            Ok(obj) => Ok(*obj),
            Err(object) => Err(FactoryObject { id, object }),
        }
    }
}

impl std::fmt::Debug for FactoryObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryObject").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod test {
    use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};

    use super::{FactoryError, ObjectFactory};
    use crate::object::{ObjectFromFactory, ObjectFromFactoryId};

    trait Gadget: ObjectFromFactory {
        fn power(&self) -> u32;
    }

    #[derive(Debug)]
    struct Lamp {
        id: ObjectFromFactoryId,
        watts: u32,
    }

    impl ObjectFromFactory for Lamp {
        fn factory_id(&self) -> ObjectFromFactoryId {
            self.id
        }

        fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
            archive.write(&self.watts)
        }

        fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError> {
            self.watts = archive.read()?;
            Ok(())
        }
    }

    impl Gadget for Lamp {
        fn power(&self) -> u32 {
            self.watts
        }
    }

    fn new_lamp(id: ObjectFromFactoryId) -> Box<dyn Gadget> {
        Box::new(Lamp { id, watts: 60 })
    }

    fn new_plain_lamp(id: ObjectFromFactoryId) -> Box<Lamp> {
        Box::new(Lamp { id, watts: 40 })
    }

    const LAMP: ObjectFromFactoryId = ObjectFromFactoryId::new(7, 1);
    const PLAIN_LAMP: ObjectFromFactoryId = ObjectFromFactoryId::new(7, 2);

    #[test]
    fn create_and_narrow() {
        let mut factory = ObjectFactory::init();
        factory.register::<dyn Gadget>(LAMP, new_lamp).unwrap();
        factory.register::<Lamp>(PLAIN_LAMP, new_plain_lamp).unwrap();
        assert_eq!(factory.len(), 2);

        let obj = factory.create_object(LAMP).unwrap();
        assert_eq!(obj.id(), LAMP);
        assert!(obj.is::<dyn Gadget>());
        assert!(!obj.is::<Lamp>());
        let gadget = obj.narrow::<dyn Gadget>().unwrap();
        assert_eq!(gadget.power(), 60);
        assert_eq!(gadget.factory_id(), LAMP);

        // published as the concrete type, so the trait object view is not available
        let obj = factory.create_object(PLAIN_LAMP).unwrap();
        let obj = obj.narrow::<dyn Gadget>().unwrap_err();
        assert_eq!(obj.narrow::<Lamp>().unwrap().watts, 40);
    }

    #[test]
    fn registration_conflicts() {
        let mut factory = ObjectFactory::init();
        factory.register::<dyn Gadget>(LAMP, new_lamp).unwrap();
        assert_eq!(
            factory.register::<dyn Gadget>(LAMP, new_lamp).unwrap_err(),
            FactoryError::DuplicateId(LAMP)
        );
        let reserved = ObjectFromFactoryId::new(0, 3);
        assert_eq!(
            factory.register::<dyn Gadget>(reserved, new_lamp).unwrap_err(),
            FactoryError::ReservedId(reserved)
        );
    }

    #[test]
    fn unregistered_and_cleaned() {
        let mut factory = ObjectFactory::init();
        assert_eq!(
            factory.create_object(LAMP).unwrap_err(),
            FactoryError::Unregistered(LAMP)
        );
        factory.register::<dyn Gadget>(LAMP, new_lamp).unwrap();
        assert!(factory.is_registered(&LAMP));

        factory.clean();
        assert!(!factory.is_initialized());
        assert!(factory.is_empty());
        assert_eq!(
            factory.create_object(LAMP).unwrap_err(),
            FactoryError::NotInitialized
        );
        assert_eq!(
            factory.register::<dyn Gadget>(LAMP, new_lamp).unwrap_err(),
            FactoryError::NotInitialized
        );
    }
}
