use std::sync::Arc;

use parcel::obj_stream::{ObjStream, ObjStreamError, ObjStreamReader, ObjStreamWriter};

use crate::{
    factory::ObjectFactory,
    object::{ObjectFromFactory, ObjectFromFactoryId},
};

/// Writes the id of `obj` followed by its body, or the null id if there is no object.
pub fn write_object<T: ?Sized + ObjectFromFactory>(
    archive: &mut ObjStreamWriter,
    obj: Option<&T>,
) -> Result<(), ObjStreamError> {
    match obj {
        Some(obj) => {
            obj.factory_id().save(archive)?;
            obj.save(archive)
        }
        None => ObjectFromFactoryId::NONE.save(archive),
    }
}

/// Reads an object written by [`write_object`].
///
/// An id that can't be created, or whose objects are not published as `T`,
/// is reported as [`ObjStreamError::UnexpectedObject`]. The length of the
/// unknown record is unknown too, so the caller must give up on the whole
/// stream.
pub fn read_object<T: ?Sized + ObjectFromFactory>(
    factory: &ObjectFactory,
    archive: &mut ObjStreamReader,
) -> Result<Option<Box<T>>, ObjStreamError> {
    let id = ObjectFromFactoryId::load(archive)?;
    if id.is_none() {
        return Ok(None);
    }

    let mut obj = factory
        .create_object(id)
        .ok()
        .and_then(|obj| obj.narrow::<T>().ok())
        .ok_or_else(|| {
            log::error!(
                target: "object_factory",
                "object {id} at byte {} can't be read as {}, stream is corrupt",
                archive.position(),
                std::any::type_name::<T>()
            );
            ObjStreamError::UnexpectedObject {
                module_id: id.module_id,
                class_id: id.class_id,
            }
        })?;
    obj.load(archive)?;
    Ok(Some(obj))
}

/// Symmetric (de-)serialization of an owned polymorphic object slot.
///
/// On a read error the slot is left empty.
pub fn serialize_owned<T: ?Sized + ObjectFromFactory>(
    factory: &ObjectFactory,
    archive: &mut ObjStream,
    obj: &mut Option<Box<T>>,
) -> Result<(), ObjStreamError> {
    match archive {
        ObjStream::Writing(writer) => write_object(writer, obj.as_deref()),
        ObjStream::Reading(reader) => {
            *obj = None;
            *obj = read_object::<T>(factory, reader)?;
            Ok(())
        }
    }
}

/// Symmetric (de-)serialization of a shared polymorphic object slot.
///
/// Reading always produces a new object that is not shared with anything,
/// sharing of the written object is not preserved.
pub fn serialize_shared<T: ?Sized + ObjectFromFactory>(
    factory: &ObjectFactory,
    archive: &mut ObjStream,
    obj: &mut Option<Arc<T>>,
) -> Result<(), ObjStreamError> {
    match archive {
        ObjStream::Writing(writer) => write_object(writer, obj.as_deref()),
        ObjStream::Reading(reader) => {
            *obj = None;
            *obj = read_object::<T>(factory, reader)?.map(Arc::from);
            Ok(())
        }
    }
}
