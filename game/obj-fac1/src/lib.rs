//! Track objects: checkpoints, pickups and obstacles.
//!
//! Everything in here is published as `dyn MazeElement` under module id
//! [`MODULE_ID`].

use model::maze_element::maze_element::MazeElement;
use object_factory::{FactoryError, ObjectFactory, ObjectFromFactoryId};

pub mod finish_line;
pub mod pickup;
pub mod wood_block;

pub const MODULE_ID: u16 = 1;

pub const WOOD_BLOCK: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 200);
pub const FINISH_LINE: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 150);
pub const CHECK_POINT_1: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 151);
pub const CHECK_POINT_2: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 152);
pub const MISSILE_PICKUP: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 1100);
pub const MINE_PICKUP: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 1101);
pub const SPEED_PICKUP: ObjectFromFactoryId = ObjectFromFactoryId::new(MODULE_ID, 1102);

/// Registers all classes of the module.
pub fn register(factory: &mut ObjectFactory) -> Result<(), FactoryError> {
    let creators: [(ObjectFromFactoryId, fn(ObjectFromFactoryId) -> Box<dyn MazeElement>); 7] = [
        (WOOD_BLOCK, wood_block::new_wood_block),
        (FINISH_LINE, finish_line::new_finish_line),
        (CHECK_POINT_1, finish_line::new_finish_line),
        (CHECK_POINT_2, finish_line::new_finish_line),
        (MISSILE_PICKUP, pickup::new_pickup),
        (MINE_PICKUP, pickup::new_pickup),
        (SPEED_PICKUP, pickup::new_pickup),
    ];
    for (id, creator) in creators {
        factory.register::<dyn MazeElement>(id, creator)?;
    }
    log::debug!(target: "obj_fac1", "registered {} track object classes", creators.len());
    Ok(())
}

/// Writes `element` to a stream the way saved states do and reads it back.
#[cfg(test)]
pub(crate) fn reload(element: Box<dyn MazeElement>) -> Box<dyn MazeElement> {
    use object_factory::serialize_owned;
    use parcel::obj_stream::{ObjStream, ObjStreamReader, ObjStreamWriter};

    let mut factory = ObjectFactory::init();
    register(&mut factory).unwrap();

    let mut writer = ObjStreamWriter::with_header();
    serialize_owned(&factory, &mut ObjStream::Writing(&mut writer), &mut Some(element)).unwrap();
    let data = writer.into_inner();

    let mut reader = ObjStreamReader::with_header(&data).unwrap();
    let mut loaded: Option<Box<dyn MazeElement>> = None;
    serialize_owned(&factory, &mut ObjStream::Reading(&mut reader), &mut loaded).unwrap();
    assert!(reader.is_at_end());
    loaded.unwrap()
}

#[cfg(test)]
mod test {
    use model::maze_element::maze_element::MazeElement;
    use object_factory::ObjectFactory;

    use crate::{register, CHECK_POINT_2, FINISH_LINE, MINE_PICKUP};

    #[test]
    fn registers_all_classes() {
        let mut factory = ObjectFactory::init();
        register(&mut factory).unwrap();
        assert_eq!(factory.len(), 7);
        assert!(register(&mut factory).is_err());

        for id in [FINISH_LINE, CHECK_POINT_2, MINE_PICKUP] {
            let element = factory
                .create_object(id)
                .unwrap()
                .narrow::<dyn MazeElement>()
                .unwrap();
            assert_eq!(element.factory_id(), id);
        }
        assert_eq!(MINE_PICKUP.class_id as usize, 1101);
    }
}
