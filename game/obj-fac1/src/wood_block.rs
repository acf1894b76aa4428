use model::{
    contact_effect::contact_effect::{ContactEffect, ContactEffectShapeInterface, EffectShape},
    maze_element::maze_element::{FreeElement, MazeElement},
    shape::shape::PolygonShape,
    types::types::Coordinate,
};
use object_factory::{ObjectFromFactory, ObjectFromFactoryId};
use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};

pub const WOOD_BLOCK_HALF_SIZE: Coordinate = 1000;
pub const WOOD_BLOCK_HEIGHT: Coordinate = 2000;

/// Heavy square obstacle crafts bounce off.
#[derive(Debug)]
pub struct WoodBlock {
    id: ObjectFromFactoryId,
    element: FreeElement,
    shape: EffectShape<PolygonShape>,
}

impl WoodBlock {
    pub fn new(id: ObjectFromFactoryId) -> Self {
        let mut block = Self {
            id,
            element: Default::default(),
            shape: EffectShape::new(
                Default::default(),
                vec![ContactEffect::PhysicalCollision {
                    weight: 100_000,
                    elasticity: 300,
                }],
            ),
        };
        block.update_shape();
        block
    }

    fn update_shape(&mut self) {
        let FreeElement {
            position,
            orientation,
            ..
        } = self.element;
        self.shape.shape = PolygonShape::rectangle(
            position.xy(),
            WOOD_BLOCK_HALF_SIZE,
            WOOD_BLOCK_HALF_SIZE,
            orientation,
            position.z,
            position.z + WOOD_BLOCK_HEIGHT,
        );
    }
}

pub fn new_wood_block(id: ObjectFromFactoryId) -> Box<dyn MazeElement> {
    Box::new(WoodBlock::new(id))
}

impl ObjectFromFactory for WoodBlock {
    fn factory_id(&self) -> ObjectFromFactoryId {
        self.id
    }

    fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
        archive.write(&self.element)
    }

    fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError> {
        self.element = archive.read()?;
        self.update_shape();
        Ok(())
    }
}

impl MazeElement for WoodBlock {
    fn free_element(&self) -> &FreeElement {
        &self.element
    }

    fn free_element_mut(&mut self) -> &mut FreeElement {
        &mut self.element
    }

    fn place(&mut self, placement: FreeElement) {
        self.element = placement;
        self.update_shape();
    }

    fn contact_effect_shape(&self) -> Option<&dyn ContactEffectShapeInterface> {
        Some(&self.shape)
    }
}
