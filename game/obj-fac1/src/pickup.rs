use model::{
    contact_effect::contact_effect::{
        ContactEffect, ContactEffectShapeInterface, EffectShape, PowerUpKind,
    },
    maze_element::maze_element::{FreeElement, MazeElement},
    shape::shape::CylinderShape,
    types::types::{Coordinate, SimulationTime},
};
use object_factory::{ObjectFromFactory, ObjectFromFactoryId};
use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};
use serde::{Deserialize, Serialize};

use crate::{MINE_PICKUP, MISSILE_PICKUP};

pub const PICKUP_RAY: Coordinate = 800;
pub const PICKUP_HEIGHT: Coordinate = 1500;
/// Time until a taken pickup is back.
pub const PICKUP_RESPAWN: SimulationTime = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct PickupState {
    element: FreeElement,
    respawn_in: SimulationTime,
}

/// Power up floating over the track, gone for a while after a craft took it.
#[derive(Debug)]
pub struct Pickup {
    id: ObjectFromFactoryId,
    state: PickupState,
    shape: EffectShape<CylinderShape>,
}

impl Pickup {
    pub fn new(id: ObjectFromFactoryId, kind: PowerUpKind) -> Self {
        let mut pickup = Self {
            id,
            state: Default::default(),
            shape: EffectShape::new(Default::default(), vec![ContactEffect::PowerUp(kind)]),
        };
        pickup.update_shape();
        pickup
    }

    pub fn is_active(&self) -> bool {
        self.state.respawn_in <= 0
    }

    fn update_shape(&mut self) {
        let position = self.state.element.position;
        self.shape.shape = CylinderShape {
            axis: position.xy(),
            ray: PICKUP_RAY,
            z_min: position.z,
            z_max: position.z + PICKUP_HEIGHT,
        };
    }
}

pub fn new_pickup(id: ObjectFromFactoryId) -> Box<dyn MazeElement> {
    let kind = match id {
        MISSILE_PICKUP => PowerUpKind::Missile,
        MINE_PICKUP => PowerUpKind::Mine,
        _ => PowerUpKind::Speed,
    };
    Box::new(Pickup::new(id, kind))
}

impl ObjectFromFactory for Pickup {
    fn factory_id(&self) -> ObjectFromFactoryId {
        self.id
    }

    fn save(&self, archive: &mut ObjStreamWriter) -> Result<(), ObjStreamError> {
        archive.write(&self.state)
    }

    fn load(&mut self, archive: &mut ObjStreamReader) -> Result<(), ObjStreamError> {
        self.state = archive.read()?;
        self.update_shape();
        Ok(())
    }
}

impl MazeElement for Pickup {
    fn free_element(&self) -> &FreeElement {
        &self.state.element
    }

    fn free_element_mut(&mut self) -> &mut FreeElement {
        &mut self.state.element
    }

    fn place(&mut self, placement: FreeElement) {
        self.state.element = placement;
        self.update_shape();
    }

    fn contact_effect_shape(&self) -> Option<&dyn ContactEffectShapeInterface> {
        self.is_active()
            .then_some(&self.shape as &dyn ContactEffectShapeInterface)
    }

    fn simulate(&mut self, duration: SimulationTime) {
        if !self.is_active() {
            self.state.respawn_in -= duration;
        }
    }

    fn on_contact(&mut self, _effect: &ContactEffect, _time: SimulationTime) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state.respawn_in = PICKUP_RESPAWN;
        true
    }

    fn is_weapon(&self) -> bool {
        self.shape.effects.iter().any(|effect| match effect {
            ContactEffect::PowerUp(kind) => kind.is_weapon(),
            _ => false,
        })
    }
}

#[cfg(test)]
mod test {
    use model::{
        contact_effect::contact_effect::{ContactEffect, PowerUpKind},
        maze_element::maze_element::FreeElement,
        types::types::{Angle, Point3d},
    };

    use super::{new_pickup, PICKUP_HEIGHT, PICKUP_RAY, PICKUP_RESPAWN};
    use crate::{reload, MINE_PICKUP, SPEED_PICKUP};

    #[test]
    fn taken_and_respawned() {
        let mut mine = new_pickup(MINE_PICKUP);
        assert!(mine.is_weapon());
        assert!(!new_pickup(SPEED_PICKUP).is_weapon());

        let effect = ContactEffect::PowerUp(PowerUpKind::Mine);
        assert!(mine.contact_effect_shape().is_some());
        assert!(mine.on_contact(&effect, 100));
        // the second craft in the same step gets nothing
        assert!(!mine.on_contact(&effect, 100));
        assert!(mine.contact_effect_shape().is_none());

        mine.simulate(PICKUP_RESPAWN - 10);
        assert!(mine.contact_effect_shape().is_none());
        mine.simulate(10);
        assert_eq!(
            mine.contact_effect_shape().unwrap().effect_list(),
            &[ContactEffect::PowerUp(PowerUpKind::Mine)]
        );
    }

    #[test]
    fn reload_keeps_the_respawn_time() {
        let mut mine = new_pickup(MINE_PICKUP);
        let placement = FreeElement {
            position: Point3d::new(3000, 4000, 100),
            orientation: Angle::default(),
            room: 1,
        };
        mine.place(placement);
        assert!(mine.on_contact(&ContactEffect::PowerUp(PowerUpKind::Mine), 0));
        mine.simulate(4000);

        let mut mine = reload(mine);
        assert_eq!(mine.factory_id(), MINE_PICKUP);
        assert_eq!(*mine.free_element(), placement);
        assert!(mine.is_weapon());
        assert!(mine.contact_effect_shape().is_none());

        mine.simulate(PICKUP_RESPAWN - 4000 - 10);
        assert!(mine.contact_effect_shape().is_none());
        mine.simulate(10);
        let shape = mine.contact_effect_shape().unwrap();
        assert_eq!((shape.axis_x(), shape.axis_y()), (3000, 4000));
        assert_eq!(shape.ray_len(), PICKUP_RAY);
        assert_eq!((shape.z_min(), shape.z_max()), (100, 100 + PICKUP_HEIGHT));

        // an untouched pickup stays active
        let speed = reload(new_pickup(SPEED_PICKUP));
        assert!(speed.contact_effect_shape().is_some());
    }
}
