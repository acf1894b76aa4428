pub mod maze_element {
    use object_factory::ObjectFromFactory;
    use serde::{Deserialize, Serialize};

    use crate::{
        contact_effect::contact_effect::{ContactEffect, ContactEffectShapeInterface},
        types::types::{Angle, Point3d, SimulationTime},
    };

    /// Placement of an element in the level.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FreeElement {
        pub position: Point3d,
        pub orientation: Angle,
        pub room: usize,
    }

    /// Anything placed in a level besides the rooms themselves.
    ///
    /// Registered in the object factory with `dyn MazeElement` as base.
    pub trait MazeElement: ObjectFromFactory {
        fn free_element(&self) -> &FreeElement;
        fn free_element_mut(&mut self) -> &mut FreeElement;

        /// Moves the element, elements that cache world space shapes override this.
        fn place(&mut self, placement: FreeElement) {
            *self.free_element_mut() = placement;
        }

        /// The shape crafts collide with, `None` while the element is inactive.
        fn contact_effect_shape(&self) -> Option<&dyn ContactEffectShapeInterface>;

        fn simulate(&mut self, _duration: SimulationTime) {}

        /// A craft touched the element and is about to receive `effect`.
        /// Returns `false` if the effect must not be applied (e.g. the element was just consumed).
        fn on_contact(&mut self, _effect: &ContactEffect, _time: SimulationTime) -> bool {
            true
        }

        /// Weapon elements are left out when weapons are disabled.
        fn is_weapon(&self) -> bool {
            false
        }
    }
}
