pub mod contact_effect {
    use serde::{Deserialize, Serialize};

    use crate::shape::shape::{ShapeInterface, ShapeKind};
    use crate::types::types::Coordinate;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum CheckPointType {
        FinishLine,
        CheckPoint1,
        CheckPoint2,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CheckPoint {
        pub check_point_type: CheckPointType,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum PowerUpKind {
        Missile,
        Mine,
        Speed,
    }

    impl PowerUpKind {
        pub fn is_weapon(&self) -> bool {
            matches!(self, Self::Missile | Self::Mine)
        }
    }

    /// What touching a shape does to a craft.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ContactEffect {
        /// `elasticity` is in 1/1000.
        PhysicalCollision { weight: i32, elasticity: i32 },
        CheckPoint(CheckPoint),
        PowerUp(PowerUpKind),
        /// added speed in mm/s
        SpeedDoper { boost: i32 },
    }

    pub type ContactEffectList = Vec<ContactEffect>;

    /// A shape that has effects on whatever touches it.
    pub trait ContactEffectShapeInterface: ShapeInterface {
        /// Ordered, possibly empty.
        fn effect_list(&self) -> &[ContactEffect];

        /// Shape used as the reference when an effect is applied, e.g. the
        /// push out direction of a physical collision.
        fn receiving_contact_effect_shape(&self) -> &dyn ShapeInterface;
    }

    /// A shape together with its effects.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct EffectShape<S> {
        pub shape: S,
        pub effects: ContactEffectList,
    }

    impl<S: ShapeInterface> EffectShape<S> {
        pub fn new(shape: S, effects: ContactEffectList) -> Self {
            Self { shape, effects }
        }
    }

    impl<S: ShapeInterface> ShapeInterface for EffectShape<S> {
        fn shape_kind(&self) -> ShapeKind {
            self.shape.shape_kind()
        }

        fn z_min(&self) -> Coordinate {
            self.shape.z_min()
        }

        fn z_max(&self) -> Coordinate {
            self.shape.z_max()
        }

        fn axis_x(&self) -> Coordinate {
            self.shape.axis_x()
        }

        fn axis_y(&self) -> Coordinate {
            self.shape.axis_y()
        }

        fn ray_len(&self) -> Coordinate {
            self.shape.ray_len()
        }

        fn vertices(&self) -> &[crate::types::types::Point2d] {
            self.shape.vertices()
        }

        fn x_min(&self) -> Coordinate {
            self.shape.x_min()
        }

        fn x_max(&self) -> Coordinate {
            self.shape.x_max()
        }

        fn y_min(&self) -> Coordinate {
            self.shape.y_min()
        }

        fn y_max(&self) -> Coordinate {
            self.shape.y_max()
        }
    }

    impl<S: ShapeInterface> ContactEffectShapeInterface for EffectShape<S> {
        fn effect_list(&self) -> &[ContactEffect] {
            &self.effects
        }

        fn receiving_contact_effect_shape(&self) -> &dyn ShapeInterface {
            &self.shape
        }
    }
}
