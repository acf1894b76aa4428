use model::{
    contact_effect::contact_effect::{
        CheckPoint, CheckPointType, ContactEffect, ContactEffectShapeInterface, EffectShape,
    },
    maze_element::maze_element::{FreeElement, MazeElement},
    shape::shape::CylinderShape,
    types::types::Coordinate,
};
use object_factory::{ObjectFromFactory, ObjectFromFactoryId};
use parcel::obj_stream::{ObjStreamError, ObjStreamReader, ObjStreamWriter};

use crate::{CHECK_POINT_1, CHECK_POINT_2};

pub const FINISH_LINE_RAY: Coordinate = 2500;
pub const FINISH_LINE_HEIGHT: Coordinate = 4000;

/// Lap checkpoint. Despite the name only one of three, see [`CheckPointType`].
#[derive(Debug)]
pub struct FinishLine {
    id: ObjectFromFactoryId,
    element: FreeElement,
    check_point_type: CheckPointType,
    shape: EffectShape<CylinderShape>,
}

impl FinishLine {
    pub fn new(id: ObjectFromFactoryId, check_point_type: CheckPointType) -> Self {
        let mut finish_line = Self {
            id,
            element: Default::default(),
            check_point_type,
            shape: EffectShape::new(
                Default::default(),
                vec![ContactEffect::CheckPoint(CheckPoint { check_point_type })],
            ),
        };
        finish_line.update_shape();
        finish_line
    }

    pub fn check_point_type(&self) -> CheckPointType {
        self.check_point_type
    }

    fn update_shape(&mut self) {
        let position = self.element.position;
        self.shape.shape = CylinderShape {
            axis: position.xy(),
            ray: FINISH_LINE_RAY,
            z_min: position.z,
            z_max: position.z + FINISH_LINE_HEIGHT,
        };
    }
}

pub fn new_finish_line(id: ObjectFromFactoryId) -> Box<dyn MazeElement> {
    let check_point_type = match id {
        CHECK_POINT_1 => CheckPointType::CheckPoint1,
        CHECK_POINT_2 => CheckPointType::CheckPoint2,
        _ => CheckPointType::FinishLine,
    };
    Box::new(FinishLine::new(id, check_point_type))
}

impl ObjectFromFactory for FinishLine {
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

impl MazeElement for FinishLine {
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

#[cfg(test)]
mod test {
    use model::{
        contact_effect::contact_effect::{CheckPoint, CheckPointType, ContactEffect},
        maze_element::maze_element::FreeElement,
        shape::shape::ShapeKind,
        types::types::{Angle, Point3d},
    };
    use parcel::obj_stream::{ObjStreamReader, ObjStreamWriter};

    use super::{new_finish_line, FINISH_LINE_HEIGHT, FINISH_LINE_RAY};
    use crate::{CHECK_POINT_1, FINISH_LINE};

    #[test]
    fn one_check_point_effect() {
        let mut cp = new_finish_line(CHECK_POINT_1);
        cp.place(FreeElement {
            position: Point3d::new(1000, 2000, 300),
            orientation: Angle::new(0),
            room: 2,
        });

        let shape = cp.contact_effect_shape().unwrap();
        assert_eq!(shape.shape_kind(), ShapeKind::Cylinder);
        assert_eq!((shape.axis_x(), shape.axis_y()), (1000, 2000));
        assert_eq!(shape.ray_len(), FINISH_LINE_RAY);
        assert_eq!(shape.z_min(), 300);
        assert_eq!(shape.z_max(), 300 + FINISH_LINE_HEIGHT);
        assert_eq!(
            shape.effect_list(),
            &[ContactEffect::CheckPoint(CheckPoint {
                check_point_type: CheckPointType::CheckPoint1
            })]
        );
        assert_eq!(shape.receiving_contact_effect_shape().axis_x(), 1000);

        let mut writer = ObjStreamWriter::new();
        cp.save(&mut writer).unwrap();
        let mut copy = new_finish_line(FINISH_LINE);
        copy.load(&mut ObjStreamReader::new(writer.as_slice())).unwrap();
        assert_eq!(copy.free_element().room, 2);
        assert_eq!(copy.contact_effect_shape().unwrap().axis_y(), 2000);
    }
}
