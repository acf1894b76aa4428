pub mod shape {
    use serde::{Deserialize, Serialize};

    use crate::types::types::{isqrt, Angle, Coordinate, Point2d};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ShapeKind {
        Cylinder,
        Polygon,
    }

    /// Geometry of anything that takes part in collisions.
    ///
    /// Polygons report the center and radius of their bounding circle as axis
    /// and ray, so the cheap circle test can be done for every shape.
    pub trait ShapeInterface {
        fn shape_kind(&self) -> ShapeKind;
        fn z_min(&self) -> Coordinate;
        fn z_max(&self) -> Coordinate;
        fn axis_x(&self) -> Coordinate;
        fn axis_y(&self) -> Coordinate;
        fn ray_len(&self) -> Coordinate;

        /// Counter clockwise outline, empty for cylinders.
        fn vertices(&self) -> &[Point2d] {
            &[]
        }

        fn axis(&self) -> Point2d {
            Point2d::new(self.axis_x(), self.axis_y())
        }

        fn x_min(&self) -> Coordinate {
            self.axis_x() - self.ray_len()
        }

        fn x_max(&self) -> Coordinate {
            self.axis_x() + self.ray_len()
        }

        fn y_min(&self) -> Coordinate {
            self.axis_y() - self.ray_len()
        }

        fn y_max(&self) -> Coordinate {
            self.axis_y() + self.ray_len()
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CylinderShape {
        pub axis: Point2d,
        pub ray: Coordinate,
        pub z_min: Coordinate,
        pub z_max: Coordinate,
    }

    impl ShapeInterface for CylinderShape {
        fn shape_kind(&self) -> ShapeKind {
            ShapeKind::Cylinder
        }

        fn z_min(&self) -> Coordinate {
            self.z_min
        }

        fn z_max(&self) -> Coordinate {
            self.z_max
        }

        fn axis_x(&self) -> Coordinate {
            self.axis.x
        }

        fn axis_y(&self) -> Coordinate {
            self.axis.y
        }

        fn ray_len(&self) -> Coordinate {
            self.ray
        }
    }

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    pub struct PolygonShape {
        vertices: Vec<Point2d>,
        z_min: Coordinate,
        z_max: Coordinate,

        center: Point2d,
        ray: Coordinate,
        min: Point2d,
        max: Point2d,
    }

    impl PolygonShape {
        pub fn new(vertices: Vec<Point2d>, z_min: Coordinate, z_max: Coordinate) -> Self {
            let min = Point2d::new(
                vertices.iter().map(|v| v.x).min().unwrap_or_default(),
                vertices.iter().map(|v| v.y).min().unwrap_or_default(),
            );
            let max = Point2d::new(
                vertices.iter().map(|v| v.x).max().unwrap_or_default(),
                vertices.iter().map(|v| v.y).max().unwrap_or_default(),
            );
            let center = Point2d::new(
                ((min.x as i64 + max.x as i64) / 2) as Coordinate,
                ((min.y as i64 + max.y as i64) / 2) as Coordinate,
            );
            let ray = vertices
                .iter()
                .map(|v| isqrt(v.dist_sq(&center)) + 1)
                .max()
                .unwrap_or_default() as Coordinate;
            Self {
                vertices,
                z_min,
                z_max,
                center,
                ray,
                min,
                max,
            }
        }

        /// Axis aligned box around `center`.
        pub fn rectangle(
            center: Point2d,
            half_width: Coordinate,
            half_height: Coordinate,
            orientation: Angle,
            z_min: Coordinate,
            z_max: Coordinate,
        ) -> Self {
            let corners = [
                Point2d::new(-half_width, -half_height),
                Point2d::new(half_width, -half_height),
                Point2d::new(half_width, half_height),
                Point2d::new(-half_width, half_height),
            ];
            Self::new(
                corners
                    .into_iter()
                    .map(|corner| orientation.rotate(corner) + center)
                    .collect(),
                z_min,
                z_max,
            )
        }
    }

    impl ShapeInterface for PolygonShape {
        fn shape_kind(&self) -> ShapeKind {
            ShapeKind::Polygon
        }

        fn z_min(&self) -> Coordinate {
            self.z_min
        }

        fn z_max(&self) -> Coordinate {
            self.z_max
        }

        fn axis_x(&self) -> Coordinate {
            self.center.x
        }

        fn axis_y(&self) -> Coordinate {
            self.center.y
        }

        fn ray_len(&self) -> Coordinate {
            self.ray
        }

        fn vertices(&self) -> &[Point2d] {
            &self.vertices
        }

        fn x_min(&self) -> Coordinate {
            self.min.x
        }

        fn x_max(&self) -> Coordinate {
            self.max.x
        }

        fn y_min(&self) -> Coordinate {
            self.min.y
        }

        fn y_max(&self) -> Coordinate {
            self.max.y
        }
    }

}
