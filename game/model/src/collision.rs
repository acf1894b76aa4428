/// Shape intersection tests. Everything works on [`ShapeInterface`], so new
/// element types don't need changes here.
pub mod collision {
    use crate::{
        contact_effect::contact_effect::ContactEffect,
        maze_element::maze_element::MazeElement,
        shape::shape::{ShapeInterface, ShapeKind},
        types::types::Point2d,
    };

    fn cross(o: Point2d, a: Point2d, b: Point2d) -> i64 {
        (a.x as i64 - o.x as i64) * (b.y as i64 - o.y as i64)
            - (a.y as i64 - o.y as i64) * (b.x as i64 - o.x as i64)
    }

    /// Even-odd rule, points on the boundary may go either way.
    pub fn point_in_polygon(p: Point2d, vertices: &[Point2d]) -> bool {
        if vertices.len() < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (a, b) = (vertices[i], vertices[j]);
            if (a.y > p.y) != (b.y > p.y) {
                // x of the edge at height p.y, compared without division
                let lhs = (p.x as i64 - a.x as i64) * (b.y as i64 - a.y as i64);
                let rhs = (b.x as i64 - a.x as i64) * (p.y as i64 - a.y as i64);
                if (b.y > a.y && lhs < rhs) || (b.y < a.y && lhs > rhs) {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Whether segment `a1 a2` crosses segment `b1 b2`, touching counts.
    pub fn segments_intersect(a1: Point2d, a2: Point2d, b1: Point2d, b2: Point2d) -> bool {
        let d1 = cross(b1, b2, a1);
        let d2 = cross(b1, b2, a2);
        let d3 = cross(a1, a2, b1);
        let d4 = cross(a1, a2, b2);
        if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0))
        {
            return true;
        }
        let on_segment = |p: Point2d, q: Point2d, r: Point2d| {
            q.x.min(r.x) <= p.x && p.x <= q.x.max(r.x) && q.y.min(r.y) <= p.y && p.y <= q.y.max(r.y)
        };
        (d1 == 0 && on_segment(a1, b1, b2))
            || (d2 == 0 && on_segment(a2, b1, b2))
            || (d3 == 0 && on_segment(b1, a1, a2))
            || (d4 == 0 && on_segment(b2, a1, a2))
    }

    /// Squared distance from `p` to the segment `a b`.
    pub fn segment_dist_sq(p: Point2d, a: Point2d, b: Point2d) -> i64 {
        let (abx, aby) = (b.x as i64 - a.x as i64, b.y as i64 - a.y as i64);
        let (apx, apy) = (p.x as i64 - a.x as i64, p.y as i64 - a.y as i64);
        let len_sq = abx * abx + aby * aby;
        if len_sq == 0 {
            return apx * apx + apy * apy;
        }
        let t = (apx * abx + apy * aby).clamp(0, len_sq);
        // closest point is a + ab * t / len_sq
        let cx = a.x as i64 + abx * t / len_sq;
        let cy = a.y as i64 + aby * t / len_sq;
        let (dx, dy) = (p.x as i64 - cx, p.y as i64 - cy);
        dx * dx + dy * dy
    }

    fn edges(vertices: &[Point2d]) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        (0..vertices.len()).map(move |i| (vertices[i], vertices[(i + 1) % vertices.len()]))
    }

    fn cylinder_polygon<C, P>(cylinder: &C, polygon: &P) -> bool
    where
        C: ShapeInterface + ?Sized,
        P: ShapeInterface + ?Sized,
    {
        let center = cylinder.axis();
        let ray = cylinder.ray_len() as i64;
        point_in_polygon(center, polygon.vertices())
            || edges(polygon.vertices()).any(|(a, b)| segment_dist_sq(center, a, b) <= ray * ray)
    }

    fn polygon_polygon<A, B>(a: &A, b: &B) -> bool
    where
        A: ShapeInterface + ?Sized,
        B: ShapeInterface + ?Sized,
    {
        let (va, vb) = (a.vertices(), b.vertices());
        va.iter().any(|&p| point_in_polygon(p, vb))
            || vb.iter().any(|&p| point_in_polygon(p, va))
            || edges(va).any(|(a1, a2)| {
                edges(vb).any(|(b1, b2)| segments_intersect(a1, a2, b1, b2))
            })
    }

    pub fn shapes_intersect<A, B>(a: &A, b: &B) -> bool
    where
        A: ShapeInterface + ?Sized,
        B: ShapeInterface + ?Sized,
    {
        if a.z_max() < b.z_min() || b.z_max() < a.z_min() {
            return false;
        }
        if a.x_max() < b.x_min()
            || b.x_max() < a.x_min()
            || a.y_max() < b.y_min()
            || b.y_max() < a.y_min()
        {
            return false;
        }
        match (a.shape_kind(), b.shape_kind()) {
            (ShapeKind::Cylinder, ShapeKind::Cylinder) => {
                let rays = a.ray_len() as i64 + b.ray_len() as i64;
                a.axis().dist_sq(&b.axis()) <= rays * rays
            }
            (ShapeKind::Cylinder, ShapeKind::Polygon) => cylinder_polygon(a, b),
            (ShapeKind::Polygon, ShapeKind::Cylinder) => cylinder_polygon(b, a),
            (ShapeKind::Polygon, ShapeKind::Polygon) => polygon_polygon(a, b),
        }
    }

    /// Contact of a moving shape with a level element.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Contact {
        /// index into the level's free elements
        pub element: usize,
        pub effects: Vec<ContactEffect>,
    }

    /// All active elements of `room` that touch `mover`, in element order.
    pub fn detect_contacts<S: ShapeInterface + ?Sized>(
        mover: &S,
        room: usize,
        elements: &[Box<dyn MazeElement>],
    ) -> Vec<Contact> {
        elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.free_element().room == room)
            .filter_map(|(index, element)| {
                let shape = element.contact_effect_shape()?;
                shapes_intersect(mover, shape).then(|| Contact {
                    element: index,
                    effects: shape.effect_list().to_vec(),
                })
            })
            .collect()
    }

}
