pub mod types {
    use std::ops::{Add, Sub};

    use once_cell::sync::Lazy;
    use serde::{Deserialize, Serialize};

    /// Millimetres.
    pub type Coordinate = i32;
    /// Milliseconds.
    pub type SimulationTime = i32;

    /// Angle units of a full turn.
    pub const ANGLE_STEPS: i32 = 4096;
    /// Fixed point unit of the trigonometric table.
    pub const TRIGO_FRACT: i32 = 1024;

    /// Fraction bits of the series evaluation below.
    const SERIES_FRACT_BITS: u32 = 40;
    /// pi in `SERIES_FRACT_BITS` fixed point.
    const SERIES_PI: i128 = 3_454_217_652_358;

    /// Taylor series of sin (`first = x`, `n = 1`) or cos (`first = 1`, `n = 0`).
    fn trigo_series(x: i128, first: i128, mut n: i128) -> i128 {
        let mut term = first;
        let mut sum = 0;
        let mut negative = false;
        while term != 0 {
            sum += if negative { -term } else { term };
            term = (term * x) >> SERIES_FRACT_BITS;
            term = (term * x) >> SERIES_FRACT_BITS;
            term /= (n + 1) * (n + 2);
            n += 2;
            negative = !negative;
        }
        sum
    }

    /// (cos, sin) of the first quadrant, `step` in `0..ANGLE_STEPS / 4`.
    fn quadrant_cos_sin(step: i32) -> (i32, i32) {
        let x = SERIES_PI * step as i128 / (ANGLE_STEPS / 2) as i128;
        let round = |v: i128| {
            ((v * TRIGO_FRACT as i128 + (1 << (SERIES_FRACT_BITS - 1))) >> SERIES_FRACT_BITS)
                as i32
        };
        (
            round(trigo_series(x, 1 << SERIES_FRACT_BITS, 0)),
            round(trigo_series(x, x, 1)),
        )
    }

    /// Integer only, so the table is the same on every platform.
    static TRIGO_TABLE: Lazy<Vec<(i32, i32)>> = Lazy::new(|| {
        let quarter = ANGLE_STEPS / 4;
        (0..ANGLE_STEPS)
            .map(|i| {
                let (cos, sin) = quadrant_cos_sin(i % quarter);
                match i / quarter {
                    0 => (cos, sin),
                    1 => (-sin, cos),
                    2 => (-cos, -sin),
                    _ => (sin, -cos),
                }
            })
            .collect()
    });

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Point2d {
        pub x: Coordinate,
        pub y: Coordinate,
    }

    impl Point2d {
        pub const fn new(x: Coordinate, y: Coordinate) -> Self {
            Self { x, y }
        }

        pub fn dist_sq(&self, other: &Point2d) -> i64 {
            let dx = (self.x - other.x) as i64;
            let dy = (self.y - other.y) as i64;
            dx * dx + dy * dy
        }
    }

    impl Add for Point2d {
        type Output = Point2d;

        fn add(self, rhs: Self) -> Self::Output {
            Point2d::new(self.x + rhs.x, self.y + rhs.y)
        }
    }

    impl Sub for Point2d {
        type Output = Point2d;

        fn sub(self, rhs: Self) -> Self::Output {
            Point2d::new(self.x - rhs.x, self.y - rhs.y)
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Point3d {
        pub x: Coordinate,
        pub y: Coordinate,
        pub z: Coordinate,
    }

    impl Point3d {
        pub const fn new(x: Coordinate, y: Coordinate, z: Coordinate) -> Self {
            Self { x, y, z }
        }

        pub fn xy(&self) -> Point2d {
            Point2d::new(self.x, self.y)
        }
    }

    /// Orientation, [`ANGLE_STEPS`] units per turn, counter clockwise from the x axis.
    #[derive(
        Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    )]
    pub struct Angle(u16);

    impl Angle {
        pub fn new(units: i32) -> Self {
            Self(units.rem_euclid(ANGLE_STEPS) as u16)
        }

        pub fn units(&self) -> i32 {
            self.0 as i32
        }

        pub fn rotated(&self, units: i32) -> Self {
            Self::new(self.units() + units)
        }

        /// Cosine times [`TRIGO_FRACT`].
        pub fn cos(&self) -> i32 {
            TRIGO_TABLE[self.0 as usize].0
        }

        /// Sine times [`TRIGO_FRACT`].
        pub fn sin(&self) -> i32 {
            TRIGO_TABLE[self.0 as usize].1
        }

        /// Rotates `p` around the origin.
        pub fn rotate(&self, p: Point2d) -> Point2d {
            let (cos, sin) = (self.cos() as i64, self.sin() as i64);
            let (x, y) = (p.x as i64, p.y as i64);
            Point2d::new(
                ((x * cos - y * sin) / TRIGO_FRACT as i64) as Coordinate,
                ((x * sin + y * cos) / TRIGO_FRACT as i64) as Coordinate,
            )
        }
    }

    /// Integer square root, rounded down.
    pub fn isqrt(value: i64) -> i64 {
        if value <= 0 {
            return 0;
        }
        let mut x = value;
        let mut y = (x + 1) / 2;
        while y < x {
            x = y;
            y = (x + value / x) / 2;
        }
        x
    }

}
