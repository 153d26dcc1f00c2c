//! Fundamental geometric types for mesh classification.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Position in three dimensional space in the modelling tool's Z-up frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
    /// Elevation along the global Z axis.
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Whether the point sits exactly at zero elevation.
    ///
    /// No tolerance is applied; `1e-12` is above ground.
    #[must_use]
    pub fn is_at_ground(self) -> bool {
        self.z == 0.0
    }
}

impl From<Vector3<f64>> for Point {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Point> for Vector3<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use structmesh::point;
///
/// let origin = point(0.0, 0.0, 0.0);
/// assert!(origin.is_at_ground());
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

/// Global axis of the solver's Y-up coordinate frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal X axis, shared with the modelling frame.
    X,
    /// Vertical axis of the solver frame.
    Y,
    /// Horizontal axis matching the modelling frame's Y.
    Z,
}

impl Axis {
    /// Single letter code used by the solver's load records.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

/// Unit normal of the plane through the first three points of a polygon.
///
/// Returns `None` when fewer than three points are supplied or when the first three
/// are collinear.
///
/// # Examples
/// ```
/// use structmesh::{face_normal, point};
///
/// let normal = face_normal(&[
///     point(0.0, 0.0, 0.0),
///     point(1.0, 0.0, 0.0),
///     point(0.0, 1.0, 0.0),
/// ])
/// .expect("triangle is not degenerate");
/// assert_eq!(normal.z, 1.0);
/// ```
#[must_use]
pub fn face_normal(points: &[Point]) -> Option<Vector3<f64>> {
    let [a, b, c] = match points {
        [a, b, c, ..] => [a.to_vector(), b.to_vector(), c.to_vector()],
        _ => return None,
    };
    let cross = (b - a).cross(&(c - a));
    let length = cross.norm();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    Some(cross / length)
}

/// Pick the horizontal solver axis a wind load acts along for a face with `normal`.
///
/// The heading of the normal in the XY plane selects the axis: within 45 degrees of
/// the X axis loads along [`Axis::X`], otherwise along [`Axis::Z`]. A vertical normal
/// has a heading of zero and therefore maps to [`Axis::X`].
#[must_use]
pub fn horizontal_load_axis(normal: Vector3<f64>) -> Axis {
    let heading = normal.y.atan2(normal.x).to_degrees();
    if (-45.0..45.0).contains(&heading) {
        Axis::X
    } else if (45.0..135.0).contains(&heading) || (-135.0..-45.0).contains(&heading) {
        Axis::Z
    } else {
        Axis::X
    }
}
