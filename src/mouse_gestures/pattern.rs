use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A raw coordinate delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointSample {
    pub x: f64,
    pub y: f64,
}

impl PointSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: PointSample) -> f64 {
        (other - self).magnitude()
    }
}

impl std::ops::Sub for PointSample {
    type Output = Vector2;

    fn sub(self, rhs: PointSample) -> Vector2 {
        Vector2 {
            dx: self.x - rhs.x,
            dy: self.y - rhs.y,
        }
    }
}

/// A directed displacement. Serialized as a `[dx, dy]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vector2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2 {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Angle measured from the positive y axis, `atan2(dx, dy)`.
    pub fn direction(self) -> f64 {
        self.dx.atan2(self.dy)
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from(value: [f64; 2]) -> Self {
        Self {
            dx: value[0],
            dy: value[1],
        }
    }
}

impl From<Vector2> for [f64; 2] {
    fn from(value: Vector2) -> Self {
        [value.dx, value.dy]
    }
}

/// Signed turn between two vectors, in `(-1, 1]`.
///
/// `0` means both point the same way, `±1` is a full reversal. The sign
/// carries the handedness of the turn.
pub fn direction_difference(a: Vector2, b: Vector2) -> f64 {
    let mut angle = a.direction() - b.direction();
    if angle > PI {
        angle -= 2.0 * PI;
    } else if angle <= -PI {
        angle += 2.0 * PI;
    }
    angle / PI
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    Empty,
    NonFinite { index: usize },
    ZeroLength,
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::Empty => write!(f, "pattern has no vectors"),
            PatternError::NonFinite { index } => {
                write!(f, "pattern vector {index} has a non-finite component")
            }
            PatternError::ZeroLength => write!(f, "pattern has zero total length"),
        }
    }
}

impl std::error::Error for PatternError {}

/// Ordered direction vectors describing the shape of a gesture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(Vec<Vector2>);

impl Pattern {
    pub fn new(vectors: Vec<Vector2>) -> Self {
        Self(vectors)
    }

    pub fn vectors(&self) -> &[Vector2] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, vector: Vector2) {
        self.0.push(vector);
    }

    /// Sum of all vector lengths.
    pub fn magnitude(&self) -> f64 {
        self.0.iter().map(|vector| vector.magnitude()).sum()
    }

    /// Check that the pattern can be compared against others.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.0.is_empty() {
            return Err(PatternError::Empty);
        }
        if let Some(index) = self
            .0
            .iter()
            .position(|vector| !vector.dx.is_finite() || !vector.dy.is_finite())
        {
            return Err(PatternError::NonFinite { index });
        }
        if self.magnitude() <= 0.0 {
            return Err(PatternError::ZeroLength);
        }
        Ok(())
    }
}

impl From<Vec<Vector2>> for Pattern {
    fn from(value: Vec<Vector2>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[[f64; 2]; N]> for Pattern {
    fn from(value: [[f64; 2]; N]) -> Self {
        Self(value.into_iter().map(Vector2::from).collect())
    }
}

impl FromIterator<Vector2> for Pattern {
    fn from_iter<T: IntoIterator<Item = Vector2>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
