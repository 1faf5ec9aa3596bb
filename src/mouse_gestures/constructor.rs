use crate::mouse_gestures::pattern::{direction_difference, Pattern, PointSample, Vector2};

/// Streaming simplifier that turns raw points into a [`Pattern`].
///
/// Every call to [`PatternConstructor::add_point`] is O(1). Points closer than
/// `distance_threshold` to the current anchor are treated as jitter; runs of
/// vectors that turn by no more than `difference_threshold` are merged into
/// one segment.
#[derive(Debug, Clone)]
pub struct PatternConstructor {
    distance_threshold: f64,
    difference_threshold: f64,
    vectors: Vec<Vector2>,
    last_extracted_point: Option<PointSample>,
    previous_point: Option<PointSample>,
    previous_vector: Option<Vector2>,
    last_point: Option<PointSample>,
}

impl PatternConstructor {
    pub fn new(distance_threshold: f64, difference_threshold: f64) -> Self {
        Self {
            distance_threshold,
            difference_threshold,
            vectors: Vec::new(),
            last_extracted_point: None,
            previous_point: None,
            previous_vector: None,
            last_point: None,
        }
    }

    /// Feed one point. Returns `true` when a new vector was committed.
    pub fn add_point(&mut self, x: f64, y: f64) -> bool {
        let point = PointSample::new(x, y);
        self.last_point = Some(point);

        let (last_extracted, previous) = match (self.last_extracted_point, self.previous_point) {
            (Some(last_extracted), Some(previous)) => (last_extracted, previous),
            _ => {
                self.last_extracted_point = Some(point);
                self.previous_point = Some(point);
                return false;
            }
        };

        let vector = point - previous;
        if vector.magnitude() <= self.distance_threshold {
            return false;
        }

        let mut changed = false;
        if let Some(previous_vector) = self.previous_vector {
            let difference = direction_difference(previous_vector, vector);
            if difference.abs() > self.difference_threshold {
                self.vectors.push(previous - last_extracted);
                self.last_extracted_point = Some(previous);
                changed = true;
            }
        }
        self.previous_vector = Some(vector);
        self.previous_point = Some(point);
        changed
    }

    /// Committed vectors plus the open tail segment drawn so far.
    pub fn pattern(&self) -> Pattern {
        let mut pattern = Pattern::new(self.vectors.clone());
        if let (Some(last_extracted), Some(last_point)) =
            (self.last_extracted_point, self.last_point)
        {
            let tail = last_point - last_extracted;
            if !tail.is_zero() {
                pattern.push(tail);
            }
        }
        pattern
    }

    pub fn committed(&self) -> &[Vector2] {
        &self.vectors
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
        self.last_extracted_point = None;
        self.previous_point = None;
        self.previous_vector = None;
        self.last_point = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_never_moves_the_anchor() {
        let mut constructor = PatternConstructor::new(10.0, 0.12);
        constructor.add_point(0.0, 0.0);
        constructor.add_point(3.0, 4.0);
        constructor.add_point(-2.0, 5.0);

        assert_eq!(constructor.previous_point, Some(PointSample::new(0.0, 0.0)));
        assert!(constructor.previous_vector.is_none());
        assert_eq!(constructor.last_point, Some(PointSample::new(-2.0, 5.0)));
    }

    #[test]
    fn clear_resets_every_field() {
        let mut constructor = PatternConstructor::new(5.0, 0.12);
        for (x, y) in [(0.0, 0.0), (20.0, 0.0), (40.0, 0.0), (40.0, 20.0), (40.0, 40.0)] {
            constructor.add_point(x, y);
        }
        assert!(!constructor.committed().is_empty());

        constructor.clear();
        assert!(constructor.committed().is_empty());
        assert!(constructor.last_extracted_point.is_none());
        assert!(constructor.previous_point.is_none());
        assert!(constructor.previous_vector.is_none());
        assert!(constructor.last_point.is_none());
        assert!(constructor.pattern().is_empty());
    }
}
