//! Axis-aligned bounding boxes

use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// A box containing nothing; merging anything into it yields that thing
    pub fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| Self::new(acc.min.min(p), acc.max.max(p)))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Common region, `None` when the boxes only touch or are apart
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min.x < max.x && min.y < max.y && min.z < max.z).then(|| Self::new(min, max))
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.min.x && x <= self.max.x && y >= self.min.y && y <= self.max.y
    }

    pub fn size(&self) -> DVec3 {
        if self.is_empty() {
            DVec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn largest_dimension(&self) -> f64 {
        self.size().max_element()
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(self.min - DVec3::splat(margin), self.max + DVec3::splat(margin))
    }

    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, b.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(b.x, b.y, b.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_merge() {
        let b = BoundingBox::new(DVec3::ZERO, DVec3::ONE);
        assert!(BoundingBox::empty().is_empty());
        assert_eq!(BoundingBox::empty().merge(&b), b);
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = BoundingBox::new(DVec3::ZERO, DVec3::ONE);
        let b = BoundingBox::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        assert!(!a.overlaps(&b));
        let c = BoundingBox::new(DVec3::splat(0.5), DVec3::splat(3.0));
        assert_eq!(
            a.intersection(&c),
            Some(BoundingBox::new(DVec3::splat(0.5), DVec3::ONE))
        );
    }

    #[test]
    fn test_largest_dimension() {
        let b = BoundingBox::from_points([DVec3::new(-1.0, 0.0, 2.0), DVec3::new(3.0, 1.0, -4.0)]);
        assert_eq!(b.largest_dimension(), 6.0);
        assert!(b.contains(DVec3::new(0.0, 0.5, 0.0)));
    }
}
