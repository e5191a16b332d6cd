// THEORY:
// The `geometry` module is the shared spatial vocabulary of the whole engine.
// Every layer above it (classification, grouping, relationship building and
// cross-image deduplication) asks the same few questions about rectangles:
// how big is it, how far away is the other one, and how much of one sits on
// top of the other.
//
// Key architectural principles:
// 1.  **Dumb Data Container**: `Bounds` is a plain value type in pixel space.
//     It never knows what UI role it plays; that is decided further up.
// 2.  **Containment, Not IoU**: `overlap_ratio` divides the intersection by the
//     *smaller* of the two areas. A small label fully inside a large button
//     therefore reads as 1.0, which is exactly what both the text-containment
//     test in the classifier and the duplicate test in the merger need.
// 3.  **Clustering Helper**: `cluster_positions` groups 1D coordinates that lie
//     within a tolerance of a cluster's anchor. It is the single primitive used
//     to estimate grid columns/rows and to detect grid systems.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Width divided by height. Follows IEEE semantics for a zero height
    /// (infinite for a non-zero width, NaN for a degenerate box), so every
    /// comparison against a NaN ratio is false.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// True when every coordinate is finite and the extent is non-negative.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    pub fn intersection_area(&self, other: &Bounds) -> f64 {
        let overlap_w = (self.right().min(other.right()) - self.x.max(other.x)).max(0.0);
        let overlap_h = (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0);
        overlap_w * overlap_h
    }

    /// Intersection area divided by the smaller of the two areas, in [0, 1].
    ///
    /// This is a containment ratio rather than intersection-over-union: it
    /// answers "how much of the smaller box is covered". Degenerate boxes
    /// (zero area) never overlap anything.
    pub fn overlap_ratio(&self, other: &Bounds) -> f64 {
        let smaller = self.area().min(other.area());
        if smaller <= 0.0 {
            return 0.0;
        }
        (self.intersection_area(other) / smaller).clamp(0.0, 1.0)
    }

    /// Euclidean distance between the two top-left corners.
    pub fn origin_distance(&self, other: &Bounds) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Euclidean distance between the two centers.
    pub fn center_distance(&self, other: &Bounds) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// The smallest rectangle enclosing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Rounds every coordinate to one decimal place.
    pub fn rounded(&self) -> Bounds {
        let round = |v: f64| (v * 10.0).round() / 10.0;
        Bounds {
            x: round(self.x),
            y: round(self.y),
            width: round(self.width),
            height: round(self.height),
        }
    }
}

/// Groups positions into clusters. A position joins the current cluster when
/// it lies within `tolerance` of that cluster's first (smallest) member.
/// Returns the anchor of each cluster in ascending order.
pub fn cluster_positions(positions: impl IntoIterator<Item = f64>, tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = positions.into_iter().filter(|p| p.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut anchors: Vec<f64> = Vec::new();
    for position in sorted {
        match anchors.last() {
            Some(anchor) if position - anchor <= tolerance => {}
            _ => anchors.push(position),
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn test_intersection_of_disjoint_boxes_is_zero() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, 20.0, 10.0, 10.0);
        assert_approx_eq!(f64, a.intersection_area(&b), 0.0);
        assert_approx_eq!(f64, a.overlap_ratio(&b), 0.0);
    }

    #[test]
    fn test_small_box_inside_large_box_is_fully_contained() {
        let button = Bounds::new(0.0, 0.0, 200.0, 50.0);
        let label = Bounds::new(20.0, 10.0, 40.0, 20.0);
        assert_approx_eq!(f64, button.overlap_ratio(&label), 1.0);
        assert_approx_eq!(f64, label.overlap_ratio(&button), 1.0);
    }

    #[test]
    fn test_degenerate_box_never_overlaps() {
        let a = Bounds::new(0.0, 0.0, 0.0, 10.0);
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert_approx_eq!(f64, a.overlap_ratio(&b), 0.0);
    }

    #[test]
    fn test_rounded_keeps_one_decimal() {
        let b = Bounds::new(10.26, 3.04, 99.96, 0.149).rounded();
        assert_approx_eq!(f64, b.x, 10.3);
        assert_approx_eq!(f64, b.y, 3.0);
        assert_approx_eq!(f64, b.width, 100.0);
        assert_approx_eq!(f64, b.height, 0.1);
    }

    #[test]
    fn test_union_encloses_both() {
        let a = Bounds::new(10.0, 10.0, 10.0, 10.0);
        let b = Bounds::new(0.0, 30.0, 5.0, 5.0);
        assert_eq!(a.union(&b), Bounds::new(0.0, 10.0, 20.0, 25.0));
    }

    #[test]
    fn test_cluster_positions_merges_within_tolerance() {
        let anchors = cluster_positions([0.0, 4.0, 10.0, 11.0, 40.0, 300.0, 305.0], 10.0);
        assert_eq!(anchors, vec![0.0, 11.0, 40.0, 300.0]);
    }

    #[test]
    fn test_aspect_ratio_of_zero_height_is_not_finite() {
        assert!(Bounds::new(0.0, 0.0, 10.0, 0.0).aspect_ratio().is_infinite());
        assert!(Bounds::new(0.0, 0.0, 0.0, 0.0).aspect_ratio().is_nan());
    }

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -500.0f64..2000.0,
            -500.0f64..2000.0,
            0.0f64..1500.0,
            0.0f64..1500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new(x, y, w, h))
    }

    fn check_overlap_is_bounded(a: Bounds, b: Bounds) -> Result<(), TestCaseError> {
        let ratio = a.overlap_ratio(&b);
        prop_assert!((0.0..=1.0).contains(&ratio));
        Ok(())
    }

    proptest! {
        #[test]
        fn overlap_is_bounded_in_given_order(a in bounds_strategy(), b in bounds_strategy()) {
            check_overlap_is_bounded(a, b)?;
        }

        #[test]
        fn overlap_is_bounded_in_swapped_order(a in bounds_strategy(), b in bounds_strategy()) {
            check_overlap_is_bounded(b, a)?;
        }

        #[test]
        fn union_contains_both(a in bounds_strategy(), b in bounds_strategy()) {
            let u = a.union(&b);
            prop_assert!(u.x <= a.x && u.x <= b.x);
            prop_assert!(u.right() >= a.right() - 1e-9 && u.right() >= b.right() - 1e-9);
        }
    }
}
