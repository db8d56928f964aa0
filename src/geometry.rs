//! Geometric helpers: item orientations and the collision test between placed boxes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Axis, BoundingBox, Vec3};

/// Axis-aligned orientation of an item.
///
/// Each variant names which of the item's own dimensions (w, h, d) lands on
/// the bin's width, height and depth axis. The declaration order is the order
/// in which orientations are tried; the first one that fits wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// (w,h,d)
    #[default]
    Whd,
    /// (h,w,d)
    Hwd,
    /// (h,d,w)
    Hdw,
    /// (d,h,w)
    Dhw,
    /// (d,w,h)
    Dwh,
    /// (w,d,h)
    Wdh,
}

impl Orientation {
    /// All orientations in tie-break order.
    pub const ALL: [Orientation; 6] = [
        Orientation::Whd,
        Orientation::Hwd,
        Orientation::Hdw,
        Orientation::Dhw,
        Orientation::Dwh,
        Orientation::Wdh,
    ];

    /// Orientations to try, depending on whether rotation is allowed.
    pub fn candidates(allow_rotation: bool) -> &'static [Orientation] {
        if allow_rotation {
            &Self::ALL
        } else {
            &Self::ALL[..1]
        }
    }

    /// Permutes unrotated dimensions `(w, h, d)` into the extent along
    /// the bin's width, height and depth axis.
    ///
    /// # Examples
    /// ```
    /// use cubepack::geometry::Orientation;
    /// use cubepack::types::Vec3;
    ///
    /// let dims = Vec3::new(150.0, 50.0, 40.0);
    /// assert_eq!(Orientation::Hdw.extent(dims), Vec3::new(50.0, 40.0, 150.0));
    /// ```
    pub fn extent(self, dims: Vec3) -> Vec3 {
        let Vec3 { x: w, y: h, z: d } = dims;
        match self {
            Orientation::Whd => Vec3::new(w, h, d),
            Orientation::Hwd => Vec3::new(h, w, d),
            Orientation::Hdw => Vec3::new(h, d, w),
            Orientation::Dhw => Vec3::new(d, h, w),
            Orientation::Dwh => Vec3::new(d, w, h),
            Orientation::Wdh => Vec3::new(w, d, h),
        }
    }

    /// Short machine-readable code, e.g. `"hdw"`.
    pub fn code(self) -> &'static str {
        match self {
            Orientation::Whd => "whd",
            Orientation::Hwd => "hwd",
            Orientation::Hdw => "hdw",
            Orientation::Dhw => "dhw",
            Orientation::Dwh => "dwh",
            Orientation::Wdh => "wdh",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code().as_bytes();
        write!(
            f,
            "({},{},{})",
            code[0] as char, code[1] as char, code[2] as char
        )
    }
}

/// Checks whether two placed boxes overlap.
///
/// The boxes are projected onto the three axis planes (width/height,
/// height/depth, width/depth). They collide only when every projection
/// overlaps. Boxes that merely share a face do not collide.
///
/// # Examples
/// ```
/// use cubepack::geometry::intersects;
/// use cubepack::types::{BoundingBox, Vec3};
///
/// let a = BoundingBox::from_position_and_extent(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
/// let touching = BoundingBox::from_position_and_extent(Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
/// assert!(!intersects(&a, &touching));
/// ```
pub fn intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
    rect_intersects(a, b, Axis::Width, Axis::Height)
        && rect_intersects(a, b, Axis::Height, Axis::Depth)
        && rect_intersects(a, b, Axis::Width, Axis::Depth)
}

/// Center/half-extent rectangle test in the plane spanned by `u` and `v`.
fn rect_intersects(a: &BoundingBox, b: &BoundingBox, u: Axis, v: Axis) -> bool {
    let center_a = a.center();
    let center_b = b.center();

    let du = (center_a.component(u) - center_b.component(u)).abs();
    let dv = (center_a.component(v) - center_b.component(v)).abs();

    du < (a.extent.component(u) + b.extent.component(u)) / 2.0
        && dv < (a.extent.component(v) + b.extent.component(v)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(x: f64, y: f64, z: f64, size: f64) -> BoundingBox {
        BoundingBox::from_position_and_extent(Vec3::new(x, y, z), Vec3::new(size, size, size))
    }

    #[test]
    fn orientation_extents_follow_enumeration() {
        let dims = Vec3::new(1.0, 2.0, 3.0);
        let extents: Vec<Vec3> = Orientation::ALL.iter().map(|o| o.extent(dims)).collect();
        assert_eq!(
            extents,
            vec![
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(2.0, 1.0, 3.0),
                Vec3::new(2.0, 3.0, 1.0),
                Vec3::new(3.0, 2.0, 1.0),
                Vec3::new(3.0, 1.0, 2.0),
                Vec3::new(1.0, 3.0, 2.0),
            ]
        );
    }

    #[test]
    fn orientation_preserves_volume() {
        let dims = Vec3::new(3.0, 5.0, 7.0);
        for orientation in Orientation::ALL {
            assert_eq!(orientation.extent(dims).volume(), dims.volume());
        }
    }

    #[test]
    fn fixed_orientation_only_offers_original() {
        assert_eq!(Orientation::candidates(false), &[Orientation::Whd]);
        assert_eq!(Orientation::candidates(true).len(), 6);
    }

    #[test]
    fn orientation_display() {
        assert_eq!(Orientation::Whd.to_string(), "(w,h,d)");
        assert_eq!(Orientation::Hdw.to_string(), "(h,d,w)");
        assert_eq!(Orientation::Wdh.code(), "wdh");
    }

    #[test]
    fn overlapping_boxes_intersect() {
        assert!(intersects(&cube(0.0, 0.0, 0.0, 10.0), &cube(5.0, 5.0, 5.0, 10.0)));
        assert!(intersects(&cube(0.0, 0.0, 0.0, 10.0), &cube(0.0, 0.0, 0.0, 10.0)));
    }

    #[test]
    fn nested_box_intersects() {
        let outer = cube(0.0, 0.0, 0.0, 10.0);
        let inner = cube(2.0, 2.0, 2.0, 1.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn touching_faces_do_not_intersect() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        assert!(!intersects(&a, &cube(10.0, 0.0, 0.0, 10.0)));
        assert!(!intersects(&a, &cube(0.0, 10.0, 0.0, 10.0)));
        assert!(!intersects(&a, &cube(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn separated_on_one_axis_does_not_intersect() {
        let a = cube(0.0, 0.0, 0.0, 10.0);
        // Overlaps on width and height, separated on depth.
        let b = cube(5.0, 5.0, 20.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn thin_slab_inside_footprint_intersects() {
        let base = BoundingBox::from_position_and_extent(
            Vec3::zero(),
            Vec3::new(250.0, 250.0, 2.0),
        );
        let slab = BoundingBox::from_position_and_extent(
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(250.0, 250.0, 2.0),
        );
        assert!(intersects(&base, &slab));
    }
}
