//! Common types and traits for 3D geometry.
//!
//! Axes follow the bin's own naming: `x` runs along the width, `y` along the
//! height and `z` along the depth.

use std::fmt;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// One of the three physical axes of a bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Width,
    Height,
    Depth,
}

impl Axis {
    /// All axes in the order anchors are generated.
    pub const ALL: [Axis; 3] = [Axis::Width, Axis::Height, Axis::Depth];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Width => write!(f, "width"),
            Axis::Height => write!(f, "height"),
            Axis::Depth => write!(f, "depth"),
        }
    }
}

/// Represents a 3D vector or point in space.
///
/// Used for anchor positions (minimum corner) and extents.
///
/// # Examples
/// ```
/// use cubepack::types::Vec3;
///
/// let position = Vec3::new(1.0, 2.0, 3.0);
/// let extent = Vec3::new(10.0, 20.0, 30.0);
/// let center = position + extent * 0.5;
/// assert_eq!(center, Vec3::new(6.0, 12.0, 18.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector.
    ///
    /// # Parameters
    /// * `x` - X component (width)
    /// * `y` - Y component (height)
    /// * `z` - Z component (depth)
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (origin).
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Converts to tuple format for serialization.
    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Returns the component along `axis`.
    #[inline]
    pub const fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.x,
            Axis::Height => self.y,
            Axis::Depth => self.z,
        }
    }

    /// Returns a copy moved by `amount` along `axis`.
    #[inline]
    pub fn offset_along(&self, axis: Axis, amount: f64) -> Self {
        let mut moved = *self;
        match axis {
            Axis::Width => moved.x += amount,
            Axis::Height => moved.y += amount,
            Axis::Depth => moved.z += amount,
        }
        moved
    }

    /// Calculates the volume (product of all components).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Checks if the vector fits within another vector (component-wise <=).
    ///
    /// The comparison is exact: a component larger than the container's by
    /// any amount does not fit.
    #[inline]
    pub fn fits_within(&self, container: &Self) -> bool {
        self.x <= container.x && self.y <= container.y && self.z <= container.z
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl From<Vec3> for (f64, f64, f64) {
    #[inline]
    fn from(vec: Vec3) -> Self {
        vec.as_tuple()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Trait for objects with 3D dimensions.
pub trait Dimensional {
    /// Returns the unrotated dimensions (width, height, depth).
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume. Independent of orientation.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

/// Trait for objects with weight.
pub trait Weighted {
    /// Returns the weight.
    fn weight(&self) -> f64;
}

/// Represents an Axis-Aligned Bounding Box (AABB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (anchor position)
    pub min: Vec3,
    /// Extent along each axis
    pub extent: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from position and extent.
    #[inline]
    pub const fn from_position_and_extent(position: Vec3, extent: Vec3) -> Self {
        Self {
            min: position,
            extent,
        }
    }

    /// Maximum corner (position + extent).
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.min + self.extent
    }

    /// Returns the center point.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.min + self.extent * 0.5
    }
}
