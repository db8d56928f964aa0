//! Data models for the bin packing engine.
//!
//! This module defines the fundamental data structures:
//! - `Item`: an object to be packed, described by dimensions and weight
//! - `Placement`: where and how an item was placed, produced only on success
//! - `PlacedItem`: an item together with its placement inside a bin
//! - `Bin`: a rectangular container with a weight capacity
//! - `PackedBin`: a bin and the items placed in it so far

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Orientation, intersects};
use crate::optimizer::PackingConfig;
use crate::types::{Axis, BoundingBox, Dimensional, Vec3, Weighted};

/// Validation error for bin and item data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(
            "name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_dims(dims: Vec3, owner: &str) -> Result<(), ValidationError> {
    validate_dimension(dims.x, &format!("{} width", owner))?;
    validate_dimension(dims.y, &format!("{} height", owner))?;
    validate_dimension(dims.z, &format!("{} depth", owner))?;
    Ok(())
}

/// Represents a cuboid item to be packed.
///
/// The item itself never changes during packing; the outcome is reported
/// separately as a [`Placement`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub weight: f64,
}

impl Item {
    /// Creates a new item with validation.
    ///
    /// Dimensions must be positive and finite, the weight finite and not negative.
    ///
    /// # Examples
    /// ```
    /// use cubepack::model::Item;
    ///
    /// assert!(Item::new("Item 1", 10.0, 20.0, 30.0, 5.0).is_ok());
    /// assert!(Item::new("Item 1", -10.0, 20.0, 30.0, 5.0).is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        width: f64,
        height: f64,
        depth: f64,
        weight: f64,
    ) -> Result<Self, ValidationError> {
        let item = Self {
            name: name.into(),
            width,
            height,
            depth,
            weight,
        };
        item.validate()?;
        Ok(item)
    }

    /// Re-checks the invariants enforced by [`Item::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_dims(self.dimensions(), "Item")?;
        if self.weight < 0.0 || !self.weight.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Item weight must be finite and not negative, got: {}",
                self.weight
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Dimensional for Item {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

impl Weighted for Item {
    fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}x{}x{}, weight: {})",
            self.name, self.width, self.height, self.depth, self.weight
        )
    }
}

/// Outcome of a successful placement: orientation plus anchor (minimum corner).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub orientation: Orientation,
    pub position: Vec3,
}

impl Placement {
    /// Extent of `item` under this placement's orientation.
    #[inline]
    pub fn extent(&self, item: &Item) -> Vec3 {
        self.orientation.extent(item.dimensions())
    }

    /// Bounding box of `item` under this placement.
    #[inline]
    pub fn bounds(&self, item: &Item) -> BoundingBox {
        BoundingBox::from_position_and_extent(self.position, self.extent(item))
    }
}

/// An item placed inside a bin.
///
/// # Fields
/// * `index` - Position of the item in the packer's input order
/// * `item` - The item specification
/// * `placement` - Orientation and anchor inside the bin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub index: usize,
    pub item: Item,
    pub placement: Placement,
}

impl PlacedItem {
    /// Extent under the committed orientation.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.placement.extent(&self.item)
    }

    /// Anchor position (minimum corner).
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.placement.position
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.placement.orientation
    }

    /// Bounding box used for collision detection.
    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        self.placement.bounds(&self.item)
    }

    /// Anchor directly behind this item along `axis`.
    #[inline]
    pub fn corner_anchor(&self, axis: Axis) -> Vec3 {
        self.position()
            .offset_along(axis, self.extent().component(axis))
    }
}

impl fmt::Display for PlacedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pos({}) rt({})",
            self.item,
            self.position(),
            self.orientation()
        )
    }
}

/// Represents a rectangular bin with a weight capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub max_weight: f64,
}

impl Bin {
    /// Creates a new bin with validation.
    ///
    /// # Parameters
    /// * `name` - Display name
    /// * `width`, `height`, `depth` - Inner dimensions, positive
    /// * `max_weight` - Maximum total weight of placed items, positive
    ///
    /// # Returns
    /// `Ok(Bin)` for valid values, otherwise `Err(ValidationError)`
    pub fn new(
        name: impl Into<String>,
        width: f64,
        height: f64,
        depth: f64,
        max_weight: f64,
    ) -> Result<Self, ValidationError> {
        let bin = Self {
            name: name.into(),
            width,
            height,
            depth,
            max_weight,
        };
        bin.validate()?;
        Ok(bin)
    }

    /// Re-checks the invariants enforced by [`Bin::new`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_dims(self.dimensions(), "Bin")?;
        if self.max_weight <= 0.0 || !self.max_weight.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Bin max weight must be positive, got: {}",
                self.max_weight
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks whether `item` fits into the empty bin in at least one allowed orientation.
    pub fn fits_alone(&self, item: &Item, config: &PackingConfig) -> bool {
        let dims = self.dimensions();
        Orientation::candidates(config.allow_item_rotation)
            .iter()
            .any(|o| o.extent(item.dimensions()).fits_within(&dims))
    }
}

impl Dimensional for Bin {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}x{}x{}, max_weight: {})",
            self.name, self.width, self.height, self.depth, self.max_weight
        )
    }
}

/// A bin together with the items placed in it, in placement order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackedBin {
    pub bin: Bin,
    pub items: Vec<PlacedItem>,
}

impl PackedBin {
    /// Starts an empty bin.
    pub fn new(bin: Bin) -> Self {
        Self {
            bin,
            items: Vec::new(),
        }
    }

    pub fn bin(&self) -> &Bin {
        &self.bin
    }

    /// Placed items in placement order.
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the weights of all placed items.
    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|p| p.item.weight()).sum()
    }

    /// Sum of the volumes of all placed items.
    pub fn used_volume(&self) -> f64 {
        self.items.iter().map(|p| p.item.volume()).sum()
    }

    /// Volume usage in percent (0.0 to 100.0).
    pub fn utilization_percent(&self) -> f64 {
        let total = self.bin.volume();
        if total <= 0.0 {
            return 0.0;
        }
        (self.used_volume() / total) * 100.0
    }

    /// Looks for a placement of `item` at `anchor` without committing it.
    ///
    /// Orientations are tried in enumeration order. An orientation is rejected
    /// when the item would stick out of the bin or collide with a placed item.
    /// With the weight limit enforced, nothing is accepted that would push the
    /// bin over its `max_weight`.
    pub fn probe(&self, item: &Item, anchor: Vec3, config: &PackingConfig) -> Option<Placement> {
        if config.enforce_weight_limit
            && self.total_weight() + item.weight() > self.bin.max_weight
        {
            return None;
        }

        let bin_dims = self.bin.dimensions();
        Orientation::candidates(config.allow_item_rotation)
            .iter()
            .map(|&orientation| Placement {
                orientation,
                position: anchor,
            })
            .find(|placement| {
                let bounds = placement.bounds(item);
                bounds.max().fits_within(&bin_dims)
                    && !self.items.iter().any(|p| intersects(&p.bounds(), &bounds))
            })
    }

    /// Places `item` at `anchor` if possible and appends it to the bin.
    ///
    /// Returns the committed placement. A failed attempt changes nothing.
    pub fn put_item(
        &mut self,
        index: usize,
        item: &Item,
        anchor: Vec3,
        config: &PackingConfig,
    ) -> Option<Placement> {
        let placement = self.probe(item, anchor, config)?;
        self.items.push(PlacedItem {
            index,
            item: item.clone(),
            placement,
        });
        Some(placement)
    }

    /// Candidate anchors for the next item.
    ///
    /// The origin for an empty bin. Otherwise, for each axis in turn, the
    /// corner of every placed item (in placement order) advanced by its extent
    /// along that axis.
    pub fn anchors(&self) -> Vec<Vec3> {
        if self.items.is_empty() {
            return vec![Vec3::zero()];
        }
        Axis::ALL
            .iter()
            .flat_map(|&axis| self.items.iter().map(move |p| p.corner_anchor(axis)))
            .collect()
    }

    /// Places `item` at the first anchor that accepts it.
    pub fn place(&mut self, index: usize, item: &Item, config: &PackingConfig) -> Option<Placement> {
        self.anchors()
            .into_iter()
            .find_map(|anchor| self.put_item(index, item, anchor, config))
    }

    /// Removes all placed items and returns them in placement order.
    pub fn take_items(&mut self) -> Vec<PlacedItem> {
        std::mem::take(&mut self.items)
    }
}

impl fmt::Display for PackedBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.bin)?;
        write!(f, " packed items:")?;
        for placed in &self.items {
            write!(f, "\n   {}", placed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PackingConfig {
        PackingConfig::default()
    }

    fn item(name: &str, w: f64, h: f64, d: f64, weight: f64) -> Item {
        Item::new(name, w, h, d, weight).unwrap()
    }

    #[test]
    fn item_validation() {
        assert!(Item::new("ok", 1.0, 2.0, 3.0, 0.0).is_ok());
        assert!(matches!(
            Item::new("bad", 0.0, 2.0, 3.0, 1.0),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            Item::new("bad", 1.0, f64::NAN, 3.0, 1.0),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            Item::new("bad", 1.0, 2.0, 3.0, -1.0),
            Err(ValidationError::InvalidWeight(_))
        ));
        assert!(matches!(
            Item::new("  ", 1.0, 2.0, 3.0, 1.0),
            Err(ValidationError::InvalidName(_))
        ));
    }

    #[test]
    fn bin_validation() {
        assert!(Bin::new("box", 10.0, 10.0, 10.0, 100.0).is_ok());
        assert!(matches!(
            Bin::new("box", 10.0, -1.0, 10.0, 100.0),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            Bin::new("box", 10.0, 10.0, 10.0, 0.0),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn validation_error_display() {
        let err = Bin::new("box", 0.0, 1.0, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dimension: Bin width must be positive, got: 0"
        );
    }

    #[test]
    fn volume_ignores_orientation() {
        let it = item("Item", 2.0, 3.0, 4.0, 1.0);
        assert_eq!(it.volume(), 24.0);
        let bin = Bin::new("Bin", 10.0, 10.0, 10.0, 1.0).unwrap();
        assert_eq!(bin.volume(), 1000.0);
    }

    #[test]
    fn display_formats() {
        let bin = Bin::new("Small Bin", 10.0, 15.0, 20.0, 100.0).unwrap();
        assert_eq!(bin.to_string(), "Small Bin(10x15x20, max_weight: 100)");

        let placed = PlacedItem {
            index: 0,
            item: item("Item 2", 3.0, 3.0, 2.0, 3.0),
            placement: Placement {
                orientation: Orientation::Whd,
                position: Vec3::new(3.0, 0.0, 0.0),
            },
        };
        assert_eq!(
            placed.to_string(),
            "Item 2(3x3x2, weight: 3) pos(3,0,0) rt((w,h,d))"
        );
    }

    #[test]
    fn put_item_uses_first_fitting_orientation() {
        let mut packed = PackedBin::new(Bin::new("Bin", 100.0, 100.0, 300.0, 1500.0).unwrap());
        let it = item("Item 1", 150.0, 50.0, 50.0, 20.0);

        let placement = packed.put_item(0, &it, Vec3::zero(), &config()).unwrap();
        assert_eq!(placement.orientation, Orientation::Hdw);
        assert_eq!(placement.extent(&it), Vec3::new(50.0, 50.0, 150.0));
        assert_eq!(packed.items().len(), 1);
    }

    #[test]
    fn put_item_tries_next_orientation_on_collision() {
        let mut packed = PackedBin::new(Bin::new("Bin", 20.0, 20.0, 10.0, 100.0).unwrap());
        let cfg = config();
        packed
            .put_item(0, &item("Block", 10.0, 10.0, 10.0, 1.0), Vec3::new(10.0, 0.0, 0.0), &cfg)
            .unwrap();

        // (w,h,d) reaches into the block, (h,w,d) stays left of it.
        let bar = item("Bar", 15.0, 5.0, 10.0, 1.0);
        let placement = packed.put_item(1, &bar, Vec3::zero(), &cfg).unwrap();
        assert_eq!(placement.orientation, Orientation::Hwd);
        assert_eq!(placement.extent(&bar), Vec3::new(5.0, 15.0, 10.0));
    }

    #[test]
    fn failed_put_item_leaves_bin_untouched() {
        let mut packed = PackedBin::new(Bin::new("Bin", 10.0, 10.0, 10.0, 100.0).unwrap());
        let cfg = config();
        packed
            .put_item(0, &item("A", 10.0, 10.0, 5.0, 1.0), Vec3::zero(), &cfg)
            .unwrap();
        let before = packed.clone();

        assert!(
            packed
                .put_item(1, &item("B", 10.0, 10.0, 6.0, 1.0), Vec3::new(0.0, 0.0, 5.0), &cfg)
                .is_none()
        );
        assert_eq!(packed, before);
    }

    #[test]
    fn weight_limit_rejects_overweight_item() {
        let mut packed = PackedBin::new(Bin::new("Bin", 10.0, 10.0, 10.0, 10.0).unwrap());
        let cfg = config();
        packed
            .put_item(0, &item("A", 5.0, 5.0, 5.0, 8.0), Vec3::zero(), &cfg)
            .unwrap();

        let heavy = item("B", 5.0, 5.0, 5.0, 3.0);
        assert!(
            packed
                .put_item(1, &heavy, Vec3::new(5.0, 0.0, 0.0), &cfg)
                .is_none()
        );

        let relaxed = PackingConfig::builder().enforce_weight_limit(false).build();
        assert!(
            packed
                .put_item(1, &heavy, Vec3::new(5.0, 0.0, 0.0), &relaxed)
                .is_some()
        );
    }

    #[test]
    fn item_slightly_larger_than_bin_is_rejected() {
        let bin = Bin::new("Bin", 10.0, 10.0, 10.0, 100.0).unwrap();
        let packed = PackedBin::new(bin.clone());
        let cfg = config();
        let oversized = item("A", 10.0000005, 10.0, 10.0, 1.0);

        assert!(packed.probe(&oversized, Vec3::zero(), &cfg).is_none());
        assert!(!bin.fits_alone(&oversized, &cfg));

        let exact = item("B", 10.0, 10.0, 10.0, 1.0);
        assert!(packed.probe(&exact, Vec3::zero(), &cfg).is_some());
    }

    #[test]
    fn weight_limit_is_exact() {
        let mut packed = PackedBin::new(Bin::new("Bin", 10.0, 10.0, 10.0, 10.0).unwrap());
        let cfg = config();
        packed
            .put_item(0, &item("A", 5.0, 5.0, 5.0, 6.0), Vec3::zero(), &cfg)
            .unwrap();

        let over = item("B", 5.0, 5.0, 5.0, 4.0000005);
        assert!(packed.probe(&over, Vec3::new(5.0, 0.0, 0.0), &cfg).is_none());

        let exact = item("C", 5.0, 5.0, 5.0, 4.0);
        assert!(packed.probe(&exact, Vec3::new(5.0, 0.0, 0.0), &cfg).is_some());
    }

    #[test]
    fn disabled_rotation_keeps_original_orientation() {
        let packed = PackedBin::new(Bin::new("Bin", 100.0, 100.0, 300.0, 1500.0).unwrap());
        let cfg = PackingConfig::builder().allow_item_rotation(false).build();
        let it = item("Item 1", 150.0, 50.0, 50.0, 20.0);
        assert!(packed.probe(&it, Vec3::zero(), &cfg).is_none());
        assert!(!packed.bin().fits_alone(&it, &cfg));
        assert!(packed.bin().fits_alone(&it, &config()));
    }

    #[test]
    fn anchors_go_axis_then_items() {
        let mut packed = PackedBin::new(Bin::new("Bin", 100.0, 100.0, 100.0, 100.0).unwrap());
        assert_eq!(packed.anchors(), vec![Vec3::zero()]);

        let cfg = config();
        packed.place(0, &item("A", 10.0, 20.0, 30.0, 1.0), &cfg).unwrap();
        packed.place(1, &item("B", 5.0, 5.0, 5.0, 1.0), &cfg).unwrap();

        assert_eq!(packed.items()[1].position(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(
            packed.anchors(),
            vec![
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(15.0, 0.0, 0.0),
                Vec3::new(0.0, 20.0, 0.0),
                Vec3::new(10.0, 5.0, 0.0),
                Vec3::new(0.0, 0.0, 30.0),
                Vec3::new(10.0, 0.0, 5.0),
            ]
        );
    }

    #[test]
    fn utilization_and_weight() {
        let mut packed = PackedBin::new(Bin::new("Bin", 10.0, 10.0, 10.0, 100.0).unwrap());
        let cfg = config();
        packed.place(0, &item("A", 10.0, 10.0, 5.0, 4.0), &cfg).unwrap();
        assert_eq!(packed.total_weight(), 4.0);
        assert_eq!(packed.used_volume(), 500.0);
        assert!((packed.utilization_percent() - 50.0).abs() < 1e-9);

        let taken = packed.take_items();
        assert_eq!(taken.len(), 1);
        assert!(packed.is_empty());
    }
}
