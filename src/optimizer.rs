//! Packing logic: distributes items over bins.
//!
//! The heuristic is greedy and deterministic:
//! - bins are tried from the smallest volume to the largest
//! - items are taken from the largest volume to the smallest
//! - a bin is filled with as many pending items as possible before the next
//!   pending item opens another bin
//! - when a bin overflows, its contents move to the next larger bin

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::Orientation;
use crate::model::{Bin, Item, PackedBin, ValidationError};
use crate::types::{Dimensional, Vec3, Weighted};

/// Configuration for the packing algorithm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Whether items may be rotated into any of the six axis-aligned orientations
    pub allow_item_rotation: bool,
    /// Whether a bin's `max_weight` limits the items placed in it
    pub enforce_weight_limit: bool,
}

impl PackingConfig {
    pub const DEFAULT_ALLOW_ITEM_ROTATION: bool = true;
    pub const DEFAULT_ENFORCE_WEIGHT_LIMIT: bool = true;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            allow_item_rotation: Self::DEFAULT_ALLOW_ITEM_ROTATION,
            enforce_weight_limit: Self::DEFAULT_ENFORCE_WEIGHT_LIMIT,
        }
    }
}

/// Builder for PackingConfig.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    /// Allows or forbids item rotation.
    pub fn allow_item_rotation(mut self, allow: bool) -> Self {
        self.config.allow_item_rotation = allow;
        self
    }

    /// Turns the per-bin weight limit on or off.
    pub fn enforce_weight_limit(mut self, enforce: bool) -> Self {
        self.config.enforce_weight_limit = enforce;
        self
    }

    /// Creates the final configuration.
    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Structural misconfiguration detected before any placement is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    #[error("Bin '{name}' is invalid: {source}")]
    InvalidBin {
        name: String,
        #[source]
        source: ValidationError,
    },
    #[error("Item '{name}' is invalid: {source}")]
    InvalidItem {
        name: String,
        #[source]
        source: ValidationError,
    },
}

/// Reasons why an item could not be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfitReason {
    NoBinsConfigured,
    TooHeavyForAnyBin,
    DimensionsExceedEveryBin,
    NoPlacementFound,
}

impl UnfitReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnfitReason::NoBinsConfigured => "no_bins_configured",
            UnfitReason::TooHeavyForAnyBin => "too_heavy_for_any_bin",
            UnfitReason::DimensionsExceedEveryBin => "dimensions_exceed_every_bin",
            UnfitReason::NoPlacementFound => "no_placement_found",
        }
    }
}

impl std::fmt::Display for UnfitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnfitReason::NoBinsConfigured => write!(f, "No bins were configured"),
            UnfitReason::TooHeavyForAnyBin => {
                write!(f, "Item exceeds the maximum weight of every bin")
            }
            UnfitReason::DimensionsExceedEveryBin => {
                write!(f, "Item does not fit into any bin in any orientation")
            }
            UnfitReason::NoPlacementFound => {
                write!(f, "No free position left for the item in any bin")
            }
        }
    }
}

/// Item that could not be placed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnfitItem {
    pub index: usize,
    pub item: Item,
    pub reason: UnfitReason,
}

/// Result of a packing run.
///
/// `bins` holds every candidate bin in ascending-volume order, empty ones included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackingResult {
    pub bins: Vec<PackedBin>,
    pub unfit: Vec<UnfitItem>,
}

impl PackingResult {
    /// Indicates whether all items were packed.
    pub fn is_complete(&self) -> bool {
        self.unfit.is_empty()
    }

    /// Bins that received at least one item.
    pub fn used_bins(&self) -> impl Iterator<Item = &PackedBin> {
        self.bins.iter().filter(|b| !b.is_empty())
    }

    /// Number of placed items across all bins.
    pub fn packed_count(&self) -> usize {
        self.bins.iter().map(|b| b.items.len()).sum()
    }

    pub fn unfit_count(&self) -> usize {
        self.unfit.len()
    }

    /// Average utilization of the used bins.
    pub fn average_utilization(&self) -> f64 {
        let (count, sum) = self
            .used_bins()
            .fold((0usize, 0.0), |(n, s), b| (n + 1, s + b.utilization_percent()));
        if count == 0 {
            return 0.0;
        }
        sum / count as f64
    }

    /// Total weight of all packed items.
    pub fn total_packed_weight(&self) -> f64 {
        self.bins.iter().map(|b| b.total_weight()).sum()
    }
}

/// Events emitted while packing, in the order decisions are made.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PackEvent {
    /// The largest pending item opened a bin.
    BinOpened { bin: String, item: String },
    /// An item was committed to a bin.
    ItemPlaced {
        bin: String,
        item: String,
        orientation: Orientation,
        position: Vec3,
    },
    /// A bin overflowed and its contents moved into a larger bin.
    BinEscalated {
        from: String,
        to: String,
        moved: usize,
    },
    /// An item could not be placed anywhere.
    ItemUnfit { item: String, reason: UnfitReason },
    /// Packing finished.
    Finished { used_bins: usize, unfit: usize },
}

/// Orchestrates a packing run over a set of candidate bins.
///
/// `pack` works on run-local copies: the packer can be packed again and will
/// produce the same result.
///
/// # Examples
/// ```
/// use cubepack::model::{Bin, Item};
/// use cubepack::optimizer::Packer;
///
/// let mut packer = Packer::new();
/// packer.add_bin(Bin::new("Small Bin", 10.0, 15.0, 20.0, 100.0).unwrap());
/// packer.add_item(Item::new("Item 1", 2.0, 2.0, 1.0, 2.0).unwrap());
/// packer.add_item(Item::new("Item 2", 3.0, 3.0, 2.0, 3.0).unwrap());
///
/// let result = packer.pack().unwrap();
/// assert!(result.is_complete());
/// assert_eq!(result.bins[0].items()[0].item.name, "Item 2");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Packer {
    bins: Vec<Bin>,
    items: Vec<Item>,
    config: PackingConfig,
}

impl Packer {
    /// Creates an empty packer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty packer with a custom configuration.
    pub fn with_config(config: PackingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn add_bin(&mut self, bin: Bin) {
        self.bins.push(bin);
    }

    pub fn add_bins(&mut self, bins: impl IntoIterator<Item = Bin>) {
        self.bins.extend(bins);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = Item>) {
        self.items.extend(items);
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    /// Packs all items into the candidate bins.
    pub fn pack(&self) -> Result<PackingResult, PackError> {
        self.pack_with_progress(|_| {})
    }

    /// Packs all items and reports every decision to `on_event`.
    pub fn pack_with_progress(
        &self,
        on_event: impl FnMut(&PackEvent),
    ) -> Result<PackingResult, PackError> {
        self.validate()?;

        let mut run = PackRun::new(&self.bins, &self.items, &self.config, on_event);
        run.pack();
        Ok(run.finish())
    }

    fn validate(&self) -> Result<(), PackError> {
        for bin in &self.bins {
            bin.validate().map_err(|source| PackError::InvalidBin {
                name: bin.name.clone(),
                source,
            })?;
        }
        for item in &self.items {
            item.validate().map_err(|source| PackError::InvalidItem {
                name: item.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Outcome of `pack_to_bin` for one batch.
#[derive(Debug, Default)]
struct BatchOutcome {
    head_placed: bool,
    unplaced: Vec<usize>,
}

/// State of a single packing run.
struct PackRun<'a, F> {
    /// Bins in ascending volume order.
    bins: Vec<PackedBin>,
    items: &'a [Item],
    config: &'a PackingConfig,
    unfit: Vec<UnfitItem>,
    on_event: F,
}

impl<'a, F: FnMut(&PackEvent)> PackRun<'a, F> {
    fn new(bins: &[Bin], items: &'a [Item], config: &'a PackingConfig, on_event: F) -> Self {
        let mut sorted: Vec<Bin> = bins.to_vec();
        // Stable: equal volumes keep their input order.
        sorted.sort_by(|a, b| a.volume().partial_cmp(&b.volume()).unwrap_or(Ordering::Equal));

        Self {
            bins: sorted.into_iter().map(PackedBin::new).collect(),
            items,
            config,
            unfit: Vec::new(),
            on_event,
        }
    }

    /// Item indices, largest volume first.
    fn pending_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| {
            self.items[b]
                .volume()
                .partial_cmp(&self.items[a].volume())
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    fn pack(&mut self) {
        let mut pending = self.pending_order();

        while let Some(&head) = pending.first() {
            let Some(bin) = self.find_fitted_bin(head) else {
                self.mark_unfit(head);
                pending.remove(0);
                continue;
            };

            (self.on_event)(&PackEvent::BinOpened {
                bin: self.bins[bin].bin.name.clone(),
                item: self.items[head].name.clone(),
            });

            let outcome = self.pack_to_bin(bin, &pending);
            pending = outcome.unplaced;
            if !outcome.head_placed {
                self.mark_unfit(head);
                pending.retain(|&index| index != head);
            }
        }
    }

    /// First bin, smallest volume first, that takes the item at its origin.
    ///
    /// This only probes; nothing is committed.
    fn find_fitted_bin(&self, index: usize) -> Option<usize> {
        let item = &self.items[index];
        self.bins
            .iter()
            .position(|b| b.probe(item, Vec3::zero(), self.config).is_some())
    }

    /// Smallest bin with a volume strictly larger than `bin`'s.
    fn larger_bin(&self, bin: usize) -> Option<usize> {
        let volume = self.bins[bin].bin.volume();
        self.bins
            .iter()
            .position(|b| b.bin.volume() > volume)
    }

    /// Places as many of `batch` as possible, starting in bin `start`.
    ///
    /// The head must be placed for anything else to be tried; the remaining
    /// items follow the bin the head ended up in, escalating when needed.
    fn pack_to_bin(&mut self, start: usize, batch: &[usize]) -> BatchOutcome {
        let Some((&head, rest)) = batch.split_first() else {
            return BatchOutcome::default();
        };

        let mut target = start;
        loop {
            if self.place_in(target, head) {
                break;
            }
            match self.larger_bin(target) {
                Some(next) => target = next,
                None => {
                    debug!(item = %self.items[head].name, "head item fits no bin in the chain");
                    return BatchOutcome {
                        head_placed: false,
                        unplaced: batch.to_vec(),
                    };
                }
            }
        }

        let mut unplaced = Vec::new();
        for &index in rest {
            if self.place_in(target, index) {
                continue;
            }
            match self.escalate(target, index) {
                Some(next) => target = next,
                None => unplaced.push(index),
            }
        }

        BatchOutcome {
            head_placed: true,
            unplaced,
        }
    }

    /// Moves the contents of `bin` plus `index` into the first larger bin that takes all of them.
    ///
    /// Walks the chain of strictly larger bins; each step is tried on a copy
    /// and only committed when every item found a place.
    fn escalate(&mut self, bin: usize, index: usize) -> Option<usize> {
        let mut work: Vec<usize> = self.bins[bin].items.iter().map(|p| p.index).collect();
        work.push(index);

        let mut candidate = self.larger_bin(bin);
        while let Some(next) = candidate {
            let mut trial = self.bins[next].clone();
            let fits = work
                .iter()
                .all(|&i| trial.place(i, &self.items[i], self.config).is_some());

            if fits {
                let moved = self.bins[bin].take_items().len();
                debug!(
                    from = %self.bins[bin].bin.name,
                    to = %trial.bin.name,
                    moved,
                    item = %self.items[index].name,
                    "escalated to larger bin"
                );
                (self.on_event)(&PackEvent::BinEscalated {
                    from: self.bins[bin].bin.name.clone(),
                    to: trial.bin.name.clone(),
                    moved,
                });
                let placed_from = self.bins[next].items.len();
                self.bins[next] = trial;
                for placed in &self.bins[next].items[placed_from..] {
                    (self.on_event)(&PackEvent::ItemPlaced {
                        bin: self.bins[next].bin.name.clone(),
                        item: placed.item.name.clone(),
                        orientation: placed.orientation(),
                        position: placed.position(),
                    });
                }
                return Some(next);
            }

            candidate = self.larger_bin(next);
        }

        debug!(item = %self.items[index].name, "no larger bin takes the overflow");
        None
    }

    /// Places one item in `bin` at the first working anchor.
    fn place_in(&mut self, bin: usize, index: usize) -> bool {
        let item = &self.items[index];
        match self.bins[bin].place(index, item, self.config) {
            Some(placement) => {
                debug!(
                    bin = %self.bins[bin].bin.name,
                    item = %item.name,
                    orientation = %placement.orientation,
                    position = %placement.position,
                    "placed item"
                );
                (self.on_event)(&PackEvent::ItemPlaced {
                    bin: self.bins[bin].bin.name.clone(),
                    item: item.name.clone(),
                    orientation: placement.orientation,
                    position: placement.position,
                });
                true
            }
            None => false,
        }
    }

    fn mark_unfit(&mut self, index: usize) {
        let item = &self.items[index];
        let reason = self.unfit_reason(item);
        debug!(item = %item.name, reason = reason.code(), "item does not fit");
        (self.on_event)(&PackEvent::ItemUnfit {
            item: item.name.clone(),
            reason,
        });
        self.unfit.push(UnfitItem {
            index,
            item: item.clone(),
            reason,
        });
    }

    fn unfit_reason(&self, item: &Item) -> UnfitReason {
        if self.bins.is_empty() {
            return UnfitReason::NoBinsConfigured;
        }

        if self.config.enforce_weight_limit
            && self
                .bins
                .iter()
                .all(|b| item.weight() > b.bin.max_weight)
        {
            return UnfitReason::TooHeavyForAnyBin;
        }

        if !self
            .bins
            .iter()
            .any(|b| b.bin.fits_alone(item, self.config))
        {
            return UnfitReason::DimensionsExceedEveryBin;
        }

        UnfitReason::NoPlacementFound
    }

    fn finish(mut self) -> PackingResult {
        let used_bins = self.bins.iter().filter(|b| !b.is_empty()).count();
        info!(
            bins = self.bins.len(),
            used_bins,
            items = self.items.len(),
            unfit = self.unfit.len(),
            "packing finished"
        );
        (self.on_event)(&PackEvent::Finished {
            used_bins,
            unfit: self.unfit.len(),
        });
        PackingResult {
            bins: self.bins,
            unfit: self.unfit,
        }
    }
}
