//! JSON request and response schema.
//!
//! A request lists candidate bins and items; the response reports every bin
//! with its placed items plus the items that did not fit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Bin, Item, PackedBin, PlacedItem, ValidationError};
use crate::optimizer::{Packer, PackingConfig, PackingResult, UnfitItem};

/// Candidate bin as it appears in a request.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct BinRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Width, height, depth
    pub dims: (f64, f64, f64),
    pub max_weight: f64,
}

impl BinRequest {
    fn into_bin(self, position: usize) -> Result<Bin, ValidationError> {
        let name = self.name.unwrap_or_else(|| format!("Bin {}", position + 1));
        let (w, h, d) = self.dims;
        Bin::new(name, w, h, d, self.max_weight)
    }
}

fn default_quantity() -> usize {
    1
}

/// Item as it appears in a request.
///
/// `quantity` expands into that many identical items and must be at least 1.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Width, height, depth
    pub dims: (f64, f64, f64),
    pub weight: f64,
    #[serde(default = "default_quantity")]
    pub quantity: usize,
}

impl ItemRequest {
    fn into_items(self, position: usize) -> Result<Vec<Item>, ValidationError> {
        let base = self.name.unwrap_or_else(|| format!("Item {}", position + 1));
        let (w, h, d) = self.dims;
        if self.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(format!(
                "quantity of '{}' must be at least 1",
                base
            )));
        }
        if self.quantity == 1 {
            return Ok(vec![Item::new(base, w, h, d, self.weight)?]);
        }
        (1..=self.quantity)
            .map(|n| Item::new(format!("{} #{}", base, n), w, h, d, self.weight))
            .collect()
    }
}

/// Top-level request.
///
/// `allow_rotations` overrides the configured rotation setting when present.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PackRequest {
    pub bins: Vec<BinRequest>,
    pub items: Vec<ItemRequest>,
    #[serde(default)]
    pub allow_rotations: Option<bool>,
}

/// Request field that failed validation.
#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("bin #{position} is invalid: {source}")]
    InvalidBin {
        position: usize,
        #[source]
        source: ValidationError,
    },
    #[error("item #{position} is invalid: {source}")]
    InvalidItem {
        position: usize,
        #[source]
        source: ValidationError,
    },
}

impl PackRequest {
    /// Validates the request and builds a ready-to-run packer.
    ///
    /// # Parameters
    /// * `base` - Configuration to start from, e.g. loaded from the environment
    pub fn into_packer(self, base: PackingConfig) -> Result<Packer, RequestValidationError> {
        let config = match self.allow_rotations {
            Some(allow) => PackingConfig {
                allow_item_rotation: allow,
                ..base
            },
            None => base,
        };

        let bins = self
            .bins
            .into_iter()
            .enumerate()
            .map(|(position, spec)| {
                spec.into_bin(position)
                    .map_err(|source| RequestValidationError::InvalidBin {
                        position: position + 1,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut items = Vec::new();
        for (position, spec) in self.items.into_iter().enumerate() {
            let expanded =
                spec.into_items(position)
                    .map_err(|source| RequestValidationError::InvalidItem {
                        position: position + 1,
                        source,
                    })?;
            items.extend(expanded);
        }

        let mut packer = Packer::with_config(config);
        packer.add_bins(bins);
        packer.add_items(items);
        Ok(packer)
    }
}

/// A placed item in the response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacedItemResponse {
    pub name: String,
    pub dims: (f64, f64, f64),
    pub weight: f64,
    /// Orientation code such as `"whd"` or `"hdw"`
    pub orientation: String,
    pub position: (f64, f64, f64),
    pub extent: (f64, f64, f64),
}

impl From<&PlacedItem> for PlacedItemResponse {
    fn from(placed: &PlacedItem) -> Self {
        Self {
            name: placed.item.name.clone(),
            dims: (placed.item.width, placed.item.height, placed.item.depth),
            weight: placed.item.weight,
            orientation: placed.orientation().code().to_string(),
            position: placed.position().into(),
            extent: placed.extent().into(),
        }
    }
}

/// A bin and its items in the response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PackedBinResponse {
    pub name: String,
    pub dims: (f64, f64, f64),
    pub max_weight: f64,
    pub total_weight: f64,
    pub utilization_percent: f64,
    pub items: Vec<PlacedItemResponse>,
}

impl From<&PackedBin> for PackedBinResponse {
    fn from(packed: &PackedBin) -> Self {
        let bin = packed.bin();
        Self {
            name: bin.name.clone(),
            dims: (bin.width, bin.height, bin.depth),
            max_weight: bin.max_weight,
            total_weight: packed.total_weight(),
            utilization_percent: packed.utilization_percent(),
            items: packed.items().iter().map(PlacedItemResponse::from).collect(),
        }
    }
}

/// An item that did not fit, with the reason.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UnfitItemResponse {
    pub name: String,
    pub dims: (f64, f64, f64),
    pub weight: f64,
    pub reason_code: String,
    pub reason_text: String,
}

impl From<&UnfitItem> for UnfitItemResponse {
    fn from(unfit: &UnfitItem) -> Self {
        let reason = unfit.reason;
        Self {
            name: unfit.item.name.clone(),
            dims: (unfit.item.width, unfit.item.height, unfit.item.depth),
            weight: unfit.item.weight,
            reason_code: reason.code().to_string(),
            reason_text: reason.to_string(),
        }
    }
}

/// Aggregated figures of a run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PackSummary {
    pub used_bins: usize,
    pub packed_items: usize,
    pub unfit_items: usize,
    pub total_packed_weight: f64,
    pub average_utilization_percent: f64,
}

/// Response with all bins, unfit items and a summary.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PackResponse {
    pub bins: Vec<PackedBinResponse>,
    pub unfit: Vec<UnfitItemResponse>,
    pub is_complete: bool,
    pub summary: PackSummary,
}

impl PackResponse {
    pub fn from_packing_result(result: &PackingResult) -> Self {
        Self {
            bins: result.bins.iter().map(PackedBinResponse::from).collect(),
            unfit: result.unfit.iter().map(UnfitItemResponse::from).collect(),
            is_complete: result.is_complete(),
            summary: PackSummary {
                used_bins: result.used_bins().count(),
                packed_items: result.packed_count(),
                unfit_items: result.unfit_count(),
                total_packed_weight: result.total_packed_weight(),
                average_utilization_percent: result.average_utilization(),
            },
        }
    }
}
