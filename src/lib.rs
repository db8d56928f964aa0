//! Greedy 3D bin packing.
//!
//! Items are sorted by volume, the largest pending item opens the smallest
//! bin that holds it, and the rest are placed at corner anchors of the items
//! already in the bin. When a bin overflows, its contents move to the next
//! larger bin if everything still fits there.

pub mod api;
pub mod cli;
pub mod config;
pub mod geometry;
pub mod model;
pub mod optimizer;
pub mod types;
