use approx::assert_relative_eq;
use cubepack::geometry::intersects;
use cubepack::model::{Bin, Item};
use cubepack::optimizer::{Packer, PackingConfig, PackingResult};
use proptest::prelude::*;

fn dims(max: u32) -> impl Strategy<Value = (f64, f64, f64)> {
    (1..=max, 1..=max, 1..=max).prop_map(|(w, h, d)| (w as f64, h as f64, d as f64))
}

fn bins_strategy() -> impl Strategy<Value = Vec<Bin>> {
    prop::collection::vec((dims(20), 10u32..=200), 1..4).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, ((w, h, d), max_weight))| {
                Bin::new(format!("Bin {}", i + 1), w, h, d, max_weight as f64).unwrap()
            })
            .collect()
    })
}

fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec((dims(12), 0u32..=40), 0..16).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, ((w, h, d), weight))| {
                Item::new(format!("Item {}", i + 1), w, h, d, weight as f64).unwrap()
            })
            .collect()
    })
}

fn run(bins: &[Bin], items: &[Item], config: PackingConfig) -> PackingResult {
    let mut packer = Packer::with_config(config);
    packer.add_bins(bins.iter().cloned());
    packer.add_items(items.iter().cloned());
    packer.pack().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placed_items_never_overlap(bins in bins_strategy(), items in items_strategy()) {
        let result = run(&bins, &items, PackingConfig::default());
        for packed in &result.bins {
            let placed = packed.items();
            for (i, a) in placed.iter().enumerate() {
                for b in &placed[i + 1..] {
                    prop_assert!(
                        !intersects(&a.bounds(), &b.bounds()),
                        "{} overlaps {} in {}", a.item.name, b.item.name, packed.bin().name
                    );
                }
            }
        }
    }

    #[test]
    fn placed_items_stay_inside_their_bin(bins in bins_strategy(), items in items_strategy()) {
        let result = run(&bins, &items, PackingConfig::default());
        for packed in &result.bins {
            let bin = packed.bin();
            for placed in packed.items() {
                let max = placed.bounds().max();
                let min = placed.position();
                prop_assert!(min.x >= 0.0 && min.y >= 0.0 && min.z >= 0.0);
                prop_assert!(max.x <= bin.width && max.y <= bin.height && max.z <= bin.depth);
            }
        }
    }

    #[test]
    fn every_item_is_packed_or_unfit_exactly_once(
        bins in bins_strategy(),
        items in items_strategy(),
    ) {
        let result = run(&bins, &items, PackingConfig::default());
        let mut seen: Vec<usize> = result
            .bins
            .iter()
            .flat_map(|b| b.items().iter().map(|p| p.index))
            .chain(result.unfit.iter().map(|u| u.index))
            .collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
    }

    #[test]
    fn packing_is_deterministic(bins in bins_strategy(), items in items_strategy()) {
        let first = run(&bins, &items, PackingConfig::default());
        let second = run(&bins, &items, PackingConfig::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn weight_limit_holds_when_enforced(bins in bins_strategy(), items in items_strategy()) {
        let result = run(&bins, &items, PackingConfig::default());
        for packed in &result.bins {
            prop_assert!(packed.total_weight() <= packed.bin().max_weight);
        }
    }

    #[test]
    fn disabled_rotation_keeps_original_orientation(
        bins in bins_strategy(),
        items in items_strategy(),
    ) {
        let config = PackingConfig::builder().allow_item_rotation(false).build();
        let result = run(&bins, &items, config);
        for placed in result.bins.iter().flat_map(|b| b.items()) {
            let extent = placed.extent();
            prop_assert_eq!(
                (extent.x, extent.y, extent.z),
                (placed.item.width, placed.item.height, placed.item.depth)
            );
        }
    }
}

#[test]
fn summary_figures_match_bin_contents() {
    let bins = vec![Bin::new("Box", 10.0, 10.0, 10.0, 100.0).unwrap()];
    let items = vec![
        Item::new("Half", 10.0, 10.0, 5.0, 7.5).unwrap(),
        Item::new("Quarter", 5.0, 10.0, 5.0, 2.5).unwrap(),
    ];
    let result = run(&bins, &items, PackingConfig::default());

    assert!(result.is_complete());
    assert_relative_eq!(result.total_packed_weight(), 10.0);
    assert_relative_eq!(result.bins[0].utilization_percent(), 75.0, epsilon = 1e-9);
    assert_relative_eq!(result.average_utilization(), 75.0, epsilon = 1e-9);
}
