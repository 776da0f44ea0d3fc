use std::collections::BTreeMap;

use geocache_core::{Cell, CellWindow, GenerationConfig};
use geocache_system_generator::Generator;

fn survey_window() -> CellWindow {
    CellWindow::new(Cell::new(-50, -50), Cell::new(50, 50))
}

fn survey(generator: &Generator, cells: impl Iterator<Item = Cell>) -> BTreeMap<Cell, Option<u32>> {
    cells.map(|cell| (cell, generator.generate(cell))).collect()
}

#[test]
fn repeated_queries_agree_regardless_of_order() {
    let generator = Generator::default();
    let forward = survey(&generator, survey_window().cells());

    let mut reversed_cells: Vec<Cell> = survey_window().cells().collect();
    reversed_cells.reverse();
    let backward = survey(&generator, reversed_cells.into_iter());

    assert_eq!(forward, backward, "generation depends on query order");
}

#[test]
fn independent_generators_agree() {
    let first = Generator::new(&GenerationConfig::default());
    let second = Generator::new(&GenerationConfig::default());

    for cell in survey_window().cells() {
        assert_eq!(first.spawn_decision(cell), second.spawn_decision(cell));
        assert_eq!(first.initial_value(cell), second.initial_value(cell));
    }
}

#[test]
fn spawn_frequency_tracks_probability() {
    let generator = Generator::default();
    let window = survey_window();
    let spawned = window
        .cells()
        .filter(|cell| generator.spawn_decision(*cell))
        .count();
    let frequency = spawned as f64 / window.len() as f64;

    assert!(
        (0.07..0.13).contains(&frequency),
        "spawn frequency {frequency} strays from 0.1"
    );
}

#[test]
fn initial_values_cover_power_of_two_denominations() {
    let generator = Generator::default();
    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for cell in survey_window().cells() {
        *histogram.entry(generator.initial_value(cell)).or_default() += 1;
    }

    assert_eq!(
        histogram.keys().copied().collect::<Vec<_>>(),
        vec![1, 2, 4, 8],
        "unexpected denominations: {histogram:?}"
    );
    for (value, count) in &histogram {
        assert!(
            *count > 2_000,
            "denomination {value} drawn only {count} times"
        );
    }
}
