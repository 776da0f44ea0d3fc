use geocache_core::{
    CacheAction, Cell, CellWindow, Command, Direction, Event, GameConfig, LatLng, WindowSource,
};
use geocache_world::{self as world, query, World};

fn unit_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.generation.spawn_probability = 1.0;
    config.generation.value_exponents = 1;
    config.player.fallback = LatLng::new(0.000_05, 0.000_05);
    config
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn value_at(world: &World, cell: Cell) -> Option<u32> {
    query::cache(world, cell).map(|cache| cache.value)
}

#[test]
fn repopulation_restores_generated_values() {
    let mut world = World::new(&unit_config());
    let _ = run(&mut world, Command::Initialize);
    let cell = Cell::new(0, 0);

    let _ = run(
        &mut world,
        Command::Interact {
            cell,
            action: CacheAction::Destroy,
        },
    );
    assert_eq!(value_at(&world, cell), Some(0));

    let _ = run(&mut world, Command::Initialize);
    assert_eq!(value_at(&world, cell), Some(1));
}

#[test]
fn walking_away_and_back_forgets_mutations() {
    let mut world = World::new(&unit_config());
    let _ = run(&mut world, Command::Initialize);
    let cell = Cell::new(0, 0);
    let _ = run(
        &mut world,
        Command::Interact {
            cell,
            action: CacheAction::Take,
        },
    );
    assert_eq!(value_at(&world, cell), Some(0));
    assert_eq!(query::player(&world).held, 1);

    let _ = run(
        &mut world,
        Command::Move {
            direction: Direction::East,
        },
    );
    let _ = run(
        &mut world,
        Command::Move {
            direction: Direction::West,
        },
    );

    assert_eq!(value_at(&world, cell), Some(1));
    assert_eq!(query::player(&world).held, 1, "held value survives moves");
}

#[test]
fn every_previous_cache_is_discarded_before_materializing() {
    let mut world = World::new(&unit_config());
    let _ = run(&mut world, Command::Initialize);
    let previous = query::cache_view(&world).len();
    assert_eq!(previous, 256);

    let events = run(
        &mut world,
        Command::Move {
            direction: Direction::North,
        },
    );
    let discarded = events
        .iter()
        .take_while(|event| !matches!(event, Event::CacheMaterialized { .. }))
        .filter(|event| matches!(event, Event::CacheDiscarded { .. }))
        .count();
    assert_eq!(discarded, previous);
    assert!(matches!(
        events.last(),
        Some(Event::WindowRepopulated {
            source: WindowSource::Neighborhood,
            materialized: 256,
            ..
        })
    ));
}

#[test]
fn materialization_follows_ascending_cell_order() {
    let mut world = World::new(&unit_config());
    let events = run(&mut world, Command::Initialize);
    let cells: Vec<Cell> = events
        .iter()
        .filter_map(|event| match event {
            Event::CacheMaterialized { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();

    let mut sorted = cells.clone();
    sorted.sort();
    assert_eq!(cells, sorted);
    assert_eq!(cells.first(), Some(&Cell::new(-8, -8)));
    assert_eq!(cells.last(), Some(&Cell::new(7, 7)));
}

#[test]
fn independent_worlds_materialize_identical_caches() {
    let config = GameConfig::default();
    let mut first = World::new(&config);
    let mut second = World::new(&config);
    let _ = run(&mut first, Command::Initialize);
    let _ = run(&mut second, Command::Initialize);

    let first: Vec<(Cell, u32)> = query::cache_view(&first)
        .iter()
        .map(|cache| (cache.cell, cache.value))
        .collect();
    let second: Vec<(Cell, u32)> = query::cache_view(&second)
        .iter()
        .map(|cache| (cache.cell, cache.value))
        .collect();
    assert_eq!(first, second);
    assert!(first
        .iter()
        .all(|(_, value)| matches!(value, 1 | 2 | 4 | 8)));
}

#[test]
fn clearing_the_viewport_falls_back_to_the_neighborhood() {
    let mut world = World::new(&unit_config());
    let _ = run(&mut world, Command::Initialize);
    let _ = run(
        &mut world,
        Command::SetViewport {
            span: Some(geocache_core::ViewportSpan::new(0.000_2, 0.000_4)),
        },
    );
    let events = run(&mut world, Command::SetViewport { span: None });

    assert_eq!(
        query::window(&world),
        Some(CellWindow::new(Cell::new(-8, -8), Cell::new(8, 8)))
    );
    assert!(matches!(
        events.last(),
        Some(Event::WindowRepopulated {
            source: WindowSource::Neighborhood,
            ..
        })
    ));
}
