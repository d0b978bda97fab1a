mod common;

use common::seg;
use fleet_router::config::{GoalMode, ResolutionConfig};
use fleet_router::{OccupancyGrid, PointResolver, Position2D, ResolveError, SegmentGraph};

/// Two parallel 4 m segments, 2 m apart.
fn parallel_lanes() -> SegmentGraph {
    SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (4.0, 0.0), 1.0, &[], &[]),
        seg(1, (0.0, 2.0), (4.0, 2.0), 1.0, &[], &[]),
    ])
    .unwrap()
}

/// 5 m x 4 m map at 0.1 m starting at (-0.5, -0.5).
fn open_map() -> OccupancyGrid {
    OccupancyGrid::free(50, 40, 0.1, Position2D::new(-0.5, -0.5)).unwrap()
}

fn occupy_rows(map: &mut OccupancyGrid, rows: std::ops::RangeInclusive<usize>) {
    for y in rows {
        for x in 0..map.width() {
            map.set_occupied((x, y));
        }
    }
}

#[test]
fn direct_mode_picks_the_closest_segment() {
    let graph = parallel_lanes();
    let map = open_map();
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());

    let found = resolver
        .resolve(&Position2D::new(1.5, 0.4), 0.3, GoalMode::UseSegmentGoal)
        .unwrap();
    assert_eq!(found.segment, 0);
    assert!((found.point.x - 1.5).abs() < 1e-9);
    assert!(found.point.y.abs() < 1e-9);
}

#[test]
fn direct_mode_rejects_far_poses() {
    let graph = parallel_lanes();
    let map = open_map();
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());

    let err = resolver
        .resolve(&Position2D::new(2.0, 3.4), 0.3, GoalMode::UseSegmentGoal)
        .unwrap_err();
    assert!(matches!(err, ResolveError::NoSegmentInReach { .. }));
}

#[test]
fn voronoi_mode_does_not_cross_walls() {
    let graph = parallel_lanes();
    let mut map = open_map();
    // Wall at y = 0.55 over the whole map width.
    occupy_rows(&mut map, 10..=10);
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());
    let pose = Position2D::new(2.0, 0.9);

    let direct = resolver.resolve(&pose, 0.3, GoalMode::UseSegmentGoal).unwrap();
    assert_eq!(direct.segment, 0);

    let voronoi = resolver.resolve(&pose, 0.3, GoalMode::UseVoronoiGoal).unwrap();
    assert_eq!(voronoi.segment, 1);
}

#[test]
fn map_mode_moves_away_from_obstacles_first() {
    let graph = SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (4.0, 0.0), 1.0, &[], &[]),
        seg(1, (0.0, 1.0), (4.0, 1.0), 1.0, &[], &[]),
    ])
    .unwrap();
    let mut map = open_map();
    // Everything up to y = 0.1 is blocked.
    occupy_rows(&mut map, 0..=5);
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());
    let pose = Position2D::new(2.0, 0.3);

    let direct = resolver.resolve(&pose, 0.45, GoalMode::UseSegmentGoal).unwrap();
    assert_eq!(direct.segment, 0);

    let mapped = resolver.resolve(&pose, 0.45, GoalMode::UseMapGoal).unwrap();
    assert_eq!(mapped.segment, 1);
}

#[test]
fn poses_outside_the_map_fail_in_wavefront_modes() {
    let graph = parallel_lanes();
    let map = open_map();
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());
    let pose = Position2D::new(40.0, 40.0);

    for mode in [GoalMode::UseVoronoiGoal, GoalMode::UseMapGoal] {
        let err = resolver.resolve(&pose, 0.3, mode).unwrap_err();
        assert!(matches!(err, ResolveError::OutsideMap { .. }));
    }
}

#[test]
fn wavefront_is_bounded() {
    let graph = parallel_lanes();
    let map = open_map();
    let config = ResolutionConfig {
        max_expansion_distance: 0.3,
        ..ResolutionConfig::default()
    };
    let mut resolver = PointResolver::new(&graph, &map, &config);

    let err = resolver
        .resolve(&Position2D::new(2.0, 1.0), 0.3, GoalMode::UseVoronoiGoal)
        .unwrap_err();
    assert_eq!(err, ResolveError::NoReachableCell { max_distance: 0.3 });
}

#[test]
fn wavefront_potential_is_kept_per_resolution() {
    let graph = parallel_lanes();
    let mut map = open_map();
    occupy_rows(&mut map, 10..=10);
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());
    let pose = Position2D::new(2.0, 0.9);

    resolver.resolve(&pose, 0.3, GoalMode::UseSegmentGoal).unwrap();
    assert!(resolver.potential().is_empty());

    resolver.resolve(&pose, 0.3, GoalMode::UseVoronoiGoal).unwrap();
    let potential = resolver.potential();
    assert_eq!(potential.len(), 50 * 40);
    let (x, y) = map.world_to_cell(&pose).unwrap();
    assert_eq!(potential[y * map.width() + x], 0.0);
    // Nothing below the wall was reached.
    assert!(potential[..map.width() * 10].iter().all(|p| p.is_infinite()));

    resolver.resolve(&pose, 0.3, GoalMode::UseSegmentGoal).unwrap();
    assert_eq!(resolver.into_potential().len(), 50 * 40);
}

#[test]
fn narrow_leaf_walks_to_a_wide_neighbor() {
    let graph = SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (1.0, 0.0), 0.2, &[], &[1]),
        seg(1, (1.0, 0.0), (3.0, 0.0), 1.0, &[0], &[]),
    ])
    .unwrap();
    let map = open_map();
    let mut resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());

    let found = resolver
        .resolve(&Position2D::new(0.3, 0.1), 0.3, GoalMode::UseSegmentGoal)
        .unwrap();
    assert_eq!(found.segment, 1);
    assert!((found.point.x - 1.0).abs() < 1e-9);
}

#[test]
fn leaf_walk_fails_without_any_wide_segment() {
    let graph = SegmentGraph::new(vec![
        seg(0, (0.0, 0.0), (1.0, 0.0), 0.2, &[], &[1]),
        seg(1, (1.0, 0.0), (3.0, 0.0), 0.2, &[0], &[]),
    ])
    .unwrap();
    let map = open_map();
    let resolver = PointResolver::new(&graph, &map, &ResolutionConfig::default());

    let err = resolver.resolve_leaf(0, &Position2D::new(0.3, 0.0), 0.3).unwrap_err();
    assert_eq!(err, ResolveError::NoWideEnoughSegment { segment: 0 });
}
