use glam::Vec3;
use growth_core::{
    FixedSampler, GrowthConfig, RayonExecutor, RngSampler, SequentialExecutor, Simulation,
    Triangle, UniformSampler, divider,
    mesh::CellMesh,
    spatial_index::SpatialIndex,
    types::{icosahedron, tetrahedron},
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn assert_healthy(sim: &Simulation) {
    let mesh = sim.mesh();
    mesh.check_invariants().unwrap();
    for i in 0..mesh.len() {
        let n = mesh.normal(i);
        assert!((n.length() - 1.0).abs() < 1e-4, "normal of {i} is {n:?}");
    }
    assert_eq!(sim.index().len(), mesh.len());
}

#[test]
fn planar_step_moves_every_vertex_to_its_neighbor_centroid() {
    init_tracing();
    let cfg = GrowthConfig {
        spring_factor: 0.0,
        planar_factor: 1.0,
        bulge_factor: 0.0,
        repulsion_factor: 0.0,
        ..GrowthConfig::default()
    };
    let mut sim = Simulation::new(&icosahedron(1.0), cfg).unwrap();
    assert_eq!(sim.cell_count(), 12);

    let before = sim.mesh().clone();
    let report = sim
        .step(&RayonExecutor::new(3).unwrap(), &mut FixedSampler::new(0.0))
        .unwrap();
    assert!(report.new_cells.is_empty());

    for i in 0..before.len() {
        let links = before.links(i);
        assert_eq!(links.len(), 5);
        let centroid = links.iter().map(|&j| before.position(j)).sum::<Vec3>() / 5.0;
        let moved = sim.mesh().position(i);
        assert!(moved.distance(centroid) < 1e-5, "cell {i}: {moved:?} vs {centroid:?}");
    }
    assert_healthy(&sim);
}

#[test]
fn fixed_food_grows_the_cell_count_every_step() {
    init_tracing();
    let cfg = GrowthConfig {
        split_threshold: 1.0,
        max_step_distance: Some(0.5),
        ..GrowthConfig::default()
    };
    let mut sim = Simulation::new(&icosahedron(1.0), cfg).unwrap();
    let exec = RayonExecutor::new(4).unwrap();
    let mut sampler = FixedSampler::new(2.0);

    let mut previous = sim.cell_count();
    for _ in 0..5 {
        let report = sim.step(&exec, &mut sampler).unwrap();
        assert_eq!(report.cells_before, previous);
        assert!(report.cells_after > previous);
        previous = report.cells_after;
        assert_healthy(&sim);
    }
    assert_eq!(sim.cell_count(), 12 * 32);
}

#[test]
fn worker_count_does_not_change_the_outcome() {
    let cfg = GrowthConfig {
        split_threshold: 3.0,
        ..GrowthConfig::default()
    };
    let mut single = Simulation::new(&icosahedron(1.0), cfg).unwrap();
    let mut pooled = Simulation::new(&icosahedron(1.0), cfg).unwrap();
    let mut a = RngSampler::new(StdRng::seed_from_u64(99));
    let mut b = RngSampler::new(StdRng::seed_from_u64(99));
    let one = SequentialExecutor::new(1);
    let many = RayonExecutor::new(6).unwrap();

    for _ in 0..15 {
        single.step(&one, &mut a).unwrap();
        pooled.step(&many, &mut b).unwrap();
    }

    assert_eq!(single.cell_count(), pooled.cell_count());
    assert_eq!(single.mesh().positions(), pooled.mesh().positions());
    assert_eq!(single.mesh().normals(), pooled.mesh().normals());
    assert_eq!(single.vertex_attributes(), pooled.vertex_attributes());
}

#[test]
fn long_random_run_stays_finite() {
    init_tracing();
    let cfg = GrowthConfig {
        split_threshold: 4.0,
        max_step_distance: Some(0.25),
        ..GrowthConfig::for_edge_length(1.0)
    };
    let mut sim = Simulation::new(&icosahedron(1.0), cfg).unwrap();
    let exec = RayonExecutor::new(0).unwrap();
    let mut sampler = RngSampler::new(StdRng::seed_from_u64(2024));

    let final_count = sim.run(40, &exec, &mut sampler).unwrap();

    assert!(final_count > 12);
    assert_eq!(sim.steps(), 40);
    assert!(sim.mesh().positions().iter().all(|p| p.is_finite()));
    assert_healthy(&sim);

    let attrs = sim.vertex_attributes();
    assert!(attrs.iter().all(|v| v.is_finite()));
    assert!(!sim.triangulate().is_empty());
}

fn indexed(triangles: &[Triangle]) -> (CellMesh, SpatialIndex) {
    let mesh = CellMesh::from_triangles(triangles).unwrap();
    let mut index = SpatialIndex::new(2.0);
    for (i, &p) in mesh.positions().iter().enumerate() {
        index.add(p, i).unwrap();
    }
    (mesh, index)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn splits_conserve_links(
        seed in any::<u64>(),
        splits in 1usize..60,
        from_tetrahedron in any::<bool>(),
    ) {
        let seed_shape = if from_tetrahedron { tetrahedron(1.0) } else { icosahedron(1.0) };
        let (mut mesh, mut index) = indexed(&seed_shape);
        let mut sampler = RngSampler::new(StdRng::seed_from_u64(seed));

        for _ in 0..splits {
            let parent = sampler.below(mesh.len());
            let before = mesh.links(parent).to_vec();

            let child = divider::split(&mut mesh, &mut index, parent, &mut sampler).unwrap();

            prop_assert_ne!(parent, child);
            prop_assert!(mesh.are_linked(parent, child));
            prop_assert!(mesh.are_linked(child, parent));
            prop_assert_eq!(mesh.food()[parent], 0.0);
            prop_assert_eq!(mesh.food()[child], 0.0);
            prop_assert_eq!(
                mesh.links(parent).len() + mesh.links(child).len(),
                before.len() + 4
            );

            let mut shared = 0;
            for &j in &before {
                let to_parent = mesh.are_linked(j, parent);
                let to_child = mesh.are_linked(j, child);
                prop_assert!(to_parent || to_child);
                if to_parent && to_child {
                    shared += 1;
                }
            }
            prop_assert_eq!(shared, 2);
        }

        prop_assert!(mesh.check_invariants().is_ok());
        prop_assert_eq!(index.len(), mesh.len());
        for i in 0..mesh.len() {
            let ring = mesh.ordered_links(i);
            for k in 0..ring.len() {
                prop_assert!(
                    mesh.are_linked(ring[k], ring[(k + 1) % ring.len()]),
                    "ring of {} is open: {:?}", i, ring
                );
            }
        }
    }
}
