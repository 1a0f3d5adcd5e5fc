//! Benchmarks for the constrained backtracking line search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Complex;

use qcmap_core::core::energy::{EnergyFlags, EnergyFunction};
use qcmap_core::core::error::Result;
use qcmap_core::core::mesh::SurfaceMesh;
use qcmap_core::core::types::{CplxVector, DVector, Embedding, Scalar};
use qcmap_core::geometry::intersection::{lift_to_embedding, SegmentOverlapOracle};
use qcmap_core::optimization::line_search::{
    BacktrackingLineSearch, LineSearchParams, SearchDirection, SearchState, TerminationRule,
};
use qcmap_core::optimization::workspace::LineSearchWorkspace;

#[derive(Debug, Clone, Copy, Default)]
struct SpringEnergy;

impl<T: Scalar> EnergyFunction<T> for SpringEnergy {
    fn evaluate(
        &self,
        coefficient: &CplxVector<T>,
        mapping: &CplxVector<T>,
        flags: EnergyFlags,
        embedding: &mut Embedding<T>,
        gamma: &mut DVector<T>,
    ) -> Result<T> {
        lift_to_embedding(mapping, embedding);
        let mut fx = T::zero();
        for v in 0..mapping.len() {
            let r = mapping[v].norm();
            gamma[v] = r;
            if flags.growth {
                fx = fx + r * r;
            }
            if flags.coefficient {
                fx = fx + coefficient[v].norm_sqr();
            }
        }
        Ok(fx)
    }
}

fn fan_setup(ring: usize) -> (SurfaceMesh, SearchState<f64>, SearchDirection<f64>, DVector<f64>) {
    let num_vertices = ring + 1;
    let mut faces = Vec::with_capacity(ring);
    for i in 0..ring {
        faces.push([0, 1 + i, 1 + (i + 1) % ring]);
    }
    let mesh = SurfaceMesh::with_detected_boundary(num_vertices, faces).unwrap();

    let mut mapping = CplxVector::zeros(num_vertices);
    for i in 0..ring {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (ring as f64);
        mapping[1 + i] = Complex::from_polar(0.5, theta);
    }

    let parameter_dir = DVector::from_element(2 * num_vertices, 1e-3);
    let mapping_dir = mapping.map(|z| z * Complex::new(-0.05, 0.0));
    let grad = -&parameter_dir;
    let state = SearchState::new(DVector::zeros(2 * num_vertices), mapping, 10.0, 1.0);

    (mesh, state, SearchDirection::new(parameter_dir, mapping_dir), grad)
}

fn bench_line_search(c: &mut Criterion) {
    let search = BacktrackingLineSearch::new();

    let (mesh, state, direction, grad) = fan_setup(64);
    let mut workspace = LineSearchWorkspace::with_size(mesh.num_vertices());

    let params = LineSearchParams::default()
        .with_termination(TerminationRule::None)
        .with_self_intersection_checks(false);
    c.bench_function("line_search_fan64_bounds_only", |b| {
        b.iter(|| {
            let mut state = state.clone();
            search
                .search(
                    &SpringEnergy,
                    &mesh,
                    &SegmentOverlapOracle::new(),
                    &[],
                    black_box(&direction),
                    &grad,
                    EnergyFlags::all(),
                    &mut state,
                    &mut workspace,
                    &params,
                )
                .unwrap()
        })
    });

    let params = LineSearchParams::default().with_termination(TerminationRule::None);
    c.bench_function("line_search_fan64_with_oracle", |b| {
        b.iter(|| {
            let mut state = state.clone();
            search
                .search(
                    &SpringEnergy,
                    &mesh,
                    &SegmentOverlapOracle::new(),
                    &[],
                    black_box(&direction),
                    &grad,
                    EnergyFlags::all(),
                    &mut state,
                    &mut workspace,
                    &params,
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_line_search);
criterion_main!(benches);
