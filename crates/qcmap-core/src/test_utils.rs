//! Shared fixtures for unit and integration tests.
//!
//! Provides a small disk-shaped fan mesh, deterministic and scripted energy
//! functionals, and a scripted self-intersection oracle so tests can steer
//! the line search through specific accept/reject sequences.

use nalgebra::Complex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

use crate::core::energy::{EnergyFlags, EnergyFunction};
use crate::core::error::Result;
use crate::core::mesh::SurfaceMesh;
use crate::core::types::{CplxVector, DVector, Embedding, Scalar};
use crate::geometry::intersection::{lift_to_embedding, SelfIntersectionOracle};
use crate::optimization::line_search::{SearchDirection, SearchState};

/// A triangle fan around a central vertex: vertex 0 at the origin, `ring`
/// vertices evenly spaced on a circle of the given radius. The ring is the
/// boundary.
pub fn fan_mesh(ring: usize, radius: f64) -> (SurfaceMesh, CplxVector<f64>) {
    assert!(ring >= 3, "a fan needs at least 3 ring vertices");
    let num_vertices = ring + 1;

    let mut faces = Vec::with_capacity(ring);
    for i in 0..ring {
        let a = 1 + i;
        let b = 1 + (i + 1) % ring;
        faces.push([0, a, b]);
    }
    let mesh = SurfaceMesh::with_detected_boundary(num_vertices, faces)
        .expect("fan mesh is always valid");

    let mut mapping = CplxVector::zeros(num_vertices);
    for i in 0..ring {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (ring as f64);
        mapping[1 + i] = Complex::from_polar(radius, theta);
    }
    (mesh, mapping)
}

/// A ready-to-search fan configuration: zero coefficient field, ring at
/// radius 0.5, a mildly inward-pulling descent direction, unit initial step,
/// and an arbitrary finite initial energy of 10.
pub fn fan_setup(
    ring: usize,
) -> (
    SurfaceMesh,
    SearchState<f64>,
    SearchDirection<f64>,
    DVector<f64>,
) {
    let (mesh, mapping) = fan_mesh(ring, 0.5);
    let num_vertices = mesh.num_vertices();

    let x = DVector::zeros(2 * num_vertices);
    let state = SearchState::new(x, mapping.clone(), 10.0, 1.0);

    let parameter_dir = DVector::from_element(2 * num_vertices, 1e-3);
    let mapping_dir = mapping.map(|z| z * Complex::new(-0.05, 0.0));
    let grad = -&parameter_dir;

    (mesh, state, SearchDirection::new(parameter_dir, mapping_dir), grad)
}

/// A random direction pair with a matching gradient so that the directional
/// derivative is strictly negative.
pub fn random_direction(
    num_vertices: usize,
    amplitude: f64,
    seed: u64,
) -> (SearchDirection<f64>, DVector<f64>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let parameter_dir =
        DVector::from_fn(2 * num_vertices, |_, _| rng.gen_range(-amplitude..amplitude));
    let mapping_dir = CplxVector::from_fn(num_vertices, |_, _| {
        Complex::new(
            rng.gen_range(-amplitude..amplitude),
            rng.gen_range(-amplitude..amplitude),
        )
    });
    let grad = -&parameter_dir;
    (SearchDirection::new(parameter_dir, mapping_dir), grad)
}

/// Deterministic toy energy: the squared magnitudes of the mapping (growth
/// term) plus the squared magnitudes of the coefficient (regularization
/// term). Writes the planar lift into the embedding buffer and the mapping
/// magnitudes into gamma.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSpringEnergy;

impl<T: Scalar> EnergyFunction<T> for DiskSpringEnergy {
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

/// Energy that replays a fixed script of values, one per evaluation,
/// repeating the last value once the script runs out.
#[derive(Debug)]
pub struct ScriptedEnergy {
    values: Vec<f64>,
    next: RefCell<usize>,
}

impl ScriptedEnergy {
    /// Creates a scripted energy from the given value sequence.
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "the script must hold at least one value");
        Self {
            values,
            next: RefCell::new(0),
        }
    }

    /// Number of evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        *self.next.borrow()
    }
}

impl EnergyFunction<f64> for ScriptedEnergy {
    fn evaluate(
        &self,
        _coefficient: &CplxVector<f64>,
        mapping: &CplxVector<f64>,
        _flags: EnergyFlags,
        embedding: &mut Embedding<f64>,
        gamma: &mut DVector<f64>,
    ) -> Result<f64> {
        lift_to_embedding(mapping, embedding);
        gamma.fill(0.0);

        let mut next = self.next.borrow_mut();
        let value = self.values[(*next).min(self.values.len() - 1)];
        *next += 1;
        Ok(value)
    }
}

/// Oracle that replays a fixed script of verdicts, one per call, reporting
/// no intersection once the script runs out.
#[derive(Debug)]
pub struct ScriptedOracle {
    verdicts: Vec<bool>,
    next: RefCell<usize>,
}

impl ScriptedOracle {
    /// Creates a scripted oracle from the given verdict sequence.
    pub fn new(verdicts: Vec<bool>) -> Self {
        Self {
            verdicts,
            next: RefCell::new(0),
        }
    }

    /// An oracle that never reports an intersection.
    pub fn never() -> Self {
        Self::new(Vec::new())
    }

    /// Number of oracle calls performed so far.
    pub fn calls(&self) -> usize {
        *self.next.borrow()
    }
}

impl<T: Scalar> SelfIntersectionOracle<T> for ScriptedOracle {
    fn has_self_intersections(&self, _vertices: &Embedding<T>, _faces: &[[usize; 3]]) -> bool {
        let mut next = self.next.borrow_mut();
        let verdict = self.verdicts.get(*next).copied().unwrap_or(false);
        *next += 1;
        verdict
    }
}
