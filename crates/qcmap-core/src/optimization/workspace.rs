//! Pre-allocated per-call buffers for the line search.
//!
//! Every trial rebuilds the complex coefficient field and, when needed, the
//! 3D lift and the auxiliary growth factor field. Allocating those inside the
//! retry loop would dominate small-mesh searches, so the buffers live in a
//! workspace the caller can reuse across outer iterations.

use crate::core::types::{CplxVector, DVector, Embedding, Scalar};

/// Scratch buffers for one line search call, reusable across calls.
#[derive(Debug, Clone)]
pub struct LineSearchWorkspace<T: Scalar> {
    pub(crate) coefficient: CplxVector<T>,
    pub(crate) embedding: Embedding<T>,
    pub(crate) gamma: DVector<T>,
}

impl<T: Scalar> LineSearchWorkspace<T> {
    /// Creates a workspace sized for a mesh with `num_vertices` vertices.
    pub fn with_size(num_vertices: usize) -> Self {
        Self {
            coefficient: CplxVector::zeros(num_vertices),
            embedding: Embedding::zeros(num_vertices),
            gamma: DVector::zeros(num_vertices),
        }
    }

    /// Resizes the buffers if the vertex count changed.
    pub fn resize(&mut self, num_vertices: usize) {
        if self.coefficient.len() != num_vertices {
            self.coefficient = CplxVector::zeros(num_vertices);
            self.embedding = Embedding::zeros(num_vertices);
            self.gamma = DVector::zeros(num_vertices);
        }
    }

    /// The vertex count the buffers are sized for.
    pub fn num_vertices(&self) -> usize {
        self.coefficient.len()
    }

    /// The coefficient field of the most recent trial.
    pub fn coefficient(&self) -> &CplxVector<T> {
        &self.coefficient
    }

    /// The 3D embedding written by the most recent energy evaluation (or
    /// self-intersection lift).
    pub fn embedding(&self) -> &Embedding<T> {
        &self.embedding
    }

    /// The auxiliary growth factor field written by the most recent energy
    /// evaluation.
    pub fn gamma(&self) -> &DVector<T> {
        &self.gamma
    }
}
