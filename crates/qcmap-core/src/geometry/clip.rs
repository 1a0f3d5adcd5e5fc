//! Unit-disk clipping of boundary vertices.

use crate::core::types::{CplxVector, Scalar};

/// Radially projects out-of-disk boundary vertices onto the unit circle.
///
/// Vertices with magnitude at most 1 are left untouched; vertices outside
/// the disk are scaled back onto the circle along the ray from the origin.
/// Only the listed boundary indices are considered.
pub fn clip_to_unit_disk<T: Scalar>(boundary: &[usize], mapping: &mut CplxVector<T>) {
    for &v in boundary {
        let r = mapping[v].norm();
        if r > T::one() {
            mapping[v] = mapping[v].unscale(r);
        }
    }
}
