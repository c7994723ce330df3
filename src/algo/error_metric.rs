//! Reconstruction error against the ground-truth snapshot.

use crate::mesh::TriangleMesh;

/// Summed per-vertex Euclidean distances to the ground truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    /// `Σ ‖noisy_initial[i] − ground_truth[i]‖`.
    pub noisy: f64,
    /// `Σ ‖positions[i] − ground_truth[i]‖` over the finite terms.
    pub filtered: f64,
    /// Number of filtered terms skipped because they were NaN.
    pub skipped: usize,
}

/// Compare the noisy snapshot and the current positions with the ground truth.
///
/// Returns `None` if either snapshot is missing, or if the vertex count
/// changed since the snapshots were taken (e.g. the mesh was subdivided in
/// between). A NaN filtered term is skipped and counted in
/// [`ErrorReport::skipped`]; noisy terms are always summed.
///
/// ```
/// use mesh_denoise::algo::error_metric::compute_error;
/// use mesh_denoise::mesh::TriangleMesh;
///
/// // No snapshots yet
/// assert!(compute_error(&TriangleMesh::plane(1.0)).is_none());
/// ```
pub fn compute_error(mesh: &TriangleMesh) -> Option<ErrorReport> {
    let truth = mesh.ground_truth()?;
    let noisy = mesh.noisy_initial()?;
    let current = mesh.positions();

    if truth.len() != current.len() || noisy.len() != current.len() {
        log::warn!(
            "snapshot size mismatch (truth {}, noisy {}, current {}); skipping error",
            truth.len(),
            noisy.len(),
            current.len()
        );
        return None;
    }

    let mut report = ErrorReport {
        noisy: 0.0,
        filtered: 0.0,
        skipped: 0,
    };

    for ((t, n), p) in truth.iter().zip(noisy).zip(current) {
        report.noisy += (n - t).norm();

        let d = (p - t).norm();
        if d.is_nan() {
            log::debug!("skipping NaN vertex {p:?}");
            report.skipped += 1;
        } else {
            report.filtered += d;
        }
    }

    log::info!("error before filtering: {}", report.noisy);
    log::info!("error after filtering: {}", report.filtered);

    Some(report)
}
