// ============================================================
// Layer 4 — Ordered Partition Splitter
// ============================================================
// Splits samples into a head partition and a tail partition.
// Row order is never changed: the boundary is computed on the
// original ordering, so the tail is always the last rows.
//
// Used twice:
//   - train / test split of the whole dataset
//   - train / validation split inside the training partition
//
// Boundary: floor((1 - holdout_fraction) * n)
//
// Reference: Rust Book §8 (Vectors)

/// Index of the first held-out row for `total` rows.
pub fn split_index(total: usize, holdout_fraction: f64) -> usize {
    let keep = (1.0 - holdout_fraction).clamp(0.0, 1.0);
    // epsilon absorbs 0.7 * 100 = 69.999... style rounding
    ((total as f64 * keep + 1e-9).floor() as usize).min(total)
}

/// Split `samples` into (head, tail) with the tail holding roughly
/// `holdout_fraction` of the rows.
pub fn split_ordered<T>(mut samples: Vec<T>, holdout_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let split_at = split_index(total, holdout_fraction);

    let tail = samples.split_off(split_at);

    tracing::debug!(
        "Ordered split: {} head, {} tail ({}% / {}%)",
        samples.len(),
        tail.len(),
        (samples.len() * 100) / total.max(1),
        (tail.len()    * 100) / total.max(1),
    );

    (samples, tail)
}
