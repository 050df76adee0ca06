// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All burn model code lives here:
//
//   model.rs     — dense 32 (relu) → dense 64 (relu) → dense 2 (softmax)
//   trainer.rs   — Adam + cross-entropy loop with validation split
//                  and per-epoch observers
//   evaluator.rs — test-set loss/accuracy and confusion matrix

/// The three-layer churn classifier
pub mod model;

/// Training loop with validation and epoch observers
pub mod trainer;

/// Held-out evaluation and confusion matrix
pub mod evaluator;
