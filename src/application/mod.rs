// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case calls into the data,
// ml and infra layers in order and does no maths itself.

// Load + descriptive charts
pub mod explore_use_case;

// Load + encode + train + evaluate
pub mod train_use_case;
