// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, enums and traits describing customers and the
// churn label. No burn types, no file I/O.

/// One parsed customer row plus the fixed feature selection
pub mod record;

/// Abstractions other layers implement
pub mod traits;
