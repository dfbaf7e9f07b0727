// =============================================================================
// HTTP surface
// =============================================================================

pub mod rest;
