//! Utility modules.

/// Date/time serialization helpers shared by providers.
pub mod datetime;

/// Log sanitization utilities to prevent credential and token exposure.
pub mod log_sanitizer;
