//! Core of the volunteer and donation app: listing filters and metrics,
//! optimistic form submission, and a data source that is either the local
//! fixture store or the REST backend.

// Public modules
pub mod auth;
pub mod config;
pub mod data_source;
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;
pub mod types;
pub mod validation;

/// Initialize the library with the given configuration.
/// This function must be called before any call that reaches the data source.
/// Later calls are no-ops; the first configuration wins.
pub fn initialize(config: config::AppConfig) -> ffi::FFIResult<()> {
    globals::initialize(config)
}

/// Whether `initialize` has completed
pub fn is_initialized() -> bool {
    globals::is_initialized()
}
