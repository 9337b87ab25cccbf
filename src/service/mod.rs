//! Request handlers for the two roles.
//!
//! # Data Flow
//! ```text
//! Backend:  /compreflex?comando=... → engine (blocking pool) → JSON
//! Facade:   /cliente                → static page
//!           /consulta?comando=...   → proxy::Forwarder → backend → JSON
//! ```
//!
//! # Design Decisions
//! - Routing is an exact path match; the method is not checked
//! - Engine failures are 200 responses with an error body
//! - Only missing input (400), unknown paths (404) and proxy faults (500)
//!   change the status code

pub mod backend;
pub mod facade;

pub use backend::BackendService;
pub use facade::FacadeService;
