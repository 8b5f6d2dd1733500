//! Demand-driven request evaluation for the Quill incremental core.
//!
//! Compiler work is expressed as [`Request`] values. The [`Evaluator`]
//! memoizes their results, reports cycles instead of recursing forever, and
//! lets requests that are dependency sources or sinks record which names each
//! file depends on. Request types are only evaluable once a [`RequestZone`]
//! registering them is installed in the evaluator's [`RequestRegistry`].

#![warn(missing_docs)]

pub mod error;
pub mod evaluator;
pub mod registry;
pub mod request;
pub mod requests;

pub use error::RequestError;
pub use evaluator::{Evaluator, RequestStatistics};
pub use registry::{RegisteredRequest, RequestRegistry, RequestZone, Zone};
pub use request::{ActiveSource, CacheKind, DependencySink, DependencySource, Request};
pub use requests::builtin_registry;
