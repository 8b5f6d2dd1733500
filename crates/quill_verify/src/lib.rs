//! Checks recorded dependencies against `expected-*` annotations.
//!
//! Test sources state the dependencies they expect to record in comments:
//!
//! ```text
//! struct Foo {}                      // expected-provides {{Foo}}
//! let x = Bar.baz                    // expected-cascading-member {{Bar.baz}}
//! ```
//!
//! [`verify_dependencies`] parses those annotations, turns each file's
//! [`ReferencedNameTracker`](quill_depgraph::ReferencedNameTracker) into
//! [`Obligation`]s, and reports every annotation without a matching
//! dependency and every dependency without an annotation. Unannotated
//! dependencies come with a fix-it that writes the missing annotation.

#![warn(missing_docs)]

pub mod error;
pub mod expectation;
pub mod fixit;
pub mod obligation;
pub mod verifier;

pub use error::VerifyError;
pub use expectation::{parse_expectations, Expectation, ExpectationKind, ExpectationScope, SELECTORS};
pub use fixit::apply_fixits;
pub use obligation::{Obligation, ObligationKey, ObligationMap, ObligationState};
pub use verifier::{verify_dependencies, DependencyVerifier, FileVerification};
