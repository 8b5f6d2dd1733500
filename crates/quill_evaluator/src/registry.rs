//! Request zones and the dispatch registry composed from them.
//!
//! Each zone is a table of the request types one area of the compiler
//! defines. The evaluator dispatches through the composed
//! [`RequestRegistry`], so a request type that no zone registered cannot be
//! evaluated.

use crate::error::RequestError;
use crate::evaluator::Evaluator;
use crate::request::{CacheKind, Request};
use quill_common::{InternalError, QuillResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// An area of the compiler that defines requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    /// Declaration identity.
    Ast,
    /// Name lookup.
    NameLookup,
    /// Driver-facing requests.
    FrontendTool,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Ast => f.write_str("AST"),
            Zone::NameLookup => f.write_str("NameLookup"),
            Zone::FrontendTool => f.write_str("FrontendTool"),
        }
    }
}

/// Type-erased entry point: downcasts the request and boxes the output.
pub(crate) type EvaluateFn = fn(&dyn Any, &mut Evaluator) -> Result<Box<dyn Any>, RequestError>;

fn evaluate_erased<R: Request>(request: &dyn Any, ev: &mut Evaluator) -> Result<Box<dyn Any>, RequestError> {
    let request = request
        .downcast_ref::<R>()
        .ok_or_else(|| InternalError::new(format!("dispatch to {} with a foreign request", R::NAME)))?;
    let output = request.evaluate(ev)?;
    Ok(Box::new(output))
}

/// One registered request type.
#[derive(Clone, Copy)]
pub struct RegisteredRequest {
    /// The request's name.
    pub name: &'static str,
    /// The zone that registered it.
    pub zone: Zone,
    /// Its caching policy.
    pub caching: CacheKind,
    pub(crate) evaluate_fn: EvaluateFn,
}

impl fmt::Debug for RegisteredRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRequest")
            .field("name", &self.name)
            .field("zone", &self.zone)
            .field("caching", &self.caching)
            .finish()
    }
}

/// The request types of one zone.
#[derive(Debug)]
pub struct RequestZone {
    zone: Zone,
    entries: Vec<(TypeId, RegisteredRequest)>,
}

impl RequestZone {
    /// Creates an empty table for `zone`.
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            entries: Vec::new(),
        }
    }

    /// Adds `R` with its declared caching policy.
    pub fn register<R: Request>(mut self) -> Self {
        self.entries.push((
            TypeId::of::<R>(),
            RegisteredRequest {
                name: R::NAME,
                zone: self.zone,
                caching: R::CACHING,
                evaluate_fn: evaluate_erased::<R>,
            },
        ));
        self
    }

    /// Number of registered requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All zones, composed into one dispatch table.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    zones: Vec<Zone>,
    entries: HashMap<TypeId, RegisteredRequest>,
}

impl RequestRegistry {
    /// Creates a registry with no zones.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every request of `zone`.
    ///
    /// Installing the same zone twice, or a request type another zone
    /// already registered, is an internal error and leaves the registry
    /// unchanged.
    pub fn add_zone(&mut self, zone: RequestZone) -> QuillResult<()> {
        if self.zones.contains(&zone.zone) {
            return Err(InternalError::new(format!("zone {} registered twice", zone.zone)));
        }
        for (type_id, entry) in &zone.entries {
            if let Some(existing) = self.entries.get(type_id) {
                return Err(InternalError::new(format!(
                    "request {} registered by both {} and {}",
                    entry.name, existing.zone, zone.zone
                )));
            }
        }
        self.zones.push(zone.zone);
        self.entries.extend(zone.entries);
        Ok(())
    }

    /// Builder form of [`add_zone`](Self::add_zone).
    pub fn with_zone(mut self, zone: RequestZone) -> QuillResult<Self> {
        self.add_zone(zone)?;
        Ok(self)
    }

    /// The entry for request type `R`.
    pub fn lookup<R: Request>(&self) -> Option<&RegisteredRequest> {
        self.entries.get(&TypeId::of::<R>())
    }

    /// Installed zones, in installation order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of registered request types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no request type is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Ping;

    impl Request for Ping {
        type Output = u8;
        const NAME: &'static str = "Ping";
        const CACHING: CacheKind = CacheKind::Uncached;

        fn evaluate(&self, _ev: &mut Evaluator) -> Result<u8, RequestError> {
            Ok(1)
        }
    }

    #[test]
    fn zone_records_policy() {
        let zone = RequestZone::new(Zone::FrontendTool).register::<Ping>();
        assert_eq!(zone.len(), 1);

        let registry = RequestRegistry::new().with_zone(zone).unwrap();
        let entry = registry.lookup::<Ping>().unwrap();
        assert_eq!(entry.zone, Zone::FrontendTool);
        assert_eq!(entry.caching, CacheKind::Uncached);
    }

    #[test]
    fn duplicate_zone_is_rejected() {
        let mut registry = RequestRegistry::new();
        registry.add_zone(RequestZone::new(Zone::Ast)).unwrap();
        assert!(registry.add_zone(RequestZone::new(Zone::Ast)).is_err());
    }

    #[test]
    fn request_in_two_zones_is_rejected() {
        let mut registry = RequestRegistry::new();
        registry
            .add_zone(RequestZone::new(Zone::Ast).register::<Ping>())
            .unwrap();
        let err = registry
            .add_zone(RequestZone::new(Zone::NameLookup).register::<Ping>())
            .unwrap_err();
        assert!(err.message.contains("Ping"));
        assert_eq!(registry.zones(), &[Zone::Ast]);
    }

    #[test]
    fn unregistered_lookup_is_none() {
        assert!(RequestRegistry::new().lookup::<Ping>().is_none());
    }
}
