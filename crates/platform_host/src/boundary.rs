//! Content-boundary registration contracts.
//!
//! Registering a native object under a boundary name hands back a [`BoundaryToken`]. The token is
//! the only way to take the registration down again, so a short-lived object (the capability
//! negotiator) can remove itself without anything else being able to do it on its behalf.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use thiserror::Error;

#[derive(Debug, PartialEq, Eq)]
/// Capability handle for one boundary registration.
///
/// Deliberately neither `Clone` nor `Copy`: deregistering consumes it.
pub struct BoundaryToken {
    name: String,
    id: u64,
}

impl BoundaryToken {
    /// Issues a token. Intended for [`BoundaryRegistry`] implementations only.
    pub fn issue(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// Boundary name the registration was made under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry-assigned registration id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Boundary registration failures.
pub enum BoundaryError {
    /// Another live registration already owns the name.
    #[error("boundary `{name}` is already registered")]
    AlreadyRegistered {
        /// Conflicting boundary name.
        name: String,
    },
    /// The token was not issued by this registry or its registration is already gone.
    #[error("boundary token for `{name}` is not a live registration")]
    UnknownToken {
        /// Name carried by the rejected token.
        name: String,
    },
    /// Host-specific registration failure.
    #[error("boundary host failure: {0}")]
    Host(String),
}

#[derive(Debug, PartialEq, Eq, Error)]
/// Failed deregistration. Hands the token back so the owner can retry.
#[error("failed to deregister boundary `{}`", .token.name())]
pub struct DeregisterError {
    token: BoundaryToken,
    #[source]
    error: BoundaryError,
}

impl DeregisterError {
    /// Wraps `error` together with the token that could not be deregistered.
    pub fn new(token: BoundaryToken, error: BoundaryError) -> Self {
        Self { token, error }
    }

    /// Underlying failure.
    pub fn error(&self) -> &BoundaryError {
        &self.error
    }

    /// Splits into the returned token and the failure.
    pub fn into_parts(self) -> (BoundaryToken, BoundaryError) {
        (self.token, self.error)
    }
}

/// Host primitive for exposing native objects to embedded content script.
pub trait BoundaryRegistry {
    /// Makes `name` callable from content and returns the owning token.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::AlreadyRegistered`] when `name` is live.
    fn register(&self, name: &str) -> Result<BoundaryToken, BoundaryError>;

    /// Removes the registration owned by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`DeregisterError`] carrying the token back, with [`BoundaryError::UnknownToken`]
    /// when `token` does not match a live registration.
    fn deregister(&self, token: BoundaryToken) -> Result<(), DeregisterError>;

    /// Returns whether content can currently reach `name`.
    fn is_registered(&self, name: &str) -> bool;
}

#[derive(Debug, Default)]
/// Name-to-registration bookkeeping shared by registry implementations.
///
/// Holds no interior mutability; registries wrap it in whatever cell their threading needs.
pub struct BoundaryLedger {
    next_id: u64,
    live: BTreeMap<String, u64>,
}

impl BoundaryLedger {
    /// Records a registration for `name` and issues its token.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::AlreadyRegistered`] when `name` is live.
    pub fn register(&mut self, name: &str) -> Result<BoundaryToken, BoundaryError> {
        if self.live.contains_key(name) {
            return Err(BoundaryError::AlreadyRegistered {
                name: name.to_string(),
            });
        }
        self.next_id += 1;
        self.live.insert(name.to_string(), self.next_id);
        Ok(BoundaryToken::issue(name, self.next_id))
    }

    /// Removes the registration owned by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`DeregisterError`] with [`BoundaryError::UnknownToken`] for forged or stale tokens.
    pub fn deregister(&mut self, token: BoundaryToken) -> Result<(), DeregisterError> {
        let owned = self
            .live
            .get(token.name())
            .is_some_and(|id| *id == token.id());
        if !owned {
            let error = BoundaryError::UnknownToken {
                name: token.name().to_string(),
            };
            return Err(DeregisterError::new(token, error));
        }
        self.live.remove(token.name());
        Ok(())
    }

    /// Returns whether `name` is live.
    pub fn contains(&self, name: &str) -> bool {
        self.live.contains_key(name)
    }

    /// Live names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.live.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
/// In-process boundary registry used by tests and headless hosts.
pub struct MemoryBoundaryRegistry {
    inner: Rc<RefCell<BoundaryLedger>>,
}

impl MemoryBoundaryRegistry {
    /// Names of live registrations in sorted order.
    pub fn registered_names(&self) -> Vec<String> {
        self.inner.borrow().names()
    }
}

impl BoundaryRegistry for MemoryBoundaryRegistry {
    fn register(&self, name: &str) -> Result<BoundaryToken, BoundaryError> {
        self.inner.borrow_mut().register(name)
    }

    fn deregister(&self, token: BoundaryToken) -> Result<(), DeregisterError> {
        self.inner.borrow_mut().deregister(token)
    }

    fn is_registered(&self, name: &str) -> bool {
        self.inner.borrow().contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_and_deregister_round_trip() {
        let registry = MemoryBoundaryRegistry::default();
        let registry_obj: &dyn BoundaryRegistry = &registry;

        let token = registry_obj.register("boot").expect("register boot");
        assert_eq!(token.name(), "boot");
        assert!(registry_obj.is_registered("boot"));

        registry_obj.deregister(token).expect("deregister boot");
        assert!(!registry_obj.is_registered("boot"));
        assert!(registry.registered_names().is_empty());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let registry = MemoryBoundaryRegistry::default();
        let _token = registry.register("AndroidFS").expect("first registration");
        assert_eq!(
            registry.register("AndroidFS"),
            Err(BoundaryError::AlreadyRegistered {
                name: "AndroidFS".to_string()
            })
        );
    }

    #[test]
    fn forged_or_stale_tokens_cannot_deregister() {
        let registry = MemoryBoundaryRegistry::default();
        let token = registry.register("boot").expect("register");

        let forged = BoundaryToken::issue("boot", token.id() + 100);
        let err = registry.deregister(forged).expect_err("forged token");
        assert_eq!(
            err.error(),
            &BoundaryError::UnknownToken {
                name: "boot".to_string()
            }
        );
        let (returned, _) = err.into_parts();
        assert_eq!(returned.id(), token.id() + 100);
        assert!(registry.is_registered("boot"));

        registry.deregister(token).expect("owner deregisters");
        let replay = BoundaryToken::issue("boot", 1);
        assert!(registry.deregister(replay).is_err());
    }

    #[test]
    fn ledger_reissues_a_name_with_a_fresh_id() {
        let mut ledger = BoundaryLedger::default();
        let first = ledger.register("boot").expect("first");
        ledger.deregister(first).expect("release");
        assert!(!ledger.contains("boot"));

        let second = ledger.register("boot").expect("second");
        assert_eq!(second.id(), 2);
        assert_eq!(ledger.names(), vec!["boot".to_string()]);

        let stale = BoundaryToken::issue("boot", 1);
        assert!(ledger.deregister(stale).is_err());
        assert!(ledger.contains("boot"));
    }
}
