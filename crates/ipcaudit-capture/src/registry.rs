//! Identity-registry collaborator.

use std::collections::HashMap;

use thiserror::Error;

/// A package could not be resolved to an owning identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no identity registered for package {package}")]
pub struct LookupError {
    /// The package that failed to resolve.
    pub package: String,
}

/// Maps a component's owning package to the numeric identity of its
/// process. The recorder treats any error as "unresolved" and records
/// identity 0.
pub trait IdentityRegistry: Send + Sync {
    /// Resolve the numeric identity owning `package`.
    fn resolve_owner_identity(&self, package: &str) -> Result<i32, LookupError>;
}

/// Registry backed by a fixed package table.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    identities: HashMap<String, i32>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `package` as owned by `uid`.
    pub fn insert(mut self, package: impl Into<String>, uid: i32) -> Self {
        self.identities.insert(package.into(), uid);
        self
    }
}

impl IdentityRegistry for StaticRegistry {
    fn resolve_owner_identity(&self, package: &str) -> Result<i32, LookupError> {
        self.identities
            .get(package)
            .copied()
            .ok_or_else(|| LookupError {
                package: package.to_string(),
            })
    }
}

/// Registry that resolves nothing.
#[derive(Debug, Default)]
pub struct NullRegistry;

impl IdentityRegistry for NullRegistry {
    fn resolve_owner_identity(&self, package: &str) -> Result<i32, LookupError> {
        Err(LookupError {
            package: package.to_string(),
        })
    }
}
