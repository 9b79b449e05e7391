//! Domain primitive types used across the berth workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the engine when a container is created.
///
/// Immutable once created; the engine is the sole authority on its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a container ID from the engine's output.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An image reference as the caller names it, e.g. `memcached` or
/// `memcached:1.6`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates an image reference from a name, optionally with a tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether `listed` (a `repository:tag` line from the engine's
    /// image listing) refers to this image.
    ///
    /// A reference without a tag matches any tag of the same repository;
    /// a reference with a tag must match exactly. `memcached` matches
    /// `memcached:latest` but `redis` does not match `redis-stack:latest`.
    #[must_use]
    pub fn matches(&self, listed: &str) -> bool {
        if self.0.contains(':') {
            return listed == self.0;
        }
        match listed.rsplit_once(':') {
            Some((repository, _tag)) => repository == self.0,
            None => listed == self.0,
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A reachable network endpoint derived for a running container.
///
/// Never cached: a container's mapped address may only stabilize after
/// start, so it is recomputed on each lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host-reachable address (container IP or engine gateway).
    pub address: String,
    /// Host-side TCP port.
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
