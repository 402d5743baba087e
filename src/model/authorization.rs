//! Authorization capability.
//!
//! The orchestration layer adds no policy of its own: whatever the model's
//! [`Authorizer`] answers is final.

use super::ResolvedImage;
use crate::request::Action;
use std::collections::BTreeSet;

/// What an authorization decision is made about.
#[derive(Debug, Clone, Copy)]
pub enum AuthTarget<'a> {
    /// The image the store resolved.
    Resolved(&'a ResolvedImage),
    /// The identifier the client asked for, when the store had nothing.
    Pending(&'a str),
}

impl AuthTarget<'_> {
    pub fn identifier(&self) -> &str {
        match self {
            AuthTarget::Resolved(image) => &image.identifier,
            AuthTarget::Pending(identifier) => identifier,
        }
    }
}

pub trait Authorizer: Send + Sync {
    fn can(&self, action: Action, target: &AuthTarget<'_>) -> bool;
}

/// Denies a fixed set of identifiers for every action; allows everything else.
///
/// With an empty set this is an allow-all authorizer.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    denied: BTreeSet<String>,
}

impl StaticAuthorizer {
    pub fn new(denied: impl IntoIterator<Item = String>) -> Self {
        Self {
            denied: denied.into_iter().collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }
}

impl Authorizer for StaticAuthorizer {
    fn can(&self, _action: Action, target: &AuthTarget<'_>) -> bool {
        !self.denied.contains(target.identifier())
    }
}
