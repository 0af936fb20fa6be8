//! User identity as seen by the core.
//!
//! Authentication and credential storage live outside this crate; every core
//! operation receives the current user (or user id) explicitly.

use serde::{Deserialize, Serialize};

/// A storefront user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id
    pub id: String,

    /// Unique email address
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}
