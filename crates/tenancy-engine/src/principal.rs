//! Request principal.
//!
//! The authentication collaborator resolves credentials to a user id; the
//! engine only ever sees the resulting [`Principal`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated user a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// The user's id
    pub user_id: Uuid,
}

impl Principal {
    /// Create a principal for a user.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl From<Uuid> for Principal {
    fn from(user_id: Uuid) -> Self {
        Self::new(user_id)
    }
}
