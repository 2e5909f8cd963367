/// Authenticated caller
///
/// Produced by the API's bearer-token middleware and passed by value into
/// every service call that needs to know who is asking.

use uuid::Uuid;

use super::jwt::Claims;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Id of the authenticated user
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self::new(claims.sub)
    }
}
