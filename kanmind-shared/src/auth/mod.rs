/// Authentication and authorization
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 bearer tokens
/// - [`context`]: the authenticated caller handed to services
/// - [`authorization`]: board membership predicate and permission checks
///
/// # Example
///
/// ```
/// use kanmind_shared::auth::context::AuthContext;
/// use kanmind_shared::auth::jwt::{create_token, validate_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(uuid::Uuid::new_v4()), secret)?;
///
/// let claims = validate_token(&token, secret)?;
/// let ctx = AuthContext::from(&claims);
/// assert_eq!(ctx.user_id, claims.sub);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod context;
pub mod jwt;
pub mod password;
