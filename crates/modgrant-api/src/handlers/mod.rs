//! HTTP request handlers.

pub mod access_requests;
pub mod health;
pub mod modules;

use uuid::Uuid;

use crate::auth::JwtClaims;
use crate::error::ApiError;

/// Resolve the acting user's ID from the validated token claims.
///
/// The middleware guarantees claims are present; a non-UUID subject means
/// the token was minted for something other than an employee.
fn caller_id(claims: &JwtClaims) -> Result<Uuid, ApiError> {
    Uuid::parse_str(&claims.sub).map_err(|_| ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> JwtClaims {
        JwtClaims {
            sub: sub.to_string(),
            email: None,
            exp: 0,
            iat: None,
        }
    }

    #[test]
    fn uuid_subject_resolves() {
        let id = Uuid::new_v4();
        assert_eq!(caller_id(&claims(&id.to_string())).unwrap(), id);
    }

    #[test]
    fn non_uuid_subject_is_unauthorized() {
        assert!(caller_id(&claims("service-account")).is_err());
    }
}
