use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Consultant,
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Consultant => "consultant",
            Role::Client => "client",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "superadmin" => Some(Role::Superadmin),
            "consultant" => Some(Role::Consultant),
            "client" => Some(Role::Client),
            _ => None,
        }
    }
}

/// Caller identity decoded from the bearer token. `user_id` points at
/// `admins`, `consultants` or `users` depending on `role`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_superadmin(&self) -> bool {
        self.role == Role::Superadmin
    }

    /// True when the caller is the consultant `consultant_id`.
    pub fn is_consultant(&self, consultant_id: Uuid) -> bool {
        self.role == Role::Consultant && self.user_id == consultant_id
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_superadmin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Superadmin)
}

/// Superadmins, or the consultant that owns the resource.
pub fn ensure_consultant_or_superadmin(user: &AuthUser, consultant_id: Uuid) -> Result<(), AppError> {
    if user.is_superadmin() || user.is_consultant(consultant_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid subject in token".into()))?;
    let role = Role::parse(&decoded.claims.role)
        .ok_or_else(|| AppError::Unauthorized("Unknown role in token".into()))?;

    Ok(AuthUser { user_id, role })
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
        .trim();
    if token.is_empty() {
        return Err(AppError::Unauthorized("Empty bearer token".into()));
    }
    Ok(Some(token))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        decode_token(token, &state.config.jwt.secret)
    }
}

/// Public endpoints take `Option<AuthUser>`: no header means anonymous, a bad
/// header is still rejected.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => decode_token(token, &state.config.jwt.secret).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn superadmin_gate() {
        assert!(ensure_superadmin(&user(Role::Superadmin)).is_ok());
        assert!(matches!(
            ensure_superadmin(&user(Role::Client)),
            Err(AppError::Forbidden)
        ));
        assert!(ensure_superadmin(&user(Role::Consultant)).is_err());
    }

    #[test]
    fn consultant_may_only_touch_own_resources() {
        let me = user(Role::Consultant);
        assert!(ensure_consultant_or_superadmin(&me, me.user_id).is_ok());
        assert!(ensure_consultant_or_superadmin(&me, Uuid::new_v4()).is_err());

        // A client whose id happens to match is still not the consultant.
        let client = user(Role::Client);
        assert!(ensure_consultant_or_superadmin(&client, client.user_id).is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(matches!(
            decode_token("not-a-jwt", "secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn role_names() {
        for role in [Role::Superadmin, Role::Consultant, Role::Client] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
    }
}
