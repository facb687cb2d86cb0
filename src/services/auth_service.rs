use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    config::JwtConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, WhoAmI},
    entity::{
        admins::{Column as AdminCol, Entity as Admins},
        consultants::{Column as ConsultantCol, Entity as Consultants},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Role},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    validate,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(jwt: &JwtConfig, subject: Uuid, role: Role) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(jwt.ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: subject.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(state: &AppState, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    let name = validate::required("name", Some(&payload.name))?;
    let email = validate::email("email", Some(&payload.email))?;
    validate::payload(&payload)?;

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(payload.phone.filter(|p| !p.trim().is_empty())),
        password_hash: Set(hash_password(&payload.password)?),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

/// One login per role table; all three share the same response and error shape.
pub async fn login(
    state: &AppState,
    role: Role,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let account: Option<(Uuid, String)> = match role {
        Role::Superadmin => Admins::find()
            .filter(AdminCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|a| (a.id, a.password_hash)),
        Role::Consultant => Consultants::find()
            .filter(ConsultantCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|c| (c.id, c.password_hash)),
        Role::Client => Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .one(&state.orm)
            .await?
            .map(|u| (u.id, u.password_hash)),
    };

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let (id, password_hash) = account.ok_or_else(invalid)?;
    if !verify_password(&password, &password_hash)? {
        return Err(invalid());
    }

    let token = issue_token(&state.config.jwt, id, role)?;

    audit::record(
        &state.pool,
        Some(id),
        "login",
        role.as_str(),
        serde_json::json!({ "id": id, "role": role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {token}"),
            role,
        },
        Some(Meta::empty()),
    ))
}

pub fn whoami(user: &AuthUser) -> ApiResponse<WhoAmI> {
    ApiResponse::success(
        "Current user",
        WhoAmI {
            id: user.user_id,
            role: user.role,
        },
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_token;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".into(),
            ttl_hours: 1,
        }
    }

    #[test]
    fn issued_token_decodes_to_same_identity() {
        let id = Uuid::new_v4();
        let token = issue_token(&jwt(), id, Role::Consultant).unwrap();
        let user = decode_token(&token, "unit-test-secret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, Role::Consultant);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = issue_token(&jwt(), Uuid::new_v4(), Role::Superadmin).unwrap();
        assert!(matches!(
            decode_token(&token, "another-secret"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtConfig {
            secret: "unit-test-secret".into(),
            ttl_hours: -2,
        };
        let token = issue_token(&expired, Uuid::new_v4(), Role::Client).unwrap();
        assert!(decode_token(&token, "unit-test-secret").is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }
}
