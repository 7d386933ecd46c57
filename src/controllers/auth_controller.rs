use sqlx::PgPool;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::middleware::auth::AuthUser;
use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    repository: UserRepository,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            repository: UserRepository::new(pool),
            jwt,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = generate_token(user.id, user.role, &self.jwt)?;

        log::info!("User {} logged in", user.username);

        Ok(LoginResponse {
            token,
            user: UserProfile::from(user),
        })
    }

    /// Registrar un usuario nuevo. Solo administradores.
    pub async fn register(&self, caller: AuthUser, request: RegisterRequest) -> AppResult<UserProfile> {
        if caller.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Only administrators can register users".to_string(),
            ));
        }

        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .email_or_username_exists(&request.email, &request.username)
            .await?
        {
            return Err(AppError::Validation(
                "Email or username already registered".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let user = self
            .repository
            .create(
                request.username,
                request.email,
                password_hash,
                request.full_name,
                request.role,
            )
            .await?;

        Ok(UserProfile::from(user))
    }

    pub async fn me(&self, caller: AuthUser) -> AppResult<UserProfile> {
        let user = self
            .repository
            .find_by_id(caller.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(UserProfile::from(user))
    }
}
