// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, User},
    store::RecordStore,
};

// Hashing roda fora do executor async para não travar o runtime.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<RecordStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: Arc<RecordStore>, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    // Login pelo e-mail (sem diferenciar caixa) ou pelo id interno.
    // Qualquer falha devolve o mesmo erro genérico: não revelamos se o
    // usuário existe.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self
            .store
            .list_users()
            .await
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(identifier) || u.id == identifier)
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // Executa a verificação em uma thread separada
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password, &password_hash)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user.id)?;
        Ok((token, user))
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.store
            .get_user(&token_data.claims.sub)
            .await
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
