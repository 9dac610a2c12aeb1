use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use surgery_client::{Role, User};

use crate::errors::AppError;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

pub fn generate_token(secret: &str, user: &User) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        role: user.role,
        exp,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_token(
    secret: &str,
    token: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<Claims>> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "drhouse".into(),
            email: None,
            real_name: None,
            phone: None,
            role: Role::Doctor,
            gender: None,
            birth_date: None,
            department: None,
            professional_title: None,
            license_number: None,
            is_active: true,
        }
    }

    #[test]
    fn token_carries_username_and_role() {
        let token = generate_token("k", &user()).unwrap();
        let data = verify_token("k", &token).unwrap();
        assert_eq!(data.claims.sub, "drhouse");
        assert_eq!(data.claims.role, Role::Doctor);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token("k", &user()).unwrap();
        assert!(verify_token("other", &token).is_err());
    }
}
