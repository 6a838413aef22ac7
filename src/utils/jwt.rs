use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Login,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub auth: String,
    pub exp: usize,
    pub iat: usize,
    pub r#type: TokenType,
}

pub struct JWT {
    key_enc: EncodingKey,
    key_dec: DecodingKey,
    duration: TimeDelta,
}

impl JWT {
    pub fn new(secret: String, duration: TimeDelta) -> Self {
        Self {
            duration,
            key_enc: EncodingKey::from_secret(secret.as_ref()),
            key_dec: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn create_by_login(&self, user_id: &str) -> Result<String, String> {
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            exp: (Utc::now() + self.duration).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
            r#type: TokenType::Login,
        };

        encode(&Header::default(), &claims, &self.key_enc).map_err(|err| err.to_string())
    }

    pub fn decode_by_type(&self, token: &str, r#type: TokenType) -> Result<Claims, String> {
        let token_message =
            decode::<Claims>(token, &self.key_dec, &Validation::new(Algorithm::HS256));

        let data = match token_message {
            Ok(data) => data.claims,
            Err(err) => return Err(err.to_string()),
        };

        if data.r#type == r#type {
            Ok(data)
        } else {
            Err("Token type is not equal".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn sign_and_verify_login_token() {
        let jwt = JWT::new("some-secret".to_string(), Duration::minutes(5));
        let token = jwt.create_by_login("local_user:abc").unwrap();
        let claims = jwt.decode_by_type(&token, TokenType::Login).unwrap();
        assert_eq!(claims.auth, "local_user:abc");
    }

    #[test]
    fn verify_expired_fails() {
        let jwt = JWT::new("some-secret".to_string(), Duration::minutes(-5));
        let token = jwt.create_by_login("local_user:abc").unwrap();
        assert!(jwt.decode_by_type(&token, TokenType::Login).is_err());
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let jwt = JWT::new("some-secret".to_string(), Duration::minutes(5));
        let other = JWT::new("other-secret".to_string(), Duration::minutes(5));
        let token = jwt.create_by_login("local_user:abc").unwrap();
        assert!(other.decode_by_type(&token, TokenType::Login).is_err());
    }
}
