use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    #[serde(default)]
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// Decodes an HS256 token and accepts it only as an access token.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Refresh tokens cannot be used for API access".to_string());
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "test-secret";

    fn token(token_type: TokenType, ttl: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            user_id: 7,
            sub: "jane".into(),
            role: 3,
            exp: (now + ttl) as usize,
            jti: uuid::Uuid::new_v4().to_string(),
            token_type,
            employee_id: Some("e-7".into()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn access_token_round_trips() {
        let claims = verify_token(&token(TokenType::Access, 600), SECRET).unwrap();
        assert_eq!(claims.sub, "jane");
        assert_eq!(claims.employee_id.as_deref(), Some("e-7"));
    }

    #[test]
    fn refresh_expired_and_foreign_tokens_are_refused() {
        assert!(verify_token(&token(TokenType::Refresh, 600), SECRET).is_err());
        assert!(verify_token(&token(TokenType::Access, -600), SECRET).is_err());
        assert!(verify_token(&token(TokenType::Access, 600), "other-secret").is_err());
    }
}
