/// Address-scoped impersonation tokens
///
/// Tokens carry `{address, address_id}` and are signed with HS256. Expiry and
/// verification belong to whoever consumes the token.
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::address;
use crate::error::{AdminError, Result};
use crate::store::Database;
use crate::utils::redact_address;

pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims of an impersonation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressClaims {
    pub address: String,
    pub address_id: i64,
}

#[derive(Clone)]
pub struct ImpersonationIssuer {
    key: EncodingKey,
}

impl fmt::Debug for ImpersonationIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpersonationIssuer")
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl ImpersonationIssuer {
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(AdminError::Config("JWT secret must not be empty".to_string()));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Sign a token for a known address
    pub fn sign(&self, address: &str, address_id: i64) -> Result<String> {
        let claims = AddressClaims {
            address: address.to_string(),
            address_id,
        };
        Ok(encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.key)?)
    }

    /// Resolve the address for `address_id` and sign a token for it.
    ///
    /// An unknown id is not an error: the token carries an empty address and
    /// callers treat that as not found.
    pub async fn issue(&self, db: &dyn Database, address_id: i64) -> Result<String> {
        let name = address::name_by_id(db, address_id)
            .await?
            .unwrap_or_default();

        if name.is_empty() {
            warn!(address_id, "Issuing impersonation token for unknown address id");
        }

        let token = self.sign(&name, address_id)?;
        info!(
            address_id,
            address = %redact_address(&name),
            "Issued impersonation token"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MockDatabase, Param};
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use serde_json::json;

    fn decode_claims(token: &str, secret: &str) -> AddressClaims {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<AddressClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_sign_round_trips_claims() {
        let issuer = ImpersonationIssuer::new("s3cret").unwrap();
        let token = issuer.sign("alice@example.com", 7).unwrap();

        assert_eq!(
            decode_claims(&token, "s3cret"),
            AddressClaims {
                address: "alice@example.com".to_string(),
                address_id: 7
            }
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(ImpersonationIssuer::new("").is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let issuer = ImpersonationIssuer::new("s3cret").unwrap();
        assert!(!format!("{:?}", issuer).contains("s3cret"));
    }

    #[tokio::test]
    async fn test_issue_resolves_name() {
        let mut db = MockDatabase::new();
        db.expect_first()
            .withf(|stmt| stmt.params == vec![Param::Integer(3)])
            .returning(|_| Ok(json!({"name": "bob@example.com"}).as_object().cloned()));

        let issuer = ImpersonationIssuer::new("k").unwrap();
        let token = issuer.issue(&db, 3).await.unwrap();

        let claims = decode_claims(&token, "k");
        assert_eq!(claims.address, "bob@example.com");
        assert_eq!(claims.address_id, 3);
    }

    #[tokio::test]
    async fn test_issue_unknown_id_yields_empty_address() {
        let mut db = MockDatabase::new();
        db.expect_first().returning(|_| Ok(None));

        let issuer = ImpersonationIssuer::new("k").unwrap();
        let token = issuer.issue(&db, 404).await.unwrap();

        assert_eq!(decode_claims(&token, "k").address, "");
    }
}
