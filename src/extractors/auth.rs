use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{err, ok, Ready};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::AppError;

/// Configured API credentials, held only as SHA-256 digests.
#[derive(Clone)]
pub struct ApiCredentials {
    username: [u8; 32],
    password: [u8; 32],
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Compares every byte regardless of where the first difference is.
fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl ApiCredentials {
    pub fn new(username: &str, password: &Secret<String>) -> Self {
        Self {
            username: digest(username),
            password: digest(password.expose_secret()),
        }
    }

    /// Both digests are always computed and compared.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(&digest(username), &self.username);
        let pass_ok = constant_time_eq(&digest(password), &self.password);
        user_ok & pass_ok
    }
}

/// Extractor that validates HTTP Basic credentials.
pub struct BasicAuth {
    pub username: String,
}

fn parse_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

impl FromRequest for BasicAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let credentials = match req.app_data::<web::Data<ApiCredentials>>() {
            Some(credentials) => credentials.clone(),
            None => {
                return err(AppError::InternalError(
                    "API credentials not configured".to_string(),
                ))
            }
        };

        let (username, password) = match req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_basic)
        {
            Some(pair) => pair,
            None => {
                return err(AppError::Unauthorized(
                    "Missing or invalid Authorization header".to_string(),
                ))
            }
        };

        if credentials.verify(&username, &password) {
            ok(BasicAuth { username })
        } else {
            warn!(path = %req.path(), "rejected credentials");
            err(AppError::Unauthorized("Invalid credentials".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn credentials() -> ApiCredentials {
        ApiCredentials::new("admin", &Secret::new("hunter2".to_string()))
    }

    #[test]
    fn test_verify() {
        let creds = credentials();
        assert!(creds.verify("admin", "hunter2"));
        assert!(!creds.verify("admin", "hunter3"));
        assert!(!creds.verify("root", "hunter2"));
    }

    #[test]
    fn test_constant_time_eq() {
        let a = digest("hunter2");
        let mut b = a;
        assert!(constant_time_eq(&a, &b));
        b[31] ^= 1;
        assert!(!constant_time_eq(&a, &b));
        b = a;
        b[0] ^= 0x80;
        assert!(!constant_time_eq(&a, &b));
    }

    #[test]
    fn test_parse_basic_header() {
        let header = format!("Basic {}", STANDARD.encode("admin:pa:ss"));
        assert_eq!(
            parse_basic(&header),
            Some(("admin".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(parse_basic("Bearer abc"), None);
        assert_eq!(parse_basic("Basic !!!"), None);
    }

    #[actix_rt::test]
    async fn test_extractor_accepts_valid_credentials() {
        let req = TestRequest::default()
            .app_data(web::Data::new(credentials()))
            .insert_header((
                header::AUTHORIZATION,
                format!("Basic {}", STANDARD.encode("admin:hunter2")),
            ))
            .to_http_request();

        let auth = BasicAuth::extract(&req).await.unwrap();
        assert_eq!(auth.username, "admin");
    }

    #[actix_rt::test]
    async fn test_extractor_rejects_missing_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(credentials()))
            .to_http_request();

        let result = BasicAuth::extract(&req).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
