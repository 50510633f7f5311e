// Authentication for the server
//
// A password login issues bearer tokens; the middleware validates them on
// all API requests except the login endpoint itself. There is no lockout
// and no token expiry: a wrong password simply re-prompts, and tokens
// live until the process exits.

use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, Method, StatusCode},
    response::Response,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::Layer;

/// Password check plus the set of issued bearer tokens
pub struct AuthState {
    password: String,
    tokens: Mutex<HashSet<String>>,
}

impl AuthState {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            tokens: Mutex::new(HashSet::new()),
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        candidate == self.password
    }

    /// Mint and remember a new bearer token
    pub fn issue_token(&self) -> String {
        let token = generate_auth_token();
        self.tokens.lock().unwrap().insert(token.clone());
        token
    }

    pub fn is_valid_token(&self, token: &str) -> bool {
        self.tokens.lock().unwrap().contains(token)
    }
}

/// Authentication layer that validates bearer tokens
#[derive(Clone)]
pub struct AuthLayer {
    auth: Arc<AuthState>,
}

impl AuthLayer {
    pub fn new(auth: Arc<AuthState>) -> Self {
        Self { auth }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            auth: self.auth.clone(),
        }
    }
}

/// The actual middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    auth: Arc<AuthState>,
}

impl<S> tower::Service<Request> for AuthMiddleware<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let auth = self.auth.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let path = req.uri().path();
            let method = req.method().clone();

            // Skip auth for CORS preflight OPTIONS requests
            if method == Method::OPTIONS {
                return inner.call(req).await;
            }

            // Login is the one open API endpoint; WebSocket upgrades
            // carry their token as a query param and validate in the
            // handler (browsers cannot set headers on WS requests)
            let requires_auth = path.starts_with("/api/") && path != "/api/login";

            if requires_auth {
                let authorized = req
                    .headers()
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(|token| auth.is_valid_token(token))
                    .unwrap_or(false);

                if !authorized {
                    let response = Response::builder()
                        .status(StatusCode::UNAUTHORIZED)
                        .body(Body::from("Unauthorized"))
                        .unwrap();
                    return Ok(response);
                }
            }

            inner.call(req).await
        })
    }
}

/// Generate a random 32-char hex token
pub fn generate_auth_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    let mut result = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        result.push(HEX_CHARS[(byte >> 4) as usize] as char);
        result.push(HEX_CHARS[(byte & 0xf) as usize] as char);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_auth_token() {
        let token = generate_auth_token();
        assert_eq!(token.len(), 32); // 16 bytes = 32 hex chars
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0xab]), "00ffab");
        assert_eq!(hex_encode(&[0x12, 0x34]), "1234");
    }

    #[test]
    fn test_password_verification() {
        let auth = AuthState::new("hunter2");
        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("admin123"));
        assert!(!auth.verify_password(""));
    }

    #[test]
    fn test_issued_tokens_validate() {
        let auth = AuthState::new("hunter2");
        let token = auth.issue_token();

        assert!(auth.is_valid_token(&token));
        assert!(!auth.is_valid_token("forged"));
    }

    #[test]
    fn test_tokens_survive_multiple_issues() {
        let auth = AuthState::new("hunter2");
        let first = auth.issue_token();
        let second = auth.issue_token();

        assert_ne!(first, second);
        assert!(auth.is_valid_token(&first));
        assert!(auth.is_valid_token(&second));
    }
}
