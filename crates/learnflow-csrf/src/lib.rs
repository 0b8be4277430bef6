//! CSRF (Cross-Site Request Forgery) protection
//!
//! Implements the double-submit cookie pattern for the LearnFlow API. A random
//! token is stored in an HTTP-only cookie and advertised in the
//! `X-CSRF-Token` response header; state-changing requests must echo it back
//! in the same header. Tokens rotate on every request that passes through the
//! middleware.
//!
//! ```rust,ignore
//! use axum::{middleware, routing::post, Router};
//! use learnflow_csrf::{csrf_protect, CsrfConfig, CsrfProtection, SecretKey};
//!
//! let csrf = CsrfProtection::new(CsrfConfig::new(SecretKey::new(secret)?))?;
//! let app = Router::new()
//!     .route("/api/groups", post(create_group))
//!     .layer(middleware::from_fn_with_state(csrf, csrf_protect));
//! ```

pub mod config;
pub mod cookie_store;
pub mod error;
pub mod extract;
pub mod hasher;
pub mod middleware;
pub mod token;
pub mod validator;

pub use config::CsrfConfig;
pub use cookie_store::{CookieStore, CSRF_COOKIE_NAME};
pub use error::{CsrfError, CsrfResult, CSRF_ERROR_HEADER};
pub use extract::IssuedToken;
pub use hasher::{SecretKey, TokenDigest, TokenHasher};
pub use middleware::{csrf_protect, is_safe_method, CsrfProtection, CSRF_HEADER_NAME};
pub use token::CsrfToken;
pub use validator::Validator;
