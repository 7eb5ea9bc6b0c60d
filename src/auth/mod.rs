//! Session authentication: password hashing, signed session tokens, the
//! `session` cookie, and the request gates built on top of them.

pub mod cookie;
pub mod error;
pub mod gate;
pub mod password;
pub mod secret;
pub mod state;
pub mod token;

pub use cookie::{clear_session_cookie, current_session, session_cookie, SESSION_COOKIE_NAME};
pub use gate::{authenticate, require_role, AdminSession, GateRejection, MaybeSession, Session};
pub use secret::{resolve_session_secret, Environment};
pub use state::{AuthConfig, AuthState};
pub use token::{SessionKeys, TokenPayload};
