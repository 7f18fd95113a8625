mod hasher;
mod middleware;
mod session;
mod token;

pub use hasher::Hasher;
pub use middleware::{AuthError, LOGIN_PATH, RequireLogin};
pub use session::{
    AuthenticatedSession, SessionError, end_session, load_session_user, register_user,
    start_session, verify_credentials,
};
pub use token::{TokenGenerator, parse_token};
