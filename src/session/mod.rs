//! Login and account session.

mod auth;
mod session;

pub use auth::AccountStats;
pub use session::RemoteSession;
