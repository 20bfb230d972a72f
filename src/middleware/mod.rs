pub mod access_log;
pub mod auth;
pub mod recovery;

pub use access_log::access_log;
pub use auth::{auth_gate, is_public, PUBLIC_PATHS};
pub use recovery::{error_boundary, install_panic_hook};
