pub mod auth;
pub mod known_hosts;
pub mod proxy;
pub mod shell;
pub mod ssh_config;
pub mod tokio_client;

pub use auth::{AuthContext, SecretCache};
pub use shell::SshShell;
