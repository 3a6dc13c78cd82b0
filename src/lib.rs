pub mod cli;
pub mod commands;
pub mod config;
pub mod session;
pub mod ssh;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use session::{SessionError, SessionManager};
