//! This module is an internalized version of async-ssh2-tokio library.
//! It provides an asynchronous and easy-to-use high level SSH client
//! for rust with the tokio runtime. Powered by the rust ssh implementation
//! russh.
//!
//! The heart of this module is [`Client`]. Use this for connection and authentication,
//! then open an interactive shell channel on it.
//!
//! # Features
//! * Connect to a SSH Host via TCP or through a `ProxyCommand` stream
//! * Open interactive shell channels with a PTY
//! * SSH agent, key file and password authentication
//! * known_hosts verification with strict, accept-new or disabled policy

pub mod authentication;
pub mod channel_manager;
pub mod connection;
pub mod error;

pub use authentication::{AuthMethod, ServerCheckMethod};
pub use connection::{Client, ClientHandler};
pub use error::Error;

// Re-export russh types commonly used with this module
pub use russh::client::Config;
