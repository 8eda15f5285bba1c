pub mod callback;
pub mod config;
pub mod cookie;
pub mod error;
pub mod guard;
pub mod proxy;
pub mod router;
pub mod state;
