//! Process-level plumbing split from main.rs: health endpoints, the HTTP
//! server loop and shutdown handling.

mod health;
mod server;
mod shutdown;

pub use health::*;
pub use server::*;
pub use shutdown::*;
