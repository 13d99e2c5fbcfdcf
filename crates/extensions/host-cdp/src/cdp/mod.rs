//! Chrome DevTools Protocol plumbing.

mod client;
mod error;
pub mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use session::{CdpTransport, PageSession};
