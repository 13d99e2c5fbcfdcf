//! Browser host over the Chrome DevTools Protocol.
//!
//! Attaches to a running Chrome (started with `--remote-debugging-port`)
//! and exposes the recruiting tab as a [`BrowserHost`]. Each frame gets its
//! own isolated JavaScript world, so page scripts cannot observe the probes.
//!
//! [`BrowserHost`]: greetbot_protocols::BrowserHost

pub mod cdp;
mod frame;
mod host;

#[cfg(test)]
mod testing;

pub use cdp::{CdpClient, CdpError, CdpTransport, PageSession};
pub use frame::{CdpFrame, frame_origin};
pub use host::CdpHost;
