//! Message bridge between the page side and the extension side.
//!
//! The original system spans three JavaScript contexts: the game page, an
//! isolated content script, and the extension background process. Here the
//! same topology is kept as three pieces talking over channels:
//!
//! - [`client::PageClient`] — the page side: issues correlated requests and
//!   receives pushes;
//! - [`relay::ContentRelay`] — the content-script analog: forwards only the
//!   allowlisted request actions one way and push actions the other, tags
//!   responses with the originating id;
//! - [`background::BackgroundService`] — the extension side: answers every
//!   request action out of persisted storage.

pub mod background;
pub mod client;
pub mod protocol;
pub mod relay;

pub use background::BackgroundService;
pub use client::PageClient;
pub use protocol::{Action, Envelope, Origin};
pub use relay::ContentRelay;
