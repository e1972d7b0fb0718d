//! # Events Module
//!
//! Progress reporting for dedupe runs.
//!
//! The core engine never prints. It emits events through a channel so a
//! caller (the CLI progress bar, a test) can observe a run as it happens.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Quarantine(QuarantineEvent::Relocated { from, to, .. }) = event {
//!             println!("{} -> {}", from.display(), to.display());
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
