//! # Events Module
//!
//! Progress reporting for the archive engine.
//!
//! ## Design
//! The engine never prints. It emits events through a channel and any UI
//! (the CLI progress bar, a log sink, a test) subscribes to them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::File(FileEvent::Archived { source, destination }) = event {
//!             println!("{} -> {}", source.display(), destination.display());
//!         }
//!     }
//! });
//!
//! engine.run(&roots, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
