//! # Window Gopher
//!
//! Keeps a background window "active" by pulling it to the foreground for a
//! few seconds on a fixed cycle, then handing focus back to the window you
//! were using.
//!
//! ## Pieces
//!
//! - [`WindowRegistry`] rescans the process list every few seconds and
//!   publishes an immutable [`Snapshot`] of label -> window.
//! - [`Oscillator`] resolves two labels once, then alternates the foreground
//!   between them on its own timer.
//! - [`force_to_front`] is the only code that changes global window state.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use window_gopher::config::SCAN_INTERVAL;
//! use window_gopher::platform::NativeControl;
//! use window_gopher::{Oscillator, OscillatorConfig, ProcessFinder, WindowRegistry};
//!
//! # async fn demo() -> window_gopher::Result<()> {
//! let control = Arc::new(NativeControl::new());
//! let registry = WindowRegistry::new(ProcessFinder::new(control.clone()));
//! let (snapshots, _scanner) = registry.spawn(SCAN_INTERVAL);
//!
//! let snapshot = snapshots.borrow().clone();
//! let mut labels = snapshot.labels();
//! let (current, target) = (labels.next().unwrap(), labels.next().unwrap());
//!
//! let mut oscillator = Oscillator::new(control);
//! oscillator.start(&snapshot, current, target, OscillatorConfig::from_inputs("23", "3"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod foreground;
pub mod hotkey;
pub mod oscillator;
pub mod platform;
pub mod process_finder;
pub mod registry;

pub use config::OscillatorConfig;
pub use error::{GopherError, Result};
pub use foreground::force_to_front;
pub use oscillator::{Oscillator, Phase, WindowPair};
pub use platform::{WindowControl, WindowHandle};
pub use process_finder::{ProcessFinder, ProcessSource};
pub use registry::{Snapshot, WindowEntry, WindowRegistry};
