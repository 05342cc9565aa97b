//! # roimesh-session
//!
//! The single-threaded controller behind the viewer and the script runner.
//!
//! - [`scheduler`] - the debounce state machine (Idle / Ready / Pending)
//! - [`session`] - [`Session`]: volume, labels, colors, parameters, renderer
//! - [`messages`] - [`SessionMsg`] in, [`SessionEvent`] out
//! - [`script`] - line-oriented headless playback
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use roimesh_session::{Session, SessionMsg};
//!
//! let mut session = Session::default();
//! session.handle(SessionMsg::LoadVolume("atlas.nii.gz".into()), Instant::now());
//! session.handle(SessionMsg::SetSigma(1.2), Instant::now());
//! // ... later, from the event loop
//! session.tick(Instant::now());
//! for event in session.take_events() {
//!     println!("{event:?}");
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `serde` - Serialize [`RenderParams`] for persisted UI state

#![warn(missing_docs)]

pub mod error;
pub mod messages;
pub mod params;
pub mod scheduler;
pub mod script;
pub mod session;

pub use error::{ScriptError, ScriptResult};
pub use messages::{LabelRow, SessionEvent, SessionMsg};
pub use params::{MASK_THRESHOLD, RenderParams};
pub use scheduler::{DEFAULT_QUIET_PERIOD, RenderScheduler, SchedulerConfig, SchedulerState};
pub use script::{Script, Step, parse_size};
pub use session::{INITIAL_STATUS, Session};
