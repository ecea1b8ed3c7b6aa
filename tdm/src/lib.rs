//! Temporal dynamic macros.
//!
//! Record a sequence of key downs and key ups into one of a few macro slots, add pauses by typing
//! a number of milliseconds, then replay it once or in a loop. Playback never blocks: pauses are
//! handed to a [`scheduler::Scheduler`] and the macro resumes when the timer fires.
//!
//! The engine is [`controller::MacroController`]. [`runner::MacroRunner`] wraps it in an async
//! task fed by an `embassy-sync` channel.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod event;
pub mod hooks;
pub mod runner;
pub mod scheduler;
pub mod sink;
pub mod state;

pub use config::TdmConfig;
pub use controller::MacroController;
pub use event::KeyEvent;
pub use hooks::{LogHooks, MacroHooks, PinFeedback};
pub use runner::MacroRunner;
pub use scheduler::{Continuation, DeferredExecutor, Rearm, ScheduleError, Scheduler, TimerToken};
pub use sink::{HidReportSink, KeySink};
pub use state::{MacroState, TransitionError};
pub use tdm_types as types;
