//! Application-level orchestration.
//!
//! The UI thread owns the controller; this module owns the async side that
//! actually talks to the generation service.

mod dispatcher;

pub(crate) use dispatcher::{run_dispatcher, AppEvent, UiCommand};
