//! Runtime orchestration for dice combat sessions.
//!
//! This crate wires the content registries and the dice engine into a
//! synchronous, replayable combat loop. Consumers embed [`CombatSession`] to
//! drive turns; every pass runs to completion before control returns, and
//! downstream combat/mana events are drained into an [`EventSink`] after the
//! action that produced them completes.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the combat loop driver
//! - [`resolver`] defines the event sink contract the combat resolver
//!   implements, plus a reference aggregating implementation
//! - [`replay`] persists turn records as JSON lines for diagnostics and
//!   deterministic replay verification
pub mod replay;
pub mod resolver;
pub mod session;

pub use replay::{FileReplayLog, ReplayError, TurnRecord};
pub use resolver::{AggregatingSink, EventSink, NullSink};
pub use session::{CombatSession, SessionConfig, SessionError};
