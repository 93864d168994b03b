//!  State is organized through [session::Session].
//!  The basic idea is:
//!   - The whole [state::AppState] is held in memory by the session.
//!   - Every successful change is written back through a [store::StateStore].
//!   - Imports are validated in full before anything is replaced.

pub mod session;
pub mod state;
pub mod store;
