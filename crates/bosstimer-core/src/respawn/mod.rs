//! Respawn reconciliation engine.
//!
//! Pure functions of their arguments: the event mode is passed in, and the
//! only clock read is [`now_ms`] for callers that do not supply `now`.

mod manual;
mod mode;
mod planning;
mod reconcile;

pub use manual::{resolve_manual_cut_instant, resolve_server_open};
pub use mode::EventMode;
pub use planning::{plan_cut, plan_initial_cuts};
pub use reconcile::{
    adjust_with_grace, interval_ms, now_ms, GraceAdjustment,
    DEFAULT_GRACE_MINUTES,
};
