// McNotify - app/mod.rs
//
// Application layer: tailing, state persistence, dispatch, delivery.
// Dependencies: core layer, platform helpers.

pub mod delivery;
pub mod dispatch;
pub mod tail;
pub mod tail_state;
