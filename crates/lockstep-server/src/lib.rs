//! Lockstep HTTP server library (router and handlers, used by the binary and tests).

pub mod gateway;
pub mod health_check;
