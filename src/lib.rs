//! Grid-scale battery energy storage (BESS) dispatch simulator.
//!
//! The core is the battery physical model ([`battery`]) and the greedy
//! price-threshold dispatch engine ([`dispatch`]); the [`generator`]
//! supplies synthetic price and solar forecast series, and the optional
//! `api` feature exposes the whole pipeline over HTTP.

#[cfg(feature = "api")]
pub mod api;
pub mod battery;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod io;
pub mod series;
