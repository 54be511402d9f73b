#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod build_info;
pub mod composer;
pub mod config;
pub mod counter;
pub mod fixtures;
pub mod geocoder;
pub mod protests;
pub mod resolver;
pub mod rest;
pub mod roster;
pub mod session;
pub mod state;
pub mod tracking;
