//! Client side of the flight booking site: airport/flight search, booking,
//! sign-in and online check-in against the booking REST backend, rendered into
//! an in-memory page that a host shell displays.

pub mod config;
pub mod controller;
pub mod models;
pub mod services;
pub mod utils;
pub mod view;
