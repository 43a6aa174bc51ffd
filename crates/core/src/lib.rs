//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `cart` - Cart store, inventory client and persistent slot
//! - `cli` - Command-line front end driving the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Cart transitions return a new [`Cart`] instead of
//! mutating in place, so callers decide when a new state is published.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records, stock and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
