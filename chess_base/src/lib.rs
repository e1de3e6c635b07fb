//! # Base types for arbiter
//!
//! This is an auxiliary crate for `arbiter`, which contains plain value types: squares, colors,
//! piece kinds, square sets and board geometry constants. It holds no board state.
//!
//! Normally you don't want to use this crate directly. Use `arbiter` instead, which re-exports
//! everything declared here.

pub mod bitboard;
pub mod geometry;
pub mod types;
