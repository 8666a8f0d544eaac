//! Core engine types and utilities for Shoreline.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform and spatial helpers
//! - Frame timing with a fixed-step accumulator

pub mod math;
pub mod time;
pub mod transform;

pub use math::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
