//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types (positions, velocities, colors)
//! - Frame timing and pacing
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
