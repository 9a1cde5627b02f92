//! Cross-crate property and regression suite for Mintpool.
//!
//! Tests here run the engines together over the canonical sequence and pin
//! the numbers the dashboards publish.

pub mod helpers;
