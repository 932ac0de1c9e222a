//! Furniture arrangement planner for rectangular rooms.
//!
//! Given room dimensions, doors and windows, and a list of furniture items,
//! the planner searches a floor grid for non-overlapping placements that
//! respect door clearance and score well against per-category placement
//! rules. The HTTP service in [`api`] exposes the search to renderers.

pub mod api;
pub mod catalog;
pub mod config;
pub mod geometry;
pub mod model;
pub mod optimizer;
pub mod rules;
pub mod scorer;
pub mod types;
