//! Marker-tracked AR card engine.
//!
//! Content attached to printed markers is shown only while the marker is
//! tracked. Taps on that content run link, scene and video actions, with at
//! most one video overlay playing at a time.

pub mod engine;
pub mod error;
pub mod interaction;
pub mod platform;
pub mod rpc;
pub mod tracking;
pub mod video;
