//! Built-in section behaviors
//!
//! Rendering is injected so the same behavior drives the DOM on the web and a
//! recorder in tests.

pub mod home;
pub mod options;
