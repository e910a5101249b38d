//! Presentation adapters that turn service responses into user-facing output.

pub mod report;
