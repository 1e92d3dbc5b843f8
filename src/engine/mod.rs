//! Engine invocation: argument contract, child process lifecycle, output capture.

/// Child-process and in-memory engine runners.
pub mod invoke;
