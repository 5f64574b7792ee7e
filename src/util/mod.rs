//! Low-level helpers shared by the worker and the output layer

pub mod buffer;
pub mod fast_time;
pub mod time;
