//! Connection acceptance and dispatch.

pub mod listener;
pub mod pool;

pub use listener::{ConnectionTask, Server};
pub use pool::{PoolError, WorkerPool};
