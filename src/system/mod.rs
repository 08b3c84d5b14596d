pub mod directory;
pub mod platform;
pub mod sample;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;
