pub mod ecs;
pub mod id;
pub mod snapshot;

pub use id::IdGenerator;
