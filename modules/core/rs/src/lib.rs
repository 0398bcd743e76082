pub mod parallelism;
pub mod shared;
