pub mod aggregate;
pub mod changelog;
pub mod errors;
pub mod sharding;
pub mod view;

pub use errors::*;
