pub mod observation;
pub mod state;


pub use observation::Observation;
pub use state::AggregateState;
