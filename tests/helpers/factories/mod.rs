pub mod change_event_factory;
pub mod observation_factory;

pub use change_event_factory::ChangeEventFactory;
pub use observation_factory::ObservationFactory;
