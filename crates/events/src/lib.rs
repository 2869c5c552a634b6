//! Domain events and their in-process distribution.
//!
//! Events are published **after** the state they describe has been committed;
//! a rolled-back distribution run never publishes anything.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
