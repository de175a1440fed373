mod builder;
mod container;
mod extractor;
mod factory;
mod injectable;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use extractor::{AppState, HasContainer, Inject};
pub use factory::Factory;
pub use injectable::Injectable;
