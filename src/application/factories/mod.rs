mod presenter_factory;
mod resolver_factory;

pub use presenter_factory::{PresenterFactory, PresenterType};
pub use resolver_factory::{DefaultWaterfall, ResolverFactory, ResolverOptions};
