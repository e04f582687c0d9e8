/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod cache;
pub mod console;
pub mod filesystem;
pub mod formatters;
pub mod resolvers;
pub mod scanners;
