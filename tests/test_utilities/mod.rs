/// Shared test helpers
pub mod mocks;
pub mod stub_server;
