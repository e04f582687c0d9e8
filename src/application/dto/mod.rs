/// Data Transfer Objects for application layer
///
/// DTOs carry requests into the use cases and their results back out to the
/// command-line layer, keeping the domain layer isolated.
mod resolution_request;
mod resolution_response;

pub use resolution_request::ResolutionRequest;
pub use resolution_response::ResolutionResponse;
