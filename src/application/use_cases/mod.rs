/// Use cases module containing application business logic orchestration
mod check_compliance;
mod resolve_dependencies;

pub use check_compliance::CheckComplianceUseCase;
pub use resolve_dependencies::ResolveDependenciesUseCase;
