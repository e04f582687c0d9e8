/// Adapters layer - Infrastructure implementations
///
/// Concrete implementations of the outbound ports: PyPI and GitHub clients,
/// the SQLite cache, lock file scanners and output writers.
pub mod outbound;
