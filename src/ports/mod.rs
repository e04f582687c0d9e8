/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound (driven) ports only: the application core is driven directly by
/// the CLI, and reaches registries, the cache, the file system and the
/// console through the traits below.
pub mod outbound;
