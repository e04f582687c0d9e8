/// Mock implementations for testing
mod mock_dependency_scanner;
mod mock_enricher;
mod mock_index_resolver;
mod mock_progress_reporter;

pub use mock_dependency_scanner::MockDependencyScanner;
pub use mock_enricher::MockEnricher;
pub use mock_index_resolver::MockIndexResolver;
pub use mock_progress_reporter::{MockProgressReporter, ReportEvent};
