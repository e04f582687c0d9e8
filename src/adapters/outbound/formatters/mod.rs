/// Renderers for the license attribution document
mod markdown_reporter;

pub use markdown_reporter::MarkdownReporter;
