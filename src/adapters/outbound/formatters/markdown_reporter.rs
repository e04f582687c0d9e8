use crate::license_resolution::domain::{LicenseReference, PackageMetadata};
use crate::ports::outbound::AttributionRenderer;
use crate::shared::security::read_text_file;
use crate::shared::Result;
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};

/// Markdown table header for the summary
const TABLE_HEADER: &str = "| Package | Version | License |\n";

/// Markdown table separator line
const TABLE_SEPARATOR: &str = "|---------|---------|---------|\n";

const CUSTOM_TEMPLATE: &str = "custom";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Package fields exposed to custom templates
#[derive(Serialize)]
struct PackageView<'a> {
    name: &'a str,
    version: &'a str,
    description: Option<&'a str>,
    homepage: Option<&'a str>,
    repository_url: Option<&'a str>,
    author: Option<&'a str>,
    pypi_url: String,
    licenses: &'a [LicenseReference],
}

impl<'a> PackageView<'a> {
    fn from_metadata(package: &'a PackageMetadata) -> Self {
        Self {
            name: package.name(),
            version: package.version(),
            description: package.description(),
            homepage: package.homepage(),
            repository_url: package.repository_url(),
            author: package.author(),
            pypi_url: MarkdownReporter::pypi_url(package.name()),
            licenses: package.licenses(),
        }
    }
}

/// MarkdownReporter adapter for the license attribution document
///
/// Renders a summary table followed by one section per package. Packages are
/// sorted by case-insensitive name so output is stable across runs.
///
/// A custom Tera template replaces the built-in layout. It receives
/// `packages` (sorted), `root_project` (or null) and `generated_at`.
pub struct MarkdownReporter {
    template: Option<Tera>,
}

impl MarkdownReporter {
    pub fn new() -> Self {
        Self { template: None }
    }

    /// Uses the template in `path` instead of the built-in layout
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid template.
    pub fn with_template_file(path: &Path) -> Result<Self> {
        let source = read_text_file(path, "template file")?;
        Self::with_template(&source)
            .with_context(|| format!("Invalid template: {}", path.display()))
    }

    /// Uses `source` as the document template
    pub fn with_template(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(CUSTOM_TEMPLATE, source)?;
        Ok(Self {
            template: Some(tera),
        })
    }

    pub fn has_custom_template(&self) -> bool {
        self.template.is_some()
    }

    /// Renders the document with an explicit generation timestamp
    pub fn render_document_at(
        &self,
        packages: &[&PackageMetadata],
        root_project: Option<&PackageMetadata>,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let Some(tera) = &self.template else {
            return Ok(self.render_at(packages, root_project, generated_at));
        };

        let sorted = Self::sorted(packages);
        let views: Vec<PackageView<'_>> =
            sorted.iter().map(|p| PackageView::from_metadata(p)).collect();

        let mut context = Context::new();
        context.insert("packages", &views);
        context.insert("root_project", &root_project.map(PackageView::from_metadata));
        context.insert(
            "generated_at",
            &generated_at.format(TIMESTAMP_FORMAT).to_string(),
        );

        let rendered = tera
            .render(CUSTOM_TEMPLATE, &context)
            .context("Failed to render custom template")?;
        tracing::debug!(bytes = rendered.len(), "Rendered custom template");
        Ok(rendered)
    }

    /// Renders the built-in layout with an explicit generation timestamp
    pub fn render_at(
        &self,
        packages: &[&PackageMetadata],
        root_project: Option<&PackageMetadata>,
        generated_at: DateTime<Utc>,
    ) -> String {
        let sorted = Self::sorted(packages);

        let mut output = String::new();
        Self::render_header(&mut output, sorted.len());
        if let Some(root) = root_project {
            Self::render_root_project(&mut output, root);
        }
        Self::render_summary(&mut output, &sorted);
        Self::render_details(&mut output, &sorted);
        output.push_str(&format!(
            "---\n\n_Generated by license-tracker on {}_\n",
            generated_at.format(TIMESTAMP_FORMAT)
        ));
        output
    }

    fn sorted<'a>(packages: &[&'a PackageMetadata]) -> Vec<&'a PackageMetadata> {
        let mut sorted = packages.to_vec();
        sorted.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.version().cmp(b.version()))
        });
        sorted
    }

    fn pypi_url(name: &str) -> String {
        format!(
            "https://pypi.org/project/{}/",
            name.to_lowercase().replace('_', "-")
        )
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_markdown_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    /// Generate a Markdown hyperlink to the package's PyPI page
    fn package_to_pypi_link(name: &str) -> String {
        format!(
            "[{}]({})",
            Self::escape_markdown_table_cell(name),
            Self::pypi_url(name)
        )
    }

    fn license_links(licenses: &[LicenseReference]) -> String {
        if licenses.is_empty() {
            return "Unknown".to_string();
        }
        licenses
            .iter()
            .map(|l| {
                format!(
                    "[{}]({})",
                    Self::escape_markdown_table_cell(l.spdx_id()),
                    l.url()
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_header(output: &mut String, count: usize) {
        output.push_str("# Third-Party Licenses\n\n");
        output.push_str(&format!(
            "This project depends on {} open-source package{}. Their licenses are listed below.\n\n",
            count,
            if count == 1 { "" } else { "s" }
        ));
    }

    fn render_root_project(output: &mut String, root: &PackageMetadata) {
        output.push_str("## Project\n\n");
        output.push_str(&format!(
            "**{}** {} is licensed under {}.\n\n",
            root.name(),
            root.version(),
            Self::license_links(root.licenses())
        ));
    }

    fn render_summary(output: &mut String, packages: &[&PackageMetadata]) {
        output.push_str("## Summary\n\n");
        if packages.is_empty() {
            output.push_str("No packages were resolved.\n\n");
            return;
        }

        output.push_str(TABLE_HEADER);
        output.push_str(TABLE_SEPARATOR);
        for package in packages {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                Self::package_to_pypi_link(package.name()),
                Self::escape_markdown_table_cell(package.version()),
                Self::license_links(package.licenses())
            ));
        }
        output.push('\n');
    }

    fn render_details(output: &mut String, packages: &[&PackageMetadata]) {
        if packages.is_empty() {
            return;
        }
        output.push_str("## Package Details\n\n");

        for package in packages {
            output.push_str(&format!("### {} {}\n\n", package.name(), package.version()));

            if let Some(description) = package.description() {
                output.push_str(&format!("{}\n\n", description.trim()));
            }

            let mut fields = Vec::new();
            if let Some(homepage) = package.homepage() {
                fields.push(format!("- **Homepage:** <{}>", homepage));
            }
            if let Some(repository) = package.repository_url() {
                fields.push(format!("- **Repository:** <{}>", repository));
            }
            if let Some(author) = package.author() {
                fields.push(format!("- **Author:** {}", author));
            }

            if package.licenses().is_empty() {
                fields.push("- **License:** Unknown".to_string());
            }
            for license in package.licenses() {
                let kind = if license.is_verified_file() {
                    "license file"
                } else {
                    "reference page"
                };
                fields.push(format!(
                    "- **License:** [{}]({}) ({}, {})",
                    license.display_name(),
                    license.url(),
                    license.spdx_id(),
                    kind
                ));
            }

            output.push_str(&fields.join("\n"));
            output.push_str("\n\n");
        }
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributionRenderer for MarkdownReporter {
    fn render(
        &self,
        packages: &[&PackageMetadata],
        root_project: Option<&PackageMetadata>,
    ) -> Result<String> {
        self.render_document_at(packages, root_project, Utc::now())
    }
}
