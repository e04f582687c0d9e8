use license_tracker::adapters::outbound::cache::{SqliteLicenseCache, DEFAULT_TTL_DAYS};
use license_tracker::adapters::outbound::console::StderrProgressReporter;
use license_tracker::adapters::outbound::formatters::MarkdownReporter;
use license_tracker::adapters::outbound::scanners::scanner_for;
use license_tracker::application::dto::{ResolutionRequest, ResolutionResponse};
use license_tracker::application::factories::{
    PresenterFactory, PresenterType, ResolverFactory, ResolverOptions,
};
use license_tracker::application::use_cases::{CheckComplianceUseCase, ResolveDependenciesUseCase};
use license_tracker::cli::{CacheAction, CheckArgs, Cli, Command, GenArgs, ResolveArgs, DEFAULT_OUTPUT};
use license_tracker::config::{discover_config, load_config_from_path, ConfigFile};
use license_tracker::license_resolution::policies::{CompliancePolicy, ComplianceReport};
use license_tracker::ports::outbound::AttributionRenderer;
use license_tracker::shared::error::{ExitCode, LicenseTrackerError};
use license_tracker::shared::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "license_tracker=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Gen(args) => generate(args).await,
        Command::Check(args) => check(args).await,
        Command::Cache {
            action,
            cache_path,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            manage_cache(action, cache_path.or(config.cache_path))
        }
    }
}

/// Explicit config must load; a discovered one is optional
fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    let config = match explicit {
        Some(path) => Some(load_config_from_path(path)?),
        None => discover_config(&std::env::current_dir()?)?,
    };
    Ok(config.unwrap_or_default())
}

async fn generate(args: GenArgs) -> Result<ExitCode> {
    let config = load_config(args.resolve.config.as_deref())?;
    if args.include_root {
        tracing::warn!("--include-root is reserved and currently has no effect");
    }
    let reporter = match &args.template {
        Some(path) => MarkdownReporter::with_template_file(path)?,
        None => MarkdownReporter::new(),
    };

    let response = resolve_dependencies(&args.resolve, &config).await?;

    let output = args
        .output
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let document = reporter.render(&response.unique_metadata(), None)?;

    let presenter_type = PresenterType::from_output(&output);
    PresenterFactory::create(presenter_type.clone()).present(&document)?;

    if let PresenterType::File(path) = presenter_type {
        eprintln!("✅ Output complete: {}", path.display());
    }
    Ok(ExitCode::Success)
}

async fn check(args: CheckArgs) -> Result<ExitCode> {
    let config = load_config(args.resolve.config.as_deref())?;
    let policy = build_policy(&args, &config)?;

    let response = resolve_dependencies(&args.resolve, &config).await?;
    let report = CheckComplianceUseCase::new(policy, StderrProgressReporter::new()).execute(&response);

    print_compliance_report(&report);
    if report.is_compliant() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::ViolationsFound)
    }
}

/// Command-line lists win over config lists
fn build_policy(args: &CheckArgs, config: &ConfigFile) -> Result<CompliancePolicy> {
    let policy = match (&args.forbidden, &args.allowed) {
        (Some(list), _) => CompliancePolicy::forbidden(CompliancePolicy::parse_list(list)),
        (None, Some(list)) => CompliancePolicy::allowed(CompliancePolicy::parse_list(list)),
        (None, None) => match (&config.forbidden_licenses, &config.allowed_licenses) {
            (Some(list), _) => CompliancePolicy::forbidden(list.iter().map(|l| l.trim())),
            (None, Some(list)) => CompliancePolicy::allowed(list.iter().map(|l| l.trim())),
            (None, None) => {
                return Err(LicenseTrackerError::Validation {
                    message: "no license policy given; pass --forbidden or --allowed, or set \
                              forbidden_licenses / allowed_licenses in the config file"
                        .to_string(),
                }
                .into())
            }
        },
    };

    if let CompliancePolicy::Forbidden(set) | CompliancePolicy::Allowed(set) = &policy {
        if set.is_empty() {
            return Err(LicenseTrackerError::Validation {
                message: "the license list is empty".to_string(),
            }
            .into());
        }
    }
    Ok(policy)
}

async fn resolve_dependencies(args: &ResolveArgs, config: &ConfigFile) -> Result<ResolutionResponse> {
    validate_scan_path(&args.scan)?;
    let scanner = scanner_for(&args.scan)?;

    let cache = if args.no_cache {
        None
    } else {
        Some(open_cache(args.cache_path.clone().or_else(|| config.cache_path.clone()), config)?)
    };

    let resolver = ResolverFactory::create(ResolverOptions {
        github_token: args.github_token.clone(),
        request_timeout: config
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(ResolverOptions::default().request_timeout),
        max_concurrency: args
            .concurrency
            .map(usize::from)
            .or(config.max_concurrency)
            .unwrap_or(ResolverOptions::default().max_concurrency),
    });

    let use_case =
        ResolveDependenciesUseCase::new(scanner, cache, resolver, StderrProgressReporter::new());
    use_case
        .execute(ResolutionRequest::new(args.scan.clone()))
        .await
}

fn validate_scan_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(LicenseTrackerError::LockfileNotFound {
            path: path.to_path_buf(),
            suggestion: "Pass the path of a poetry.lock, Pipfile.lock or requirements.txt file with --scan"
                .to_string(),
        }
        .into());
    }
    Ok(())
}

fn open_cache(path: Option<PathBuf>, config: &ConfigFile) -> Result<SqliteLicenseCache> {
    let path = path.unwrap_or_else(SqliteLicenseCache::default_path);
    SqliteLicenseCache::open(path, config.cache_ttl_days.unwrap_or(DEFAULT_TTL_DAYS))
}

fn manage_cache(action: CacheAction, path: Option<PathBuf>) -> Result<ExitCode> {
    let cache = open_cache(path, &ConfigFile::default())?;

    match action {
        CacheAction::Show => {
            let info = cache.info()?;
            println!("Cache location: {}", info.path.display());
            println!("Entries: {}", info.count);
            println!("Size: {:.1} KB", info.size_bytes as f64 / 1024.0);
        }
        CacheAction::Clear { package, version } => {
            let removed = cache.clear(package.as_deref(), version.as_deref())?;
            let target = match (&package, &version) {
                (Some(p), Some(v)) => format!("{}=={}", p, v),
                (Some(p), None) => format!("all versions of {}", p),
                _ => "all packages".to_string(),
            };
            println!("🧹 Removed {} cache entr{} ({})", removed, plural_y(removed), target);
        }
        CacheAction::Purge => {
            let removed = cache.purge_expired()?;
            println!("🧹 Purged {} expired cache entr{}", removed, plural_y(removed));
        }
    }
    Ok(ExitCode::Success)
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn print_compliance_report(report: &ComplianceReport) {
    println!();
    if report.is_compliant() {
        println!(
            "{} All {} package(s) comply with the license policy",
            "✔".green(),
            report.checked
        );
    } else {
        println!(
            "{} {} license violation(s) found:",
            "✘".red(),
            report.violations.len().to_string().red().bold()
        );
        for violation in &report.violations {
            println!(
                "   - {} {}: {}",
                violation.package.bold(),
                violation.version,
                violation.license.red()
            );
        }
    }

    if !report.unknown.is_empty() {
        println!();
        println!(
            "{} {} package(s) with unknown license:",
            "?".yellow(),
            report.unknown.len()
        );
        for name in &report.unknown {
            println!("   - {}", name.yellow());
        }
    }
}
