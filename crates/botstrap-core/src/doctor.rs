//! Environment checks for bot development: JavaScript runtimes, project
//! configuration files and registry connectivity.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use semver::Version;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::catalog::Runtime;

pub const DEFAULT_REGISTRY_URL: &str = "https://jsr.io";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    /// A failed required check fails the whole run.
    pub required: bool,
    pub status: CheckStatus,
    pub message: String,
}

impl DoctorCheck {
    fn new(
        name: impl Into<String>,
        required: bool,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            required,
            status,
            message: message.into(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub runtime: Vec<DoctorCheck>,
    pub project: Vec<DoctorCheck>,
    pub network: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn checks(&self) -> impl Iterator<Item = &DoctorCheck> {
        self.runtime
            .iter()
            .chain(self.project.iter())
            .chain(self.network.iter())
    }

    pub fn failed_required(&self) -> Vec<&DoctorCheck> {
        self.checks()
            .filter(|check| check.required && !check.passed())
            .collect()
    }

    pub fn failed_optional(&self) -> Vec<&DoctorCheck> {
        self.checks()
            .filter(|check| !check.required && !check.passed())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct DoctorOptions {
    /// Directory inspected for `deno.json`, `package.json` and `deno.lock`.
    pub project_dir: PathBuf,
    pub registry_url: String,
    pub network_timeout: Duration,
}

impl Default for DoctorOptions {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            network_timeout: Duration::from_secs(5),
        }
    }
}

pub async fn run_doctor(options: &DoctorOptions) -> DoctorReport {
    let mut report = DoctorReport::default();

    for runtime in Runtime::ALL {
        let output = probe_version(runtime.as_str()).await;
        report
            .runtime
            .push(evaluate_runtime(runtime, output.as_deref()));
    }
    let aggregate = aggregate_runtime_check(&report.runtime);
    report.runtime.push(aggregate);

    report.project = check_project_files(&options.project_dir).await;
    if let Some(check) = check_import_compatibility(&options.project_dir).await {
        report.project.push(check);
    }

    report
        .network
        .push(check_registry(&options.registry_url, options.network_timeout).await);

    report
}

/// Minimum supported version of each runtime, with its display form.
pub fn minimum_version(runtime: Runtime) -> (Version, &'static str) {
    match runtime {
        Runtime::Deno => (Version::new(1, 46, 0), "1.46"),
        Runtime::Node => (Version::new(18, 0, 0), "18"),
        Runtime::Bun => (Version::new(1, 1, 0), "1.1"),
    }
}

fn display_name(runtime: Runtime) -> &'static str {
    match runtime {
        Runtime::Deno => "Deno",
        Runtime::Node => "Node",
        Runtime::Bun => "Bun",
    }
}

fn check_name(runtime: Runtime) -> String {
    format!("{} Runtime", display_name(runtime))
}

/// Stdout of `<command> --version`, or `None` when it cannot be run.
async fn probe_version(command: &str) -> Option<String> {
    let mut cmd = Command::new(command);
    cmd.arg("--version").kill_on_drop(true);

    match tokio::time::timeout(PROBE_TIMEOUT, cmd.output()).await {
        Ok(Ok(out)) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
            (!stdout.is_empty()).then_some(stdout)
        }
        Ok(Ok(out)) => {
            debug!(command, status = %out.status, "version probe exited unsuccessfully");
            None
        }
        Ok(Err(e)) => {
            debug!(command, error = %e, "version probe failed to start");
            None
        }
        Err(_) => {
            debug!(command, "version probe timed out");
            None
        }
    }
}

/// Extract the first version-looking token from `--version` output.
///
/// Handles `v20.11.1`, `1.1.8` and `deno 1.46.3 (stable, ...)`. Missing minor
/// or patch components are treated as zero.
pub fn parse_runtime_version(output: &str) -> Option<Version> {
    output.split_whitespace().find_map(|token| {
        let token = token.strip_prefix('v').unwrap_or(token);
        if !token.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        if let Ok(version) = Version::parse(token) {
            return Some(version);
        }
        let mut parts = token.split('.').map(|part| part.parse::<u64>());
        let major = parts.next()?.ok()?;
        let minor = parts.next().unwrap_or(Ok(0)).ok()?;
        let patch = parts.next().unwrap_or(Ok(0)).ok()?;
        Some(Version::new(major, minor, patch))
    })
}

pub fn evaluate_runtime(runtime: Runtime, version_output: Option<&str>) -> DoctorCheck {
    let name = check_name(runtime);
    let label = display_name(runtime);
    let (minimum, minimum_label) = minimum_version(runtime);

    let Some(output) = version_output else {
        return DoctorCheck::new(name, false, CheckStatus::Warn, format!("{label} not available"));
    };
    let Some(version) = parse_runtime_version(output) else {
        return DoctorCheck::new(
            name,
            false,
            CheckStatus::Warn,
            format!("Could not determine {label} version from '{output}'"),
        );
    };

    if version >= minimum {
        DoctorCheck::new(
            name,
            false,
            CheckStatus::Pass,
            format!("{label} {version} (>={minimum_label})"),
        )
    } else {
        DoctorCheck::new(
            name,
            false,
            CheckStatus::Fail,
            format!("{label} {version} (<{minimum_label})\n   Please upgrade to {label} >={minimum_label}"),
        )
    }
}

/// Required check that at least one runtime is usable.
pub fn aggregate_runtime_check(runtime_checks: &[DoctorCheck]) -> DoctorCheck {
    let usable: Vec<&str> = runtime_checks
        .iter()
        .filter(|check| check.passed())
        .map(|check| check.name.trim_end_matches(" Runtime"))
        .collect();

    if usable.is_empty() {
        let minimums = Runtime::ALL
            .iter()
            .map(|runtime| format!("{} >={}", display_name(*runtime), minimum_version(*runtime).1))
            .collect::<Vec<_>>()
            .join(", ");
        DoctorCheck::new(
            "JavaScript runtime",
            true,
            CheckStatus::Fail,
            format!("No supported JavaScript runtime found\n   Install one of: {minimums}"),
        )
    } else {
        DoctorCheck::new(
            "JavaScript runtime",
            true,
            CheckStatus::Pass,
            format!("Usable runtimes: {}", usable.join(", ")),
        )
    }
}

async fn check_project_files(dir: &Path) -> Vec<DoctorCheck> {
    let mut checks = Vec::new();
    for (name, file) in [("Deno Config", "deno.json"), ("Node Config", "package.json")] {
        let found = tokio::fs::try_exists(dir.join(file)).await.unwrap_or(false);
        checks.push(if found {
            DoctorCheck::new(name, false, CheckStatus::Pass, format!("{file} found"))
        } else {
            DoctorCheck::new(name, false, CheckStatus::Warn, format!("{file} not found"))
        });
    }
    checks
}

/// Compare `deno.json` imports against `deno.lock`. Skipped unless both exist.
async fn check_import_compatibility(dir: &Path) -> Option<DoctorCheck> {
    let config = tokio::fs::read_to_string(dir.join("deno.json")).await.ok()?;
    let lock = tokio::fs::read_to_string(dir.join("deno.lock")).await.ok()?;
    Some(evaluate_import_compatibility(&config, &lock))
}

/// Every `npm:`/`jsr:` import in `deno.json` needs an entry in the lockfile's
/// `npm`/`jsr` map, read from the top level or under `packages`.
pub fn evaluate_import_compatibility(deno_json: &str, deno_lock: &str) -> DoctorCheck {
    const NAME: &str = "Import Compatibility";

    let (config, lock) = match (
        serde_json::from_str::<Value>(deno_json),
        serde_json::from_str::<Value>(deno_lock),
    ) {
        (Ok(config), Ok(lock)) => (config, lock),
        _ => {
            return DoctorCheck::new(
                NAME,
                false,
                CheckStatus::Warn,
                "Could not parse deno.json or deno.lock",
            )
        }
    };

    let specifiers: Vec<(&str, &str)> = config
        .get("imports")
        .and_then(Value::as_object)
        .map(|imports| {
            imports
                .values()
                .filter_map(Value::as_str)
                .filter_map(|target| {
                    ["npm", "jsr"].into_iter().find_map(|registry| {
                        target
                            .strip_prefix(registry)
                            .and_then(|rest| rest.strip_prefix(':'))
                            .map(|package| (registry, package))
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if specifiers.is_empty() {
        return DoctorCheck::new(
            NAME,
            false,
            CheckStatus::Warn,
            "No npm: or jsr: imports found in deno.json",
        );
    }

    let missing: Vec<String> = specifiers
        .iter()
        .filter(|(registry, package)| !lock_has_package(&lock, registry, package))
        .map(|(registry, package)| format!("{registry}:{package}"))
        .collect();

    if missing.is_empty() {
        DoctorCheck::new(
            NAME,
            false,
            CheckStatus::Pass,
            format!("{} imports match deno.lock", specifiers.len()),
        )
    } else {
        DoctorCheck::new(
            NAME,
            false,
            CheckStatus::Warn,
            format!(
                "Missing from deno.lock: {}\n   Run `deno install` to refresh the lockfile",
                missing.join(", ")
            ),
        )
    }
}

fn lock_has_package(lock: &Value, registry: &str, package: &str) -> bool {
    let keys: BTreeSet<&str> = [lock.get(registry), lock.pointer(&format!("/packages/{registry}"))]
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .flat_map(|entries| entries.keys().map(String::as_str))
        .collect();

    let package = package.trim_start_matches('/');
    keys.iter().any(|key| {
        *key == package
            || key
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with('@') || rest.starts_with('_'))
    })
}

async fn check_registry(url: &str, timeout: Duration) -> DoctorCheck {
    const NAME: &str = "JSR Connectivity";

    let client = match reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("botstrap/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            return DoctorCheck::new(
                NAME,
                true,
                CheckStatus::Fail,
                format!("Could not create HTTP client: {e}"),
            )
        }
    };

    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => {
            DoctorCheck::new(NAME, true, CheckStatus::Pass, format!("{url} accessible"))
        }
        Ok(response) => DoctorCheck::new(
            NAME,
            true,
            CheckStatus::Fail,
            format!("{url} returned HTTP {}", response.status()),
        ),
        Err(e) => {
            debug!(url, error = %e, "registry request failed");
            DoctorCheck::new(
                NAME,
                true,
                CheckStatus::Fail,
                format!("{url} not accessible\n   Check your internet connection"),
            )
        }
    }
}
