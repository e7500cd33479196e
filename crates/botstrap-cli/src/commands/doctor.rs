use std::process::ExitCode;

use console::style;
use tracing::{error, info};

use botstrap_core::doctor::{run_doctor, CheckStatus, DoctorCheck, DoctorOptions};
use botstrap_core::error::Result;

pub async fn run() -> Result<ExitCode> {
    info!("Performing environment checks...");
    let report = run_doctor(&DoctorOptions::default()).await;

    print_section("Runtime Environment:", &report.runtime);
    println!();
    print_section("Project Configuration:", &report.project);
    println!();
    print_section("Network & Compatibility:", &report.network);

    let failed_required = report.failed_required();
    let failed_optional = report.failed_optional();

    println!("\n{}", style("Summary:").bold());
    if failed_required.is_empty() {
        println!("   {} All critical checks passed", style("✓").green().bold());
    } else {
        println!(
            "   {} {} critical issue(s) found",
            style("✗").red().bold(),
            failed_required.len()
        );
    }
    if !failed_optional.is_empty() {
        println!(
            "   {} {} optional warning(s)",
            style("⚠").yellow(),
            failed_optional.len()
        );
    }

    if failed_required.is_empty() {
        info!("Environment check completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Environment check failed");
        Ok(ExitCode::FAILURE)
    }
}

fn print_section(title: &str, checks: &[DoctorCheck]) {
    println!("{}", style(title).bold());
    for check in checks {
        let symbol = match check.status {
            CheckStatus::Pass => style("✓").green(),
            CheckStatus::Warn => style("-").yellow(),
            CheckStatus::Fail => style("✗").red(),
        };
        println!("   {symbol} {}", check.message);
    }
}
