// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;
mod cli;

use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands};
use credit_limits::format::{format_currency, mask_account};
use credit_limits::{
    filter_applications, init_logging, validate, AppConfig, AppState, Application, ChangeReason,
    MockApi, StatusFilter, ValidationResult,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(seed) = cli.seed {
        config.seed_path = Some(seed);
    }

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => {
            // Logs would scribble over the alternate screen
            init_logging("off");
            run_ui_mode(&config)
        }
        Commands::List { status, search } => {
            init_logging("warn");
            run_list(&config, &status, search.as_deref().unwrap_or(""))
        }
        Commands::Validate { limit, reason } => {
            init_logging("warn");
            run_validate(limit, reason.as_deref())
        }
    }
}

fn load_state(config: &AppConfig) -> Result<AppState<MockApi>> {
    let api = MockApi::new(config.seed_applications()?)?;
    let mut state = AppState::new(api);
    state.load_applications();
    if let Some(error) = state.error() {
        return Err(anyhow!("Failed to load applications: {}", error));
    }
    Ok(state)
}

fn run_list(config: &AppConfig, status: &str, search: &str) -> Result<()> {
    let filter: StatusFilter = status.parse().map_err(|e: String| anyhow!(e))?;
    let state = load_state(config)?;
    let apps = filter_applications(state.applications(), filter, search);

    for line in list_lines(&apps, state.total_count()) {
        println!("{}", line);
    }
    Ok(())
}

/// Table of applications with masked accounts, plus a count footer
fn list_lines(apps: &[Application], total: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(apps.len() + 3);
    lines.push(format!(
        "{:<10} {:<42} {:<17} {:>14} {:>14}  {}",
        "ID", "Client", "Account", "Current", "Requested", "Status"
    ));
    for app in apps {
        lines.push(format!(
            "{:<10} {:<42} {:<17} {:>14} {:>14}  {}",
            app.id,
            app.name,
            mask_account(&app.account),
            format_currency(app.current_limit, &app.currency),
            format_currency(app.requested_limit, &app.currency),
            app.status
        ));
    }
    lines.push(String::new());
    lines.push(format!("{} of {} applications", apps.len(), total));
    lines
}

fn run_validate(limit: Option<i64>, reason: Option<&str>) -> Result<()> {
    let reason = parse_reason(reason)?;
    let result = validate(limit, reason);

    for line in verdict_lines(&result) {
        println!("{}", line);
    }

    if !result.is_valid {
        std::process::exit(2);
    }
    Ok(())
}

fn parse_reason(raw: Option<&str>) -> Result<Option<ChangeReason>> {
    raw.map(|r| r.parse::<ChangeReason>())
        .transpose()
        .map_err(|e| anyhow!(e))
}

fn verdict_lines(result: &ValidationResult) -> Vec<String> {
    let mut lines = vec![if result.is_valid { "✓ valid" } else { "✗ invalid" }.to_string()];
    lines.extend(result.messages().into_iter().map(|m| format!("  - {}", m)));
    lines.push(format!(
        "Reason required: {}",
        if result.is_reason_required { "yes" } else { "no" }
    ));
    let offered: Vec<&str> = result.available_reasons.iter().map(|r| r.label()).collect();
    lines.push(format!("Available reasons: {}", offered.join(", ")));
    lines
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let state = load_state(config)?;
    let mut app = ui::App::new(state, config.search_debounce);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin credit-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_limits::{demo_applications, ApplicationStatus};

    #[test]
    fn test_list_lines_mask_accounts() {
        let apps = filter_applications(
            &demo_applications(),
            StatusFilter::Only(ApplicationStatus::New),
            "",
        );
        let lines = list_lines(&apps, 5);

        assert!(lines[0].starts_with("ID"));
        assert_eq!(lines.len(), apps.len() + 3);
        assert!(lines[1].contains("Ivan Ivanovich Ivanov"));
        assert!(lines[1].contains("40817 **** 1234"));
        assert!(lines[1].contains("50,000 ₽"));
        assert!(!lines.iter().any(|l| l.contains("40817810500000001234")));
        assert_eq!(lines.last().unwrap(), "3 of 5 applications");
    }

    #[test]
    fn test_verdict_lines() {
        let lines = verdict_lines(&validate(Some(2_000_000), None));
        assert_eq!(lines[0], "✗ invalid");
        assert_eq!(lines[1], "  - Specify a reason for limits above 1,000,000");
        assert_eq!(lines[2], "Reason required: yes");
        assert!(lines[3].ends_with("Special risk"));

        let lines = verdict_lines(&validate(Some(150_000), None));
        assert_eq!(lines[0], "✓ valid");
        assert_eq!(lines[1], "Reason required: no");
        assert_eq!(
            lines[2],
            "Available reasons: Income increase, Good credit history, Customer request"
        );
    }

    #[test]
    fn test_parse_reason() {
        assert_eq!(parse_reason(None).unwrap(), None);
        assert_eq!(
            parse_reason(Some("special_risk")).unwrap(),
            Some(ChangeReason::SpecialRisk)
        );
        assert_eq!(
            parse_reason(Some("Customer request")).unwrap(),
            Some(ChangeReason::CustomerRequest)
        );
        assert!(parse_reason(Some("because")).is_err());
    }
}
