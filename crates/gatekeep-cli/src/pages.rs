//! Terminal pages: login, registration and the protected dashboard.

use std::io::{self, Write};

use anyhow::Result;
use gatekeep_core::forms::{Alert, FormOutcome, RegisterForm};
use gatekeep_core::guard::{decide, is_authenticated_guard, routes, GuardDecision};
use gatekeep_core::{Navigator, SessionManager, SessionState};
use tracing::info;

use crate::router::CliRouter;

/// Attempts at filling in a valid registration form before giving up
const MAX_FORM_ATTEMPTS: usize = 3;

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) if !value.is_empty() => print!("{} [{}]: ", label, value),
        _ => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

fn prompt_password() -> Result<String> {
    Ok(rpassword::prompt_password("Password: ")?)
}

pub fn show_alert(alert: &Alert) {
    eprintln!("\n[{}] {}\n", alert.title, alert.message);
}

pub fn print_status(state: &SessionState) {
    match state {
        SessionState::Authenticated { user, since } => println!(
            "Authenticated as {} <{}> since {}",
            user.display_name(),
            user.email,
            since.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        other => println!("Status: {}", other.status()),
    }
}

pub async fn login_page(session: &SessionManager, router: &CliRouter, email: Option<&str>) -> Result<()> {
    println!("\n=== Login ===\n");

    let email = prompt("Email", email)?;
    let password = prompt_password()?;

    println!("\nAuthenticating...");

    match session.login(&email, &password).await {
        Ok(_) => {
            info!("Login successful");
            router.navigate_by_url(routes::DASHBOARD);
        }
        Err(e) => show_alert(&Alert {
            title: "Error".to_string(),
            message: e.message(),
        }),
    }
    Ok(())
}

pub async fn register_page(session: &SessionManager, router: &CliRouter) -> Result<()> {
    println!("\n=== Create account ===\n");

    let mut form = RegisterForm::default();
    for _ in 0..MAX_FORM_ATTEMPTS {
        form.name = prompt("Name", Some(form.name.as_str()))?;
        form.email = prompt("Email", Some(form.email.as_str()))?;
        form.password = prompt_password()?;

        match form.submit(session, router).await {
            FormOutcome::Invalid(errors) => {
                for error in &errors {
                    eprintln!("  - {}", error);
                }
                eprintln!();
            }
            FormOutcome::Submitted { logged_in } => {
                if !logged_in {
                    eprintln!("Account created, but signing in failed.");
                }
                return Ok(());
            }
            FormOutcome::Alert(alert) => {
                show_alert(&alert);
                return Ok(());
            }
        }
    }

    eprintln!("Too many invalid attempts.");
    Ok(())
}

pub async fn dashboard_page(session: &SessionManager, router: &CliRouter) -> Result<()> {
    if decide(session.status()) == GuardDecision::Wait {
        println!("Checking session...");
        session.wait_until_checked().await;
    }

    if !is_authenticated_guard(session, router) {
        return Ok(());
    }

    println!("\n=== Dashboard ===\n");
    print_status(&session.state());
    if let Some(user) = session.current_user() {
        if !user.id.is_empty() {
            println!("User id: {}", user.id);
        }
        for (key, value) in &user.extra {
            println!("{}: {}", key, value);
        }
    }
    Ok(())
}
