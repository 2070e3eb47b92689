//! Credential chain and interactive login.

use std::io::{self, IsTerminal};
use std::path::Path;

use dialoguer::Input;
use secrecy::SecretString;
use tracing::{info, warn};

use flowsum_config::resolve_token;
use flowsum_core::{Controller, CoreError, Credentials};

use crate::error::CliError;

const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Authenticate `controller` from the first credential source available.
///
/// A configured token that the controller rejects fails immediately; only
/// a run with no token at all falls back to the interactive prompt.
pub async fn authenticate(
    controller: &mut Controller,
    token_flag: Option<&str>,
    token_file: Option<&Path>,
    email: Option<&str>,
) -> Result<(), CliError> {
    if let Some(resolved) = resolve_token(token_flag, token_file)? {
        info!("authenticating using {}", resolved.source);
        controller
            .authenticate(&Credentials::Token(resolved.token))
            .await?;
        return Ok(());
    }

    if !io::stdin().is_terminal() {
        return Err(CliError::NoCredentials);
    }

    info!("authenticating using interactive login");
    interactive_login(controller, email).await
}

async fn interactive_login(
    controller: &mut Controller,
    default_email: Option<&str>,
) -> Result<(), CliError> {
    let mut last_failure = String::new();

    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        let (email, password) = prompt_credentials(default_email)?;
        let credentials = Credentials::Password { email, password };

        match controller.authenticate(&credentials).await {
            Ok(_) => return Ok(()),
            Err(CoreError::AuthenticationFailed { message }) => {
                warn!(attempt, "login failed: {message}");
                eprintln!("Login failed, please try again ({attempt}/{MAX_LOGIN_ATTEMPTS})");
                last_failure = message;
            }
            Err(other) => return Err(other.into()),
        }
    }

    Err(CliError::AuthFailed {
        message: format!("{MAX_LOGIN_ATTEMPTS} login attempts failed: {last_failure}"),
    })
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for email and password, validating neither is empty.
fn prompt_credentials(default_email: Option<&str>) -> Result<(String, SecretString), CliError> {
    let mut input = Input::<String>::new().with_prompt("Email");
    if let Some(email) = default_email {
        input = input.default(email.to_string());
    }
    let email = input.interact_text().map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;

    if email.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "email and password cannot be empty".into(),
        });
    }

    Ok((email.trim().to_string(), SecretString::from(password)))
}
