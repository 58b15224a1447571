use console::style;
use ifn_core::error::{ErrorCategory, IfnError};
use std::fmt;

/// Error with context and suggested remedies
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }

    /// Machine-readable form for `--json`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "message": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// No token or email to sign in with
pub fn not_signed_in() -> CliError {
    CliError::new("Not signed in")
        .with_context("The console needs an access token and the reviewer email to sign in.")
        .with_suggestion("Pass them as flags: ifn --token <TOKEN> --email <EMAIL> <command>")
        .with_suggestion("Or export IFN_ACCESS_TOKEN and IFN_EMAIL")
        .with_suggestion("Or try the console offline: ifn --backend memory <command>")
        .with_help("Run: ifn config")
}

/// The service refused the token
pub fn session_expired() -> CliError {
    CliError::new("Session expired")
        .with_context("The service rejected the access token. Nothing was changed.")
        .with_suggestion("Sign in again with the identity provider to get a new token")
        .with_suggestion("Then pass it with --token or IFN_ACCESS_TOKEN")
        .with_help("Run: ifn whoami")
}

pub fn account_suspended(email: &str) -> CliError {
    CliError::new("Account suspended")
        .with_context(format!("The account {} is suspended.", email))
        .with_suggestion("Contact an administrator to reactivate it")
}

pub fn forbidden(role: &str) -> CliError {
    CliError::new("Not allowed to review")
        .with_context(format!("Role {} cannot use the review console. AdminPro is required.", role))
        .with_suggestion("Sign in with an AdminPro account")
}

/// The service could not be reached
pub fn service_unavailable(error: &str) -> CliError {
    CliError::new("Cannot reach the conglomerado service")
        .with_context(format!("Error: {}", error))
        .with_suggestion("Check that the service is running")
        .with_suggestion("Check api_url and auth_url: ifn config")
        .with_help("Run: ifn config")
}

/// The service answered with an error
pub fn remote_failure(message: &str) -> CliError {
    CliError::new("The service refused the operation")
        .with_context(format!("{}\n\nLocal state was left unchanged.", message))
        .with_suggestion("Reload and try again: ifn list")
}

pub fn unit_not_found(code: &str) -> CliError {
    CliError::new(format!("Conglomerado not found: {}", code))
        .with_suggestion("List available codes: ifn list")
        .with_suggestion("Search by part of the code: ifn list --search <TEXT>")
}

pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check ifn.toml for syntax errors")
        .with_suggestion("Or check the IFN_* environment variables")
        .with_help("Run: ifn config")
}

/// Map a domain error to its presentation
pub fn from_ifn(error: &IfnError) -> CliError {
    match error {
        IfnError::MissingSession => not_signed_in(),
        IfnError::AuthExpired => session_expired(),
        IfnError::AccountSuspended { email } => account_suspended(email),
        IfnError::Forbidden { role } => forbidden(role),
        IfnError::Transport(reason) => service_unavailable(reason),
        IfnError::Remote { message, .. } => remote_failure(message),
        IfnError::UnitNotFound { id } => unit_not_found(id),
        IfnError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        IfnError::ConfigMissing { key } => invalid_config(key, "value is missing"),
        other => match other.category() {
            ErrorCategory::Validation => CliError::new(other.to_string())
                .with_suggestion("Correct the input and run the command again"),
            ErrorCategory::Precondition => CliError::new(other.to_string())
                .with_suggestion("Only pending conglomerados can be approved or rejected"),
            _ => CliError::new(other.to_string()),
        },
    }
}

/// Convert anyhow::Error to CliError, looking through context layers
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return CliError {
            message: cli_error.message.clone(),
            context: cli_error.context.clone(),
            suggestions: cli_error.suggestions.clone(),
            help_command: cli_error.help_command.clone(),
        };
    }

    if let Some(ifn_error) = error.chain().find_map(|e| e.downcast_ref::<IfnError>()) {
        let presented = from_ifn(ifn_error);
        let outer = error.to_string();
        if outer != ifn_error.to_string() && presented.context.is_none() {
            return presented.with_context(outer);
        }
        return presented;
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use ifn_core::error::ValidationError;

    #[test]
    fn test_auth_and_remote_failures_have_distinct_remedies() {
        let expired = from_ifn(&IfnError::AuthExpired);
        let remote = from_ifn(&IfnError::Remote { status: Some(500), message: "boom".into() });

        assert_eq!(expired.message, "Session expired");
        assert!(expired.suggestions[0].contains("Sign in again"));
        assert_eq!(remote.message, "The service refused the operation");
        assert!(remote.context.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn test_validation_message_is_kept() {
        let error = from_ifn(&IfnError::Validation(ValidationError::EmptyReason));
        assert_eq!(error.message, "A rejection reason is required");
    }

    #[test]
    fn test_domain_error_found_through_context() {
        let result: anyhow::Result<()> =
            Err(IfnError::MissingSession).context("Failed to load conglomerados");
        let error = from_anyhow(result.unwrap_err());
        assert_eq!(error.message, "Not signed in");
    }

    #[test]
    fn test_cli_error_passes_through() {
        let error = from_anyhow(anyhow::Error::new(unit_not_found("C-404")));
        assert_eq!(error.message, "Conglomerado not found: C-404");
        assert_eq!(error.suggestions.len(), 2);
    }
}
