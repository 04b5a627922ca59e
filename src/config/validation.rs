use super::ServerConfig;

/// Validate the final merged configuration
///
/// # Errors
/// Returns an error if:
/// - The host is empty
/// - The request timeout is zero
/// - The application version is empty
/// - Only one of the update owner/repo pair is set
pub(super) fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.host.trim().is_empty() {
        return Err("Host must not be empty".into());
    }

    if config.request_timeout_secs == 0 {
        return Err("Request timeout must be at least 1 second".into());
    }

    if config.app_version.trim().is_empty() {
        return Err("Application version must not be empty".into());
    }

    let owner_set = !config.update_owner.trim().is_empty();
    let repo_set = !config.update_repo.trim().is_empty();
    if owner_set != repo_set {
        return Err(
            "Update owner and repo must be configured together (or both left empty)".into(),
        );
    }

    Ok(())
}
