//! Configuration loader with TOML parsing and environment variable overrides
//!
//! A TOML file is the primary source. Deployments without a file (scheduled
//! functions, containers) fall back to an environment-only configuration
//! built from `OPENSEARCH_URL`, `AWS_REGION` and `OUTPUT_BUCKET`.

use super::schema::{DredgeConfig, SearchConfig};
use super::secret::secret_string;
use crate::domain::errors::DredgeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DredgeConfig
/// 4. Applies environment variable overrides (DREDGE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DredgeError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use dredge::config::loader::load_config;
///
/// let config = load_config("dredge.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DredgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DredgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DredgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DredgeConfig = toml::from_str(&contents)
        .map_err(|e| DredgeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Loads the TOML file when it exists, else builds the configuration from
/// the process environment
///
/// # Errors
///
/// Returns [`DredgeError::Configuration`] if neither source yields a valid
/// configuration.
pub fn load_config_or_env(path: impl AsRef<Path>) -> Result<DredgeConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(
            path = %path.display(),
            "Configuration file not found, using environment"
        );
        config_from_env(|key| std::env::var(key).ok())
    }
}

/// Builds a configuration from environment lookups alone
///
/// `OPENSEARCH_URL` (or `DREDGE_SEARCH_ENDPOINT`) is required; a value
/// without a scheme is treated as an HTTPS host. `AWS_REGION` defaults to
/// `us-east-1` and `OUTPUT_BUCKET` sets the default upload bucket.
pub fn config_from_env<F>(lookup: F) -> Result<DredgeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = lookup("DREDGE_SEARCH_ENDPOINT")
        .or_else(|| lookup("OPENSEARCH_URL"))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            DredgeError::Configuration(
                "No configuration file and OPENSEARCH_URL is not set".to_string(),
            )
        })?;

    let mut search = SearchConfig::new(normalize_endpoint(&endpoint)?);
    if let Some(region) = lookup("AWS_REGION").filter(|v| !v.is_empty()) {
        search.region = region;
    }

    let mut config = DredgeConfig::new(search);
    config.storage.bucket = lookup("OUTPUT_BUCKET").filter(|v| !v.is_empty());

    apply_env_overrides(&mut config, &lookup)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &DredgeConfig) -> Result<()> {
    config.validate().map_err(|e| {
        DredgeError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Adds `https://` to a bare host name
///
/// A value that is only a scheme (`https://`) names no host and is rejected.
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) if scheme == "http" || scheme == "https" => (scheme, rest),
        _ => ("https", trimmed),
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() || rest.starts_with('/') {
        return Err(DredgeError::Configuration(format!(
            "Search endpoint '{trimmed}' has no host"
        )));
    }
    Ok(format!("{scheme}://{rest}"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DredgeError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(processed.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(DredgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies overrides following the pattern `DREDGE_<SECTION>_<KEY>`
///
/// For example: `DREDGE_SEARCH_ENDPOINT`, `DREDGE_EXPORT_BATCH_SIZE`.
/// Unparseable numeric or boolean values are ignored; an unknown enum value
/// is a configuration error.
fn apply_env_overrides<F>(config: &mut DredgeConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |key: &str, e: String| DredgeError::Configuration(format!("{key}: {e}"));

    // Application overrides
    if let Some(val) = lookup("DREDGE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = lookup("DREDGE_APPLICATION_ENVIRONMENT") {
        config.application.environment = val
            .parse()
            .map_err(|e| invalid("DREDGE_APPLICATION_ENVIRONMENT", e))?;
    }

    // Search overrides
    if let Some(val) = lookup("DREDGE_SEARCH_ENDPOINT") {
        config.search.endpoint = normalize_endpoint(&val)?;
    }
    if let Some(val) = lookup("DREDGE_SEARCH_REGION") {
        config.search.region = val;
    }
    if let Some(val) = lookup("DREDGE_SEARCH_AUTH_TYPE") {
        config.search.auth_type = val
            .parse()
            .map_err(|e| invalid("DREDGE_SEARCH_AUTH_TYPE", e))?;
    }
    if let Some(val) = lookup("DREDGE_SEARCH_SERVICE") {
        config.search.service = Some(val);
    }
    if let Some(val) = lookup("DREDGE_SEARCH_USERNAME") {
        config.search.username = Some(val);
    }
    if let Some(val) = lookup("DREDGE_SEARCH_PASSWORD") {
        config.search.password = Some(secret_string(val));
    }
    if let Some(val) = lookup("DREDGE_SEARCH_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.search.timeout_seconds = timeout;
        }
    }
    if let Some(val) = lookup("DREDGE_SEARCH_TLS_VERIFY") {
        config.search.tls_verify = val.parse().unwrap_or(true);
    }
    if let Some(val) = lookup("DREDGE_SEARCH_RETRY_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.search.retry.max_retries = retries;
        }
    }

    // Export overrides
    if let Some(val) = lookup("DREDGE_EXPORT_BATCH_SIZE") {
        if let Ok(size) = val.parse() {
            config.export.batch_size = size;
        }
    }
    if let Some(val) = lookup("DREDGE_EXPORT_SORT_FIELD") {
        config.export.sort_field = val;
    }
    if let Some(val) = lookup("DREDGE_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("DREDGE_EXPORT_ENABLE_CHECKPOINTING") {
        config.export.enable_checkpointing = val.parse().unwrap_or(true);
    }
    if let Some(val) = lookup("DREDGE_EXPORT_VERIFY_OUTPUT") {
        config.export.verify_output = val.parse().unwrap_or(false);
    }

    // Storage overrides
    if let Some(val) = lookup("DREDGE_STORAGE_BACKEND") {
        config.storage.backend = val
            .parse()
            .map_err(|e| invalid("DREDGE_STORAGE_BACKEND", e))?;
    }
    if let Some(val) = lookup("DREDGE_STORAGE_BUCKET") {
        config.storage.bucket = Some(val);
    }
    if let Some(val) = lookup("DREDGE_STORAGE_PREFIX") {
        config.storage.prefix = val;
    }
    if let Some(val) = lookup("DREDGE_STORAGE_REGION") {
        config.storage.region = Some(val);
    }
    if let Some(val) = lookup("DREDGE_STORAGE_ENDPOINT") {
        config.storage.endpoint = Some(val);
    }
    if let Some(val) = lookup("DREDGE_STORAGE_LOCAL_ROOT") {
        config.storage.local_root = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("DREDGE_STORAGE_KEEP_LOCAL") {
        config.storage.keep_local = val.parse().unwrap_or(false);
    }

    // Logging overrides
    if let Some(val) = lookup("DREDGE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = lookup("DREDGE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("DREDGE_LOGGING_JSON_CONSOLE") {
        config.logging.json_console = val.parse().unwrap_or(false);
    }

    Ok(())
}
