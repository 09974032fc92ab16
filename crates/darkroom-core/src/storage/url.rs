//! Public URL construction for stored objects.

use crate::config::StorageConfig;

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Build the public URL for a key.
///
/// With a CDN domain: `https://{cdn}/{key}`. Otherwise the direct form
/// `https://{account}.{provider}/{bucket}/{key}`; if the account id does not
/// resolve, the account label is left out.
pub fn public_url(config: &StorageConfig, key: &str) -> String {
    let key = key.trim_start_matches('/');

    if let Some(cdn) = config
        .cdn_domain
        .as_deref()
        .map(|d| d.trim().trim_end_matches('/'))
        .filter(|d| !d.is_empty())
    {
        return format!("https://{cdn}/{key}");
    }

    let provider = config.provider_domain.trim_end_matches('/');
    match config.account_id.as_deref().and_then(resolve_env_var) {
        Some(account) => format!("https://{account}.{provider}/{}/{key}", config.bucket),
        None => format!("https://{provider}/{}/{key}", config.bucket),
    }
}
