use anyhow::Result;
use regex::{Captures, Regex};
use std::env;
use tracing::{debug, warn};

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)\}|\$(\w+)").unwrap();
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &Captures<'_>| {
        let var_name = caps.get(1).or(caps.get(2)).unwrap().as_str();

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                // Keep the placeholder so the validator can report it
                caps.get(0).unwrap().as_str().to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!(
            "Environment variables not set (may use defaults or fail validation): {:?}",
            missing_vars
        );
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    let re = Regex::new(r"\$\{(\w+)\}|\$(\w+)").unwrap();
    re.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_braced_and_bare_placeholders() {
        env::set_var("FXMATCH_SUB_HOST", "10.0.0.5");
        env::set_var("FXMATCH_SUB_PORT", "9999");

        let content = "host: ${FXMATCH_SUB_HOST}\nport: $FXMATCH_SUB_PORT\n";
        let result = substitute_env_vars(content).unwrap();

        assert_eq!(result, "host: 10.0.0.5\nport: 9999\n");
        assert!(!has_unresolved_env_vars(&result));
    }

    #[test]
    fn test_missing_variable_keeps_placeholder() {
        env::remove_var("FXMATCH_SUB_MISSING");

        let content = "host: ${FXMATCH_SUB_MISSING}\n";
        let result = substitute_env_vars(content).unwrap();

        assert_eq!(result, content);
        assert!(has_unresolved_env_vars(&result));
    }

    #[test]
    fn test_content_without_placeholders_is_untouched() {
        let content = "service:\n  name: fxmatch\n";
        let result = substitute_env_vars(content).unwrap();

        assert_eq!(result, content);
    }
}
