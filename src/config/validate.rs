//! configuration validation stuff
use {
    crate::{config::options::*, validator},
    color_eyre::Result,
    url::Url,
};

/// trait for validating config structs
pub trait Validate {
    /// validate the config
    ///
    /// # Errors
    ///
    /// returns every problem found, one message per field
    fn validate(&self) -> Result<(), Vec<String>>;

    /// check if the config is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// checks that a source url is either absolute or rooted at the base url
fn is_source_url(v: &str) -> bool {
    v.starts_with('/') || Url::parse(v).is_ok()
}

impl Validate for SourcesCfg {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors: Vec<String> = Vec::new();

        if let Some(ref v) = self.base_url
            && Url::parse(v).is_err()
        {
            errors.push("base_url: must be an absolute url".to_string());
        }

        if let Some(ref v) = self.manifest_url
            && !is_source_url(v)
        {
            errors.push("manifest_url: must be an absolute url or start with '/'".to_string());
        }

        if let Some(ref v) = self.data_url
            && !is_source_url(v)
        {
            errors.push("data_url: must be an absolute url or start with '/'".to_string());
        }

        if let Some(ref extra) = self.extra {
            for (i, source) in extra.iter().enumerate() {
                if source.url.trim().is_empty() {
                    errors.push(format!("extra[{i}].url: must not be empty"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

validator! { CompletionCfg,
    max_results => |v: &usize| *v >= 1 && *v <= 100,
        "must be between 1 and 100";
    min_token_len => |v: &usize| *v >= 1,
        "must be at least 1";
    blur_grace_ms => |v: &u64| *v <= 10_000,
        "must be at most 10000";
    popup_offset => |v: &f32| v.is_finite(),
        "must be a finite number";
}

validator! { HttpCfg,
    user_agent => |v: &String| !v.trim().is_empty(),
        "must not be empty";
    timeout_secs => |v: &u64| *v > 0,
        "must be greater than 0";
    connect_timeout_secs => |v: &u64| *v > 0,
        "must be greater than 0";
}

/// valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

validator! { LoggingConfig,
    level => |v: &String| VALID_LOG_LEVELS.contains(&v.to_lowercase().as_str()),
        "must be one of: trace, debug, info, warn, error, off";
}

impl Validate for TagcompleteCfg {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors: Vec<String> = Vec::new();

        macro_rules! validate_nested {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(ref nested) = self.$field
                        && let Err(nested_errors) = nested.validate()
                    {
                        for err in nested_errors {
                            errors.push(format!("{}.{}", stringify!($field), err));
                        }
                    }
                )*
            };
        }

        validate_nested!(sources, completion, http, logging);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// format validation errors for display
pub fn format_validation_errors(errors: &[String]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, err) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, err));
    }
    output
}
