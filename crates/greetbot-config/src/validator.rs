//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], for callers that refuse to start.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_vision(config, &mut result);
        Self::validate_run(config, &mut result);
        Self::validate_pacing(config, &mut result);
        Self::validate_capture(config, &mut result);

        result
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let url = &config.browser.cdp_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "browser.cdp_url",
                "cdp_url must start with http:// or https://",
            ));
        }
    }

    fn validate_vision(config: &Config, result: &mut ValidationResult) {
        let vision = &config.vision;
        if !vision.provider.is_supported() {
            result.add_error(ValidationError::new(
                "vision.provider",
                format!("Provider '{}' is not supported yet", vision.provider),
            ));
        }

        if vision.api_key.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "vision.api_key",
                "API key is not set, candidates cannot be analyzed",
            ));
        }

        if let Some(ref url) = vision.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "vision.base_url",
                    "base_url must start with http:// or https://",
                ));
            }
        }

        if vision.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "vision.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }
    }

    fn validate_run(config: &Config, result: &mut ValidationResult) {
        let run = &config.run;
        if run.candidate_limit == 0 {
            result.add_error(ValidationError::new(
                "run.candidate_limit",
                "candidate_limit must be greater than 0",
            ));
        }

        if run.daily_limit > 100 {
            result.add_warning(ValidationWarning::new(
                "run.daily_limit",
                "More than 100 greetings a day raises the risk of the account being restricted",
            ));
        }

        if run.rect_attempts == 0 {
            result.add_error(ValidationError::new(
                "run.rect_attempts",
                "rect_attempts must be at least 1",
            ));
        }

        let jd_len = run.job_description.trim().chars().count();
        if jd_len == 0 {
            result.add_warning(ValidationWarning::new(
                "run.job_description",
                "job_description is empty",
            ));
        } else if jd_len < 10 {
            result.add_warning(ValidationWarning::new(
                "run.job_description",
                "job_description is very short, match quality may suffer",
            ));
        }
    }

    fn validate_pacing(config: &Config, result: &mut ValidationResult) {
        for (name, range) in config.pacing.ranges() {
            if !range.is_valid() {
                result.add_error(ValidationError::new(
                    format!("pacing.{}", name),
                    format!("min_ms ({}) exceeds max_ms ({})", range.min_ms, range.max_ms),
                ));
            }
        }

        let every = config.pacing.break_every;
        if every.min == 0 || every.min > every.max {
            result.add_error(ValidationError::new(
                "pacing.break_every",
                "break_every needs 0 < min <= max",
            ));
        }
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;
        if capture.max_height <= 0.0 {
            result.add_error(ValidationError::new(
                "capture.max_height",
                "max_height must be positive",
            ));
        }

        if capture.fallback_viewport_width <= 0.0 || capture.fallback_viewport_height <= 0.0 {
            result.add_error(ValidationError::new(
                "capture.fallback_viewport",
                "fallback viewport dimensions must be positive",
            ));
        }

        if capture.base64_chunk_bytes == 0 || capture.base64_chunk_bytes % 3 != 0 {
            result.add_error(ValidationError::new(
                "capture.base64_chunk_bytes",
                "base64_chunk_bytes must be a positive multiple of 3",
            ));
        }

        if capture.resume_frame_marker.is_empty() {
            result.add_error(ValidationError::new(
                "capture.resume_frame_marker",
                "resume_frame_marker cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
