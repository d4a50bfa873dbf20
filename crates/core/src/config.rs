use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CONCURRENT_SEGMENTS: usize = 4;

/// Sampling parameters forwarded verbatim with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub params: GenerationParams,
    /// Deadline applied to each generation call on its own.
    pub call_timeout: Duration,
    /// Upper bound on segments analyzed at once. Each segment issues three calls.
    pub max_concurrent_segments: usize,
}

impl AnalyzerConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            params: GenerationParams::new(model),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_concurrent_segments: DEFAULT_MAX_CONCURRENT_SEGMENTS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = max_tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.params.top_p = top_p;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_segments(mut self, limit: usize) -> Self {
        self.max_concurrent_segments = limit;
        self
    }

    /// Check ranges and return the finished configuration.
    pub fn build(self) -> Result<Self, ConfigError> {
        if self.params.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "model",
                reason: "must not be empty".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.params.temperature) {
            return Err(ConfigError::Invalid {
                field: "temperature",
                reason: format!("{} is outside 0.0..=2.0", self.params.temperature),
            });
        }
        if !(0.0..=1.0).contains(&self.params.top_p) || self.params.top_p == 0.0 {
            return Err(ConfigError::Invalid {
                field: "top_p",
                reason: format!("{} is outside (0.0, 1.0]", self.params.top_p),
            });
        }
        if self.params.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tokens",
                reason: "must be positive".to_string(),
            });
        }
        if self.call_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "call_timeout",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_concurrent_segments == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}
