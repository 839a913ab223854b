use crate::error::Error;
use std::{fmt::Display, str::FromStr};

/// How much of every request and response the invoker writes to the log.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    None,
    Headers,
    Body,
    All,
}

impl LogLevel {
    pub fn logs_headers(self) -> bool {
        matches!(self, LogLevel::Headers | LogLevel::All)
    }

    pub fn logs_body(self) -> bool {
        matches!(self, LogLevel::Body | LogLevel::All)
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::All
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LogLevel::None),
            "headers" => Ok(LogLevel::Headers),
            "body" => Ok(LogLevel::Body),
            "all" => Ok(LogLevel::All),
            other => Err(Error::InvalidConfig(format!(
                "unknown log level `{}`, expected one of none, headers, body, all",
                other
            ))),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::None => "none",
            LogLevel::Headers => "headers",
            LogLevel::Body => "body",
            LogLevel::All => "all",
        };
        write!(f, "{}", label)
    }
}

/// Request configuration shared by every call of a test case.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RequestSpec {
    base_address: String,
    log_level: LogLevel,
}

impl RequestSpec {
    pub fn build<S: Into<String>>(base_address: S, log_level: LogLevel) -> Self {
        RequestSpecBuilder::new()
            .with_base_address(base_address)
            .with_log_level(log_level)
            .build()
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Joins the base address and `path` with a single `/`.
    pub fn url_for<S: AsRef<str>>(&self, path: S) -> String {
        let path = path.as_ref().trim_start_matches('/');
        let base = self.base_address.trim_end_matches('/');

        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSpecBuilder {
    base_address: Option<String>,
    log_level: Option<LogLevel>,
}

impl RequestSpecBuilder {
    pub fn new() -> Self {
        Self {
            base_address: None,
            log_level: None,
        }
    }

    pub fn with_base_address<S: Into<String>>(mut self, base_address: S) -> Self {
        self.base_address = Some(base_address.into());
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = Some(log_level);
        self
    }

    pub fn build(self) -> RequestSpec {
        RequestSpec {
            base_address: self.base_address.unwrap_or_default(),
            log_level: self.log_level.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_with_single_slash() {
        let spec = RequestSpec::build("https://reqres.in/", LogLevel::None);

        assert_eq!(spec.url_for("api/users"), "https://reqres.in/api/users");
        assert_eq!(spec.url_for("/api/users"), "https://reqres.in/api/users");
    }

    #[test]
    fn url_for_without_trailing_slash_on_base() {
        let spec = RequestSpec::build("http://127.0.0.1:8080", LogLevel::None);

        assert_eq!(spec.url_for("api/login"), "http://127.0.0.1:8080/api/login");
        assert_eq!(spec.url_for(""), "http://127.0.0.1:8080/");
    }

    #[test]
    fn builder_defaults_to_logging_everything() {
        let spec = RequestSpecBuilder::new()
            .with_base_address("https://reqres.in/")
            .build();

        assert_eq!(spec.log_level(), LogLevel::All);
        assert_eq!(spec.base_address(), "https://reqres.in/");
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("HEADERS".parse::<LogLevel>().unwrap(), LogLevel::Headers);
        assert_eq!(" body ".parse::<LogLevel>().unwrap(), LogLevel::Body);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn log_level_detail_flags() {
        assert!(!LogLevel::None.logs_headers());
        assert!(!LogLevel::None.logs_body());
        assert!(LogLevel::Headers.logs_headers() && !LogLevel::Headers.logs_body());
        assert!(LogLevel::Body.logs_body() && !LogLevel::Body.logs_headers());
        assert!(LogLevel::All.logs_headers() && LogLevel::All.logs_body());
    }
}
