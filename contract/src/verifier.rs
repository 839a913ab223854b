use crate::{error::Error, field_path::FieldPath, response::ContractResponse};
use serde_json::Value;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    StatusCode,
    ContentType,
    FieldEquals,
    CollectionContains,
    FieldPresent,
    FieldNotEmpty,
    MalformedBody,
}

impl Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Check::StatusCode => "status code",
            Check::ContentType => "content type",
            Check::FieldEquals => "field value",
            Check::CollectionContains => "collection membership",
            Check::FieldPresent => "field presence",
            Check::FieldNotEmpty => "non-empty field",
            Check::MalformedBody => "body parsing",
        };
        write!(f, "{}", label)
    }
}

/// A check that didn't hold. Terminal for the test case that ran it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationFailure {
    pub check: Check,
    pub path: Option<String>,
    pub expected: String,
    pub actual: String,
}

impl VerificationFailure {
    pub fn new<E: Into<String>, A: Into<String>>(
        check: Check,
        path: Option<&str>,
        expected: E,
        actual: A,
    ) -> Self {
        Self {
            check,
            path: path.map(String::from),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl std::error::Error for VerificationFailure {}

impl Display for VerificationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "{} check failed for `{}`: expected {}, actual {}",
                self.check, path, self.expected, self.actual
            ),
            None => write!(
                f,
                "{} check failed: expected {}, actual {}",
                self.check, self.expected, self.actual
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Xml,
    Text,
    Html,
}

impl ContentType {
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            ContentType::Json => &[
                "application/json",
                "application/javascript",
                "text/javascript",
                "text/json",
            ],
            ContentType::Xml => &["application/xml", "text/xml", "application/xhtml+xml"],
            ContentType::Text => &["text/plain"],
            ContentType::Html => &["text/html"],
        }
    }

    /// Compares the MIME essence only, so `application/json; charset=utf-8`
    /// is JSON.
    pub fn matches(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        self.mime_types().iter().any(|mime| *mime == essence)
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_types()[0])
    }
}

/// Assertions over a [`ContractResponse`]. Each one returns the response
/// back so checks chain with `?`.
pub trait Verify {
    fn assert_status(&self, expected: u16) -> Result<&Self, Error>;

    fn assert_content_type(&self, expected: ContentType) -> Result<&Self, Error>;

    fn assert_field_equals<V: Into<Value>>(&self, path: &str, expected: V) -> Result<&Self, Error>;

    /// Every expected value must be in the collection at `path`; extra
    /// elements are fine.
    fn assert_field_collection_contains<V, I>(&self, path: &str, expected: I) -> Result<&Self, Error>
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>;

    fn assert_field_not_empty(&self, path: &str) -> Result<&Self, Error>;
}

impl Verify for ContractResponse {
    fn assert_status(&self, expected: u16) -> Result<&Self, Error> {
        if self.status_code() == expected {
            Ok(self)
        } else {
            Err(VerificationFailure::new(
                Check::StatusCode,
                None,
                expected.to_string(),
                self.status_code().to_string(),
            )
            .into())
        }
    }

    fn assert_content_type(&self, expected: ContentType) -> Result<&Self, Error> {
        match self.content_type() {
            Some(actual) if expected.matches(actual) => Ok(self),
            actual => Err(VerificationFailure::new(
                Check::ContentType,
                None,
                expected.to_string(),
                actual.unwrap_or("<none>"),
            )
            .into()),
        }
    }

    fn assert_field_equals<V: Into<Value>>(&self, path: &str, expected: V) -> Result<&Self, Error> {
        let field_path = FieldPath::parse(path)?;
        let expected = expected.into();

        match self.lookup(&field_path)? {
            Some(actual) if actual.to_value() == expected => Ok(self),
            actual => Err(VerificationFailure::new(
                Check::FieldEquals,
                Some(path),
                expected.to_string(),
                render(actual.map(|value| value.to_value())),
            )
            .into()),
        }
    }

    fn assert_field_collection_contains<V, I>(&self, path: &str, expected: I) -> Result<&Self, Error>
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let field_path = FieldPath::parse(path)?;
        let expected: Vec<Value> = expected.into_iter().map(Into::into).collect();
        let actual = self.lookup(&field_path)?;

        let items = match actual.as_ref().and_then(|value| value.items()) {
            Some(items) => items,
            None => {
                return Err(VerificationFailure::new(
                    Check::CollectionContains,
                    Some(path),
                    "a collection",
                    render(actual.as_ref().map(|value| value.to_value())),
                )
                .into())
            }
        };

        let missing: Vec<Value> = expected
            .iter()
            .filter(|value| !items.contains(*value))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(self)
        } else {
            Err(VerificationFailure::new(
                Check::CollectionContains,
                Some(path),
                format!("a collection containing {}", Value::Array(expected)),
                format!("{} (missing {})", Value::Array(items.to_vec()), Value::Array(missing)),
            )
            .into())
        }
    }

    fn assert_field_not_empty(&self, path: &str) -> Result<&Self, Error> {
        let field_path = FieldPath::parse(path)?;

        match self.lookup(&field_path)? {
            Some(actual) if !actual.is_empty() => Ok(self),
            actual => Err(VerificationFailure::new(
                Check::FieldNotEmpty,
                Some(path),
                "a non-empty value",
                render(actual.map(|value| value.to_value())),
            )
            .into()),
        }
    }
}

fn render(value: Option<Value>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| String::from("<missing>"))
}
