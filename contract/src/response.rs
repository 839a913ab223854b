use crate::{
    error::Error,
    field_path::{ExtractedValue, FieldPath},
    verifier::{Check, VerificationFailure},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything the remote service answered with, read-only.
#[derive(Debug, Clone)]
pub struct ContractResponse {
    status_code: u16,
    content_type: Option<String>,
    headers: BTreeMap<String, String>,
    body: String,
    document: Option<Value>,
}

impl ContractResponse {
    pub fn new<S: Into<String>>(
        status_code: u16,
        headers: BTreeMap<String, String>,
        body: S,
    ) -> Self {
        let body = body.into();
        let headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        let content_type = headers.get("content-type").cloned();
        let document = serde_json::from_str(&body).ok();

        Self {
            status_code,
            content_type,
            headers,
            body,
            document,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The parsed body. A body that isn't JSON is a verification failure.
    pub fn document(&self) -> Result<&Value, Error> {
        self.document.as_ref().ok_or_else(|| {
            VerificationFailure::new(Check::MalformedBody, None, "a JSON document", &self.body)
                .into()
        })
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let document = self.document()?;

        serde_json::from_value(document.clone()).map_err(|e| {
            VerificationFailure::new(
                Check::MalformedBody,
                None,
                std::any::type_name::<T>(),
                e.to_string(),
            )
            .into()
        })
    }

    /// Pulls the value at `path` out of the body.
    pub fn extract(&self, path: &str) -> Result<ExtractedValue, Error> {
        let field_path = FieldPath::parse(path)?;

        self.document()
            .map(|document| field_path.resolve(document))?
            .ok_or_else(|| {
                VerificationFailure::new(Check::FieldPresent, Some(path), "a value", "nothing")
                    .into()
            })
    }

    pub(crate) fn lookup(&self, path: &FieldPath) -> Result<Option<ExtractedValue>, Error> {
        Ok(path.resolve(self.document()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn json_response(status_code: u16, body: &str) -> ContractResponse {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".into(), "application/json; charset=utf-8".into());
        ContractResponse::new(status_code, headers, body)
    }

    #[test]
    fn parses_json_body() {
        let response = json_response(200, r#"{"token":"QpwL5tke4Pnpja7X4"}"#);

        assert_eq!(response.document().unwrap(), &json!({"token": "QpwL5tke4Pnpja7X4"}));
        assert_eq!(response.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(response.header("Content-Type"), response.content_type());
    }

    #[test]
    fn malformed_body_is_a_verification_failure() {
        let response = json_response(502, "<html>Bad Gateway</html>");

        let error = response.document().unwrap_err();

        assert!(error.is_verification());
        assert_eq!(error.verification_failure().unwrap().check, Check::MalformedBody);
    }

    #[test]
    fn extracts_scalar_fields() {
        let response = json_response(200, r#"{"id":4,"token":"QpwL5tke4Pnpja7X4"}"#);

        assert_eq!(response.extract("token").unwrap().as_str(), Some("QpwL5tke4Pnpja7X4"));
        assert!(response.extract("error").unwrap_err().is_verification());
        assert!(matches!(
            response.extract("data..email"),
            Err(Error::InvalidFieldPath { .. })
        ));
    }

    #[test]
    fn deserializes_typed_records() {
        #[derive(Deserialize)]
        struct Registered {
            id: u32,
            token: String,
        }

        let response = json_response(200, r#"{"id":4,"token":"QpwL5tke4Pnpja7X4"}"#);
        let registered: Registered = response.deserialize().unwrap();

        assert_eq!(registered.id, 4);
        assert_eq!(registered.token, "QpwL5tke4Pnpja7X4");
        assert!(response.deserialize::<Vec<u32>>().unwrap_err().is_verification());
    }
}
