use crate::{
    error::Error,
    method::Method,
    payload::Payload,
    request::ContractRequest,
    request_spec::{LogLevel, RequestSpec},
    response::ContractResponse,
    util,
};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, ACCEPT, CONTENT_TYPE},
    Url,
};
use std::{fmt::Debug, time::Duration};
use tracing::info;

type ReqwestClient = reqwest::blocking::Client;

/// Executes one call and hands back whatever the service answered.
/// Only failures to get an answer at all are errors.
pub trait HttpInvoker: Debug {
    fn send(&self, spec: &RequestSpec, request: &ContractRequest) -> Result<ContractResponse, Error>;
}

/// Convenience wrapper over [`HttpInvoker::send`] for one-off calls.
pub fn send<I: HttpInvoker + ?Sized>(
    invoker: &I,
    spec: &RequestSpec,
    method: Method,
    path: &str,
    body: Option<Payload>,
    query: &[(&str, &str)],
) -> Result<ContractResponse, Error> {
    let mut request = ContractRequest::new(method, path);
    request.body = body;
    for (key, value) in query {
        request = request.with_query(*key, value);
    }

    invoker.send(spec, &request)
}

#[derive(Debug, Clone)]
pub struct ReqwestInvoker {
    http: ReqwestClient,
}

impl ReqwestInvoker {
    pub fn new() -> Self {
        Self {
            http: ReqwestClient::new(),
        }
    }

    /// Bounds every call, connect and body read included, by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http })
    }

    pub fn with_http_client(client: ReqwestClient) -> Self {
        Self { http: client }
    }

    fn build_url(spec: &RequestSpec, request: &ContractRequest) -> Result<Url, Error> {
        let raw = spec.url_for(&request.path);
        let mut url = Url::parse(&raw).map_err(|_| Error::InvalidUrl(raw.clone()))?;

        if !request.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

impl HttpInvoker for ReqwestInvoker {
    fn send(&self, spec: &RequestSpec, request: &ContractRequest) -> Result<ContractResponse, Error> {
        let url = Self::build_url(spec, request)?;
        let mut request_builder = self
            .http
            .request(request.method.into(), url.clone())
            .header(ACCEPT, "application/json");

        let body = request.body.as_ref().map(Payload::to_json_string);
        if let Some(body) = &body {
            request_builder = request_builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let outgoing = request_builder.build()?;
        log_request(spec.log_level(), request.method, &url, outgoing.headers(), body.as_deref());

        let response = self.http.execute(outgoing)?;
        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = response.text()?;

        let response = ContractResponse::new(status_code, headers, body);
        log_response(spec.log_level(), &response);

        Ok(response)
    }
}

impl Default for ReqwestInvoker {
    fn default() -> Self {
        Self::new()
    }
}

fn log_request(
    level: LogLevel,
    method: Method,
    url: &Url,
    headers: &HeaderMap,
    body: Option<&str>,
) {
    if level == LogLevel::None {
        return;
    }

    info!("Request: {} {}", method, url);
    if level.logs_headers() {
        for (name, value) in headers {
            info!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }
    if level.logs_body() {
        info!("  body: {}", body.unwrap_or("<none>"));
    }
}

fn log_response(level: LogLevel, response: &ContractResponse) {
    if level == LogLevel::None {
        return;
    }

    info!("Response: {}", response.status_code());
    if level.logs_headers() {
        for (name, value) in response.headers() {
            info!("  {}: {}", name, value);
        }
    }
    if level.logs_body() {
        info!("  body: {}", response.body());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_url_with_encoded_query() {
        let spec = RequestSpec::build("https://reqres.in/", LogLevel::None);
        let request = ContractRequest::get("/api/users")
            .with_query("page", 2)
            .with_query("name", "eve holt&co");

        let url = ReqwestInvoker::build_url(&spec, &request).unwrap();

        assert_eq!(
            url.as_str(),
            "https://reqres.in/api/users?page=2&name=eve+holt%26co"
        );
    }

    #[test]
    fn rejects_unparseable_base_address() {
        let spec = RequestSpec::build("reqres.in", LogLevel::None);

        let error = ReqwestInvoker::build_url(&spec, &ContractRequest::get("api/users")).unwrap_err();

        assert!(matches!(error, Error::InvalidUrl(_)));
    }

    #[test]
    fn connection_failure_is_a_transport_fault() {
        // nothing listens on the discard port locally
        let spec = RequestSpec::build("http://127.0.0.1:9/", LogLevel::None);
        let invoker = ReqwestInvoker::with_timeout(Duration::from_secs(5)).unwrap();

        let error = invoker
            .send(&spec, &ContractRequest::get("api/users"))
            .unwrap_err();

        assert!(error.is_transport());
        assert!(!error.is_verification());
    }
}
