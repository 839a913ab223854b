use crate::{method::Method, payload::Payload};

/// One call to issue against a [`RequestSpec`](crate::RequestSpec) base address.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Payload>,
    pub query: Vec<(String, String)>,
}

impl ContractRequest {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post<S: Into<String>>(path: S) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn with_body(mut self, body: Payload) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}
