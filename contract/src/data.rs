use std::collections::BTreeMap;

/// One request/response exchange as it is kept in a conversation markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionData {
    pub interaction_number: usize,
    pub request_data: RequestData,
    pub response_data: ResponseData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub uri: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseData {
    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .map(String::as_str)
            .unwrap_or("")
    }
}
