use crate::data::{RequestData, ResponseData};
use regex::Regex;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Mutation {
    RemoveHeaders(Vec<String>),
    RemoveHeadersMatching(Vec<Regex>),
    AddHeader(String, String),
    BodyReplace(String, String),
    BodyReplaceMatching(Regex, String),
}

impl Mutation {
    fn mutate_headers(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Mutation::RemoveHeaders(names) => {
                headers.retain(|name, _| !names.contains(&name.to_lowercase()));
            }
            Mutation::RemoveHeadersMatching(patterns) => {
                headers.retain(|name, _| !patterns.iter().any(|pattern| pattern.is_match(name)));
            }
            Mutation::AddHeader(name, value) => {
                headers.insert(name.clone(), value.clone());
            }
            Mutation::BodyReplace(..) | Mutation::BodyReplaceMatching(..) => {}
        }
    }

    fn mutate_body(&self, body: &mut String) {
        match self {
            Mutation::BodyReplace(text, substitution) => {
                *body = body.replace(text.as_str(), substitution);
            }
            Mutation::BodyReplaceMatching(pattern, substitution) => {
                *body = pattern.replace_all(body, substitution.as_str()).into();
            }
            _ => {}
        }
    }
}

/// Edits applied to interactions before they are recorded or replayed,
/// e.g. to drop volatile headers or redact credentials.
#[derive(Debug, Clone, Default)]
pub struct Mutations {
    mutations: Vec<Mutation>,
}

impl Mutations {
    pub fn new() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    pub fn remove_headers<S: Into<String>, I: IntoIterator<Item = S>>(&mut self, headers: I) -> &mut Self {
        let names = headers.into_iter().map(|e| e.into().to_lowercase()).collect();
        self.push(Mutation::RemoveHeaders(names))
    }

    pub fn remove_headers_regex<I: IntoIterator<Item = Regex>>(&mut self, patterns: I) -> &mut Self {
        self.push(Mutation::RemoveHeadersMatching(patterns.into_iter().collect()))
    }

    pub fn add_header<S1: Into<String>, S2: Into<String>>(&mut self, name: S1, value: S2) -> &mut Self {
        self.push(Mutation::AddHeader(name.into().to_lowercase(), value.into()))
    }

    pub fn body_replace<S1: Into<String>, S2: Into<String>>(&mut self, text: S1, substitution: S2) -> &mut Self {
        self.push(Mutation::BodyReplace(text.into(), substitution.into()))
    }

    pub fn body_replace_regex<S: Into<String>>(&mut self, pattern: Regex, substitution: S) -> &mut Self {
        self.push(Mutation::BodyReplaceMatching(pattern, substitution.into()))
    }

    pub fn apply_to_request(&self, request_data: &mut RequestData) {
        for mutation in &self.mutations {
            mutation.mutate_headers(&mut request_data.headers);
            mutation.mutate_body(&mut request_data.body);
        }
    }

    pub fn apply_to_response(&self, response_data: &mut ResponseData) {
        for mutation in &self.mutations {
            mutation.mutate_headers(&mut response_data.headers);
            mutation.mutate_body(&mut response_data.body);
        }
    }

    fn push(&mut self, mutation: Mutation) -> &mut Self {
        self.mutations.push(mutation);
        self
    }
}
