use crate::{
    error::Error,
    field_path::{ExtractedValue, FieldPath},
    invoker::HttpInvoker,
    request::ContractRequest,
    request_spec::RequestSpec,
    response::ContractResponse,
    verifier::Verify,
};
use std::fmt::Display;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    AwaitingFirstResponse,
    AwaitingSecondResponse,
    Verified,
    Failed,
}

impl Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScenarioState::AwaitingFirstResponse => "awaiting the first response",
            ScenarioState::AwaitingSecondResponse => "awaiting the second response",
            ScenarioState::Verified => "verified",
            ScenarioState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// Two calls where the second depends on a value taken from the first
/// response.
///
/// The first stage sends its request, runs the caller's checks and
/// extracts a value; the second stage sends the dependent request and
/// checks it against that value. A failure in the first stage ends the
/// scenario, the second request is never sent.
#[derive(Debug)]
pub struct ChainedScenario<'a, I: HttpInvoker + ?Sized> {
    name: String,
    invoker: &'a I,
    spec: &'a RequestSpec,
    state: ScenarioState,
    extracted: Option<ExtractedValue>,
}

impl<'a, I: HttpInvoker + ?Sized> ChainedScenario<'a, I> {
    pub fn new<S: Into<String>>(name: S, invoker: &'a I, spec: &'a RequestSpec) -> Self {
        Self {
            name: name.into(),
            invoker,
            spec,
            state: ScenarioState::AwaitingFirstResponse,
            extracted: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn extracted(&self) -> Option<&ExtractedValue> {
        self.extracted.as_ref()
    }

    /// Sends `request`, runs `verify` on the response and extracts the value
    /// at `extract_path` for the second stage.
    pub fn first<F>(
        &mut self,
        request: &ContractRequest,
        extract_path: &str,
        verify: F,
    ) -> Result<ExtractedValue, Error>
    where
        F: FnOnce(&ContractResponse) -> Result<(), Error>,
    {
        self.expect_state(ScenarioState::AwaitingFirstResponse, "send the first request")?;

        let invoker = self.invoker;
        let spec = self.spec;
        let result = FieldPath::parse(extract_path).and_then(|_| {
            let response = invoker.send(spec, request)?;
            verify(&response)?;
            response.extract(extract_path)
        });

        match result {
            Ok(extracted) => {
                debug!(
                    "Scenario {}: extracted `{}` = {}",
                    self.name, extract_path, extracted
                );
                self.state = ScenarioState::AwaitingSecondResponse;
                self.extracted = Some(extracted.clone());
                Ok(extracted)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Sends the dependent `request` and runs `verify` with the value the
    /// first stage extracted.
    pub fn second<F>(&mut self, request: &ContractRequest, verify: F) -> Result<ContractResponse, Error>
    where
        F: FnOnce(&ContractResponse, &ExtractedValue) -> Result<(), Error>,
    {
        self.expect_state(ScenarioState::AwaitingSecondResponse, "send the second request")?;

        let extracted = match self.extracted.as_ref() {
            Some(extracted) => extracted,
            None => {
                let error = self.state_error("send the second request");
                return Err(self.fail(error));
            }
        };

        let result = self
            .invoker
            .send(self.spec, request)
            .and_then(|response| verify(&response, extracted).map(|_| response));

        match result {
            Ok(response) => {
                debug!("Scenario {}: verified", self.name);
                self.state = ScenarioState::Verified;
                Ok(response)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn expect_state(&self, expected: ScenarioState, action: &'static str) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.state_error(action))
        }
    }

    fn state_error(&self, action: &'static str) -> Error {
        Error::ScenarioState {
            scenario: self.name.clone(),
            action,
            state: self.state.to_string(),
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        warn!("Scenario {} failed while {}: {}", self.name, self.state, error);
        self.state = ScenarioState::Failed;
        error
    }
}

/// Pulls the value at `path` out of `response`.
pub fn extract(response: &ContractResponse, path: &str) -> Result<ExtractedValue, Error> {
    response.extract(path)
}

/// The field at `path` must be exactly the value extracted earlier.
pub fn assert_matches_extracted(
    response: &ContractResponse,
    path: &str,
    extracted: &ExtractedValue,
) -> Result<(), Error> {
    response
        .assert_field_equals(path, extracted.to_value())
        .map(|_| ())
}
