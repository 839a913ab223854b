use crate::{data::users_page::UsersPage, fixture::DEFAULT_BASE_ADDRESS};
use http_contract::{
    assert_matches_extracted, ChainedScenario, Check, ContentType, ContractRequest, ContractResponse,
    Error, HttpInvoker, LogLevel, Payload, ReqwestInvoker, RequestSpec, TestIdentity,
    VerificationFailure, Verify,
};
use serde_json::Value;
use tracing::info;

const USERS_PATH: &str = "api/users";
const REGISTER_PATH: &str = "api/register";
const LOGIN_PATH: &str = "api/login";

/// Builder used to build a ReqresContract instance
#[derive(Debug, Default)]
pub struct ReqresContractBuilder {
    spec: Option<RequestSpec>,
    invoker: Option<Box<dyn HttpInvoker>>,
}

impl ReqresContractBuilder {
    /// Create a new ReqresContractBuilder instance.
    pub fn new() -> Self {
        Self {
            spec: None,
            invoker: None,
        }
    }

    /// Use the given request spec when building a ReqresContract instance.
    ///
    /// # Arguments
    /// `spec` - the base address and log level every contract call uses.
    ///
    /// # Returns
    /// This builder.
    pub fn with_spec(mut self, spec: RequestSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Use the given invoker to issue the calls.
    ///
    /// # Arguments
    /// `invoker` - a pre-configured invoker, e.g. a `ReqwestInvoker` with a timeout.
    ///
    /// # Returns
    /// This builder.
    pub fn with_invoker<I: HttpInvoker + 'static>(mut self, invoker: I) -> Self {
        self.invoker = Some(Box::new(invoker));
        self
    }

    /// Consume the builder and create a ReqresContract instance using all of the previously configured values or
    /// their defaults.
    ///
    /// # Returns
    /// A ReqresContract instance.
    pub fn build(mut self) -> ReqresContract {
        ReqresContract {
            invoker: self
                .invoker
                .take()
                .unwrap_or_else(|| Box::new(ReqwestInvoker::new())),
            spec: self.spec.take().unwrap_or_else(|| {
                RequestSpec::build(DEFAULT_BASE_ADDRESS, LogLevel::default())
            }),
        }
    }
}

/// The reqres.in user API contract. Every operation issues its calls in
/// order and fails with the first check that doesn't hold.
#[derive(Debug)]
pub struct ReqresContract {
    invoker: Box<dyn HttpInvoker>,
    spec: RequestSpec,
}

impl ReqresContract {
    /// Create a ReqresContract against the live service with the default reqwest client.
    ///
    /// # Returns
    /// A ReqresContract.
    pub fn new() -> Self {
        ReqresContractBuilder::new().build()
    }

    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Creates a user named after the identity.
    ///
    /// # Arguments
    /// `identity` - supplies the `name` and `job` to send.
    ///
    /// # Returns
    /// The `201 Created` response, which echoes both fields back.
    pub fn create_user(&self, identity: &TestIdentity) -> Result<ContractResponse, Error> {
        let body = Payload::builder()
            .field("name", &identity.name)
            .field("job", &identity.job)
            .build();

        let response = self.send(&ContractRequest::post(USERS_PATH).with_body(body))?;
        expect_json(&response, 201)?
            .assert_field_equals("name", identity.name.as_str())?
            .assert_field_equals("job", identity.job.as_str())?;

        info!("Created user {} ({})", identity.name, identity.job);
        Ok(response)
    }

    /// Registers the identity's email with its password.
    ///
    /// # Returns
    /// The session token the service issued.
    pub fn register(&self, identity: &TestIdentity) -> Result<String, Error> {
        let response = self.send(&ContractRequest::post(REGISTER_PATH).with_body(credentials(identity)))?;
        expect_json(&response, 200)?.assert_field_not_empty("token")?;

        string_field(&response, "token")
    }

    /// Registers the identity's email without a password, which the service
    /// must refuse.
    ///
    /// # Returns
    /// The `400 Bad Request` response.
    pub fn register_without_password(&self, identity: &TestIdentity) -> Result<ContractResponse, Error> {
        let body = Payload::builder().field("email", &identity.email).build();

        let response = self.send(&ContractRequest::post(REGISTER_PATH).with_body(body))?;
        expect_json(&response, 400)?.assert_field_equals("error", "Missing password")?;

        Ok(response)
    }

    /// Lists the emails of one page of users.
    ///
    /// # Arguments
    /// `page` - 1-based page number.
    ///
    /// # Returns
    /// The emails in the order the service listed them.
    pub fn list_user_emails(&self, page: u32) -> Result<Vec<String>, Error> {
        let response = self.list_users(page)?;
        let emails = response.extract("data.email")?;

        emails
            .as_strings()
            .map(|emails| emails.into_iter().map(String::from).collect())
            .ok_or_else(|| {
                VerificationFailure::new(
                    Check::CollectionContains,
                    Some("data.email"),
                    "a list of strings",
                    emails.to_string(),
                )
                .into()
            })
    }

    /// Every one of `emails` must be on the page; other users may be too.
    pub fn list_users_contains(&self, page: u32, emails: &[&str]) -> Result<ContractResponse, Error> {
        let response = self.list_users(page)?;
        response.assert_field_collection_contains("data.email", emails.iter().copied())?;

        Ok(response)
    }

    /// Lists the same page twice; both listings must match, order included.
    ///
    /// # Returns
    /// The emails of the page.
    pub fn list_users_is_idempotent(&self, page: u32) -> Result<Vec<String>, Error> {
        let first = self.list_user_emails(page)?;
        let second = self.list_user_emails(page)?;

        if first != second {
            return Err(VerificationFailure::new(
                Check::FieldEquals,
                Some("data.email"),
                Value::from(first).to_string(),
                Value::from(second).to_string(),
            )
            .into());
        }

        Ok(first)
    }

    /// Reads one page of users into a typed record.
    pub fn users_page(&self, page: u32) -> Result<UsersPage, Error> {
        self.list_users(page)?.deserialize()
    }

    /// Registers the identity, then logs in with the same credentials. The
    /// login token must be the one registration returned.
    ///
    /// # Returns
    /// The token.
    pub fn register_then_login(&self, identity: &TestIdentity) -> Result<String, Error> {
        let credentials = credentials(identity);
        let mut scenario = ChainedScenario::new("register then login", &*self.invoker, &self.spec);

        let token = scenario.first(
            &ContractRequest::post(REGISTER_PATH).with_body(credentials.clone()),
            "token",
            |response| {
                expect_json(response, 200)?.assert_field_not_empty("token")?;
                Ok(())
            },
        )?;

        scenario.second(
            &ContractRequest::post(LOGIN_PATH).with_body(credentials),
            |response, token| {
                expect_json(response, 200)?;
                assert_matches_extracted(response, "token", token)
            },
        )?;

        Ok(token.to_string())
    }

    fn list_users(&self, page: u32) -> Result<ContractResponse, Error> {
        let response = self.send(&ContractRequest::get(USERS_PATH).with_query("page", page))?;
        expect_json(&response, 200)?;

        Ok(response)
    }

    fn send(&self, request: &ContractRequest) -> Result<ContractResponse, Error> {
        self.invoker.send(&self.spec, request)
    }
}

impl Default for ReqresContract {
    fn default() -> Self {
        Self::new()
    }
}

fn credentials(identity: &TestIdentity) -> Payload {
    Payload::builder()
        .field("email", &identity.email)
        .field("password", &identity.password)
        .build()
}

fn expect_json(response: &ContractResponse, status_code: u16) -> Result<&ContractResponse, Error> {
    response
        .assert_status(status_code)?
        .assert_content_type(ContentType::Json)
}

fn string_field(response: &ContractResponse, path: &str) -> Result<String, Error> {
    let value = response.extract(path)?;

    value.as_str().map(String::from).ok_or_else(|| {
        VerificationFailure::new(Check::FieldPresent, Some(path), "a string", value.to_string()).into()
    })
}
