use crate::{data_provider::TestDataProvider, error::Error};

/// The user a single test case acts as. Built once at the start of the
/// test case, never shared between test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    pub name: String,
    pub job: String,
    pub email: String,
    pub password: String,
}

impl TestIdentity {
    /// `email` is taken as is; the service only registers addresses it
    /// already knows.
    pub fn generate<P: TestDataProvider + ?Sized, S: Into<String>>(
        provider: &mut P,
        email: S,
    ) -> Result<Self, Error> {
        let identity = Self {
            name: provider.name(),
            job: provider.job_title(),
            email: email.into(),
            password: provider.password(),
        };

        if identity.password.is_empty() || !identity.password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(String::from(
                "generated password should be non-empty and alphanumeric",
            )));
        }

        Ok(identity)
    }
}
