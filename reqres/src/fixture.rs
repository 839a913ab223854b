use crate::reqres_contract::{ReqresContract, ReqresContractBuilder};
use http_contract::{Error, HarnessConfig, ReqwestInvoker, RequestSpec, TestDataProvider, TestIdentity};
use tracing::debug;

/// The only address reqres.in accepts for registration and login.
pub const REGISTERED_EMAIL: &str = "eve.holt@reqres.in";

pub const DEFAULT_BASE_ADDRESS: &str = "https://reqres.in/";

pub const ENV_PREFIX: &str = "REQRES";

/// Everything one test case needs: where to send calls and who to act as.
/// Set up at the start of every test case, nothing carries over between
/// them.
#[derive(Debug, Clone)]
pub struct ContractFixture {
    pub config: HarnessConfig,
    pub identity: TestIdentity,
}

impl ContractFixture {
    /// Targets `base_address`. The log level and timeout still come from the
    /// `REQRES_*` environment.
    pub fn setup<P: TestDataProvider + ?Sized>(base_address: &str, provider: &mut P) -> Result<Self, Error> {
        let mut config = HarnessConfig::from_env(ENV_PREFIX, base_address)?;
        config.base_address = base_address.into();

        Self::with_config(config, provider)
    }

    /// Targets the live service, or `REQRES_BASE_ADDRESS` when it is set.
    pub fn live<P: TestDataProvider + ?Sized>(provider: &mut P) -> Result<Self, Error> {
        Self::with_config(HarnessConfig::from_env(ENV_PREFIX, DEFAULT_BASE_ADDRESS)?, provider)
    }

    pub fn with_config<P: TestDataProvider + ?Sized>(config: HarnessConfig, provider: &mut P) -> Result<Self, Error> {
        let identity = TestIdentity::generate(provider, REGISTERED_EMAIL)?;
        debug!("Fixture for {} acting as {}", config.base_address, identity.name);

        Ok(Self { config, identity })
    }

    /// The spec [`ContractFixture::contract`] sends with.
    pub fn spec(&self) -> RequestSpec {
        self.config.request_spec()
    }

    pub fn contract(&self) -> Result<ReqresContract, Error> {
        Ok(ReqresContractBuilder::new()
            .with_spec(self.spec())
            .with_invoker(ReqwestInvoker::with_timeout(self.config.timeout)?)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_contract::{LogLevel, RandomDataProvider, ScriptedDataProvider};
    use std::time::Duration;

    #[test]
    fn identities_use_the_registered_email() {
        let fixture = ContractFixture::setup("http://127.0.0.1:1/", &mut RandomDataProvider::new()).unwrap();

        assert_eq!(fixture.identity.email, REGISTERED_EMAIL);
        assert_eq!(fixture.identity.password.len(), 9);
        assert_eq!(fixture.spec().base_address(), "http://127.0.0.1:1/");
    }

    #[test]
    fn every_setup_draws_a_fresh_identity() {
        let mut provider = RandomDataProvider::seeded(3);

        let first = ContractFixture::setup("http://127.0.0.1:1/", &mut provider).unwrap();
        let second = ContractFixture::setup("http://127.0.0.1:1/", &mut provider).unwrap();

        assert_ne!(first.identity, second.identity);
    }

    #[test]
    fn explicit_config_is_kept() {
        let mut config = HarnessConfig::new("http://127.0.0.1:2/");
        config.log_level = LogLevel::Headers;
        config.timeout = Duration::from_secs(3);
        let mut provider = ScriptedDataProvider::new("Hugh Jass", "Lead Tactics Liaison", "482913057");

        let fixture = ContractFixture::with_config(config.clone(), &mut provider).unwrap();

        assert_eq!(fixture.config, config);
        assert_eq!(fixture.identity.name, "Hugh Jass");
        assert_eq!(fixture.spec().log_level(), LogLevel::Headers);

        let contract = fixture.contract().unwrap();
        assert_eq!(contract.spec(), &fixture.spec());
    }

    #[test]
    fn rejects_identities_without_a_password() {
        let mut provider = ScriptedDataProvider::new("Hugh Jass", "Lead Tactics Liaison", "");

        assert!(ContractFixture::setup("http://127.0.0.1:1/", &mut provider).is_err());
    }
}
