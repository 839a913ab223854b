mod config;
mod data;
mod data_provider;
mod error;
mod field_path;
mod forwarder;
mod identity;
mod invoker;
pub mod logging;
pub mod markdown;
mod method;
mod mutations;
mod payload;
mod playback_configuration;
mod playback_server;
mod request;
mod request_spec;
mod response;
mod scenario;
mod util;
mod verifier;

pub use config::HarnessConfig;
pub use data::{InteractionData, RequestData, ResponseData};
pub use data_provider::{RandomDataProvider, ScriptedDataProvider, TestDataProvider};
pub use error::{Error, Result};
pub use field_path::{ExtractedValue, FieldPath};
pub use forwarder::{HttpForwarder, HyperForwarder};
pub use identity::TestIdentity;
pub use invoker::{send, HttpInvoker, ReqwestInvoker};
pub use method::Method;
pub use mutations::Mutations;
pub use payload::{Payload, PayloadBuilder, PayloadValue};
pub use playback_configuration::PlaybackConfiguration;
pub use playback_server::{InteractionMode, PlaybackServer};
pub use request::ContractRequest;
pub use request_spec::{LogLevel, RequestSpec, RequestSpecBuilder};
pub use response::ContractResponse;
pub use scenario::{assert_matches_extracted, extract, ChainedScenario, ScenarioState};
pub use verifier::{Check, ContentType, VerificationFailure, Verify};
