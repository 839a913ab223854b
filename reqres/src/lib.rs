mod data;
mod fixture;
mod reqres_contract;

pub use data::users_page::{User, UsersPage};
pub use fixture::{ContractFixture, DEFAULT_BASE_ADDRESS, ENV_PREFIX, REGISTERED_EMAIL};
pub use reqres_contract::{ReqresContract, ReqresContractBuilder};
