use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

/// One page of `GET api/users`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UsersPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    pub data: Vec<User>,
}

impl UsersPage {
    pub fn emails(&self) -> Vec<&str> {
        self.data.iter().map(|user| user.email.as_str()).collect()
    }
}
