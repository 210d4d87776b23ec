use apigen_macros::ApiParams;
use http::StatusCode;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Generated dispatch, validation and encoding code.
pub mod handlers {
    include!(concat!(env!("OUT_DIR"), "/api_handlers.rs"));
}

/// Token predicate used by the generated auth check.
pub fn check_token(token: &str) -> bool {
    token == "100500"
}

/// Per-request data handed through dispatch to every handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub full_name: String,
    pub status: String,
    pub age: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: &str) -> Self {
        ApiError {
            status,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

impl handlers::ApiFailure for ApiError {
    fn status(&self) -> StatusCode {
        self.status
    }
}

#[derive(Debug, Default, ApiParams)]
pub struct ProfileParams {
    #[apivalidator("required,min=10")]
    pub login: String,
}

#[derive(Debug, Default, ApiParams)]
pub struct CreateParams {
    #[apivalidator("required,min=10")]
    pub login: String,
    #[apivalidator("paramname=full_name")]
    pub name: String,
    #[apivalidator("enum=user|moderator|admin,default=user")]
    pub status: String,
    #[apivalidator("min=0,max=128")]
    pub age: i32,
}

/// In-memory user store.
#[derive(Debug)]
pub struct MyApi {
    users: Mutex<HashMap<String, User>>,
    next_id: AtomicU64,
}

impl Default for MyApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MyApi {
    /// A store seeded with one user, `rvasily_admin`.
    pub fn new() -> Self {
        let admin = User {
            id: 1,
            login: "rvasily_admin".to_string(),
            full_name: "Vasily Romanov".to_string(),
            status: "admin".to_string(),
            age: 30,
        };
        MyApi {
            users: Mutex::new(HashMap::from([(admin.login.clone(), admin)])),
            next_id: AtomicU64::new(2),
        }
    }

    fn users(&self) -> MutexGuard<'_, HashMap<String, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// apigen:api {"url": "/user/profile", "auth": true}
    pub fn profile(&self, _ctx: &Context, params: ProfileParams) -> Result<User, ApiError> {
        if params.login == "bad_user_login" {
            return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "bad user"));
        }
        self.users()
            .get(&params.login)
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "user not exist"))
    }

    /// Registers a user.
    ///
    /// apigen:api {"url": "/user/create", "auth": true, "method": "POST"}
    pub fn create(&self, _ctx: &Context, params: CreateParams) -> Result<NewUser, ApiError> {
        let mut users = self.users();
        if users.contains_key(&params.login) {
            return Err(ApiError::new(StatusCode::CONFLICT, "user exists"));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        users.insert(
            params.login.clone(),
            User {
                id,
                login: params.login,
                full_name: params.name,
                status: params.status,
                age: params.age,
            },
        );
        Ok(NewUser { id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherUser {
    pub id: u64,
    pub login: String,
    pub full_name: String,
    pub level: i8,
}

#[derive(Debug, Default, ApiParams)]
pub struct OtherCreateParams {
    #[apivalidator("required,min=3")]
    pub username: String,
    #[apivalidator("paramname=account_name")]
    pub name: String,
    #[apivalidator("enum=warrior|sorcerer|rouge,default=warrior")]
    pub class: String,
    #[apivalidator("min=1,max=50")]
    pub level: i8,
}

/// A second API claiming the same path as [`MyApi::create`].
#[derive(Debug, Default)]
pub struct OtherApi;

impl OtherApi {
    /// apigen:api {"url": "/user/create", "auth": true, "method": "POST"}
    pub fn create(&self, _ctx: &Context, params: OtherCreateParams) -> Result<OtherUser, ApiError> {
        Ok(OtherUser {
            id: 12,
            login: params.username,
            full_name: params.name,
            level: params.level,
        })
    }
}
