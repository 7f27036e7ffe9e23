//! Typed operations for the game backend.
//!
//! Each operation validates its inputs, builds a `RequestSpec` and hands it
//! to `Backend::send` under its own operation name. Blank required fields
//! never reach the network: they resolve to `ErrorFromClient` with a
//! field-keyed error object shaped like the backend's own validation errors.
//! Every operation returns `DispatchError` only when called outside a tokio
//! runtime.

use serde_json::{json, Value};

use crate::classify::Outcome;
use crate::client::{Backend, ResponseCallback};
use crate::error::DispatchError;
use crate::form::Form;
use crate::request::RequestSpec;

pub const LOGIN_PATH: &str = "getauthtoken/";
pub const USER_PATH: &str = "user/";
pub const DELETE_USER_PATH: &str = "user/delete/";
pub const SCORE_PATH: &str = "score/";
pub const SAVEGAME_PATH: &str = "savegame/";
pub const SAVEGAME_LIST_PATH: &str = "savegame/list/";

const BLANK_FIELD: &str = "This field may not be blank.";

/// Error object for the first blank field among `fields`, if any.
fn blank_field(fields: &[(&str, &str)]) -> Option<Value> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| {
            let mut errors = serde_json::Map::new();
            errors.insert(name.to_string(), json!([BLANK_FIELD]));
            Value::Object(errors)
        })
}

impl Backend {
    fn send_checked(
        &self,
        callee: &str,
        required: &[(&str, &str)],
        spec: RequestSpec,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        match blank_field(required) {
            Some(errors) => self.deliver(Outcome::ErrorFromClient(errors), callee, callback),
            None => self.send(spec, callee, callback),
        }
    }

    /// Exchange credentials for an auth token (`{"token": "..."}`).
    pub fn login(
        &self,
        username: &str,
        password: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new()
            .field("username", username)
            .field("password", password);
        self.send_checked(
            "login",
            &[("username", username), ("password", password)],
            RequestSpec::post(LOGIN_PATH).form(form),
            callback,
        )
    }

    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new()
            .field("username", username)
            .field("email", email)
            .field("password", password);
        self.send_checked(
            "register",
            &[("username", username), ("email", email), ("password", password)],
            RequestSpec::post(USER_PATH).form(form),
            callback,
        )
    }

    /// Delete an account. Succeeds with an empty body.
    pub fn delete_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new()
            .field("username", username)
            .field("email", email)
            .field("password", password);
        self.send_checked(
            "delete_user",
            &[("username", username), ("email", email), ("password", password)],
            RequestSpec::post(DELETE_USER_PATH).form(form),
            callback,
        )
    }

    pub fn post_score(
        &self,
        token: &str,
        score: i64,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new().field("score", score.to_string());
        self.send_checked(
            "post_score",
            &[("token", token)],
            RequestSpec::post(SCORE_PATH).form(form).token(token),
            callback,
        )
    }

    /// All scores; anonymous.
    pub fn get_scores(&self, callback: Option<ResponseCallback>) -> Result<(), DispatchError> {
        self.send(RequestSpec::get(SCORE_PATH), "get_scores", callback)
    }

    /// Create a savegame, or overwrite the one with the same name and type.
    pub fn post_savegame(
        &self,
        token: &str,
        name: &str,
        kind: &str,
        data: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new()
            .field("name", name)
            .field("type", kind)
            .field("file", data);
        self.send_checked(
            "post_savegame",
            &[("token", token), ("name", name), ("type", kind)],
            RequestSpec::post(SAVEGAME_PATH).form(form).token(token),
            callback,
        )
    }

    pub fn get_savegames(
        &self,
        token: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        self.send_checked(
            "get_savegames",
            &[("token", token)],
            RequestSpec::get(SAVEGAME_PATH).token(token),
            callback,
        )
    }

    pub fn get_savegames_by_type(
        &self,
        token: &str,
        kind: &str,
        callback: Option<ResponseCallback>,
    ) -> Result<(), DispatchError> {
        let form = Form::new().field("SavegameType", kind);
        self.send_checked(
            "get_savegames_by_type",
            &[("token", token), ("SavegameType", kind)],
            RequestSpec::post(SAVEGAME_LIST_PATH).form(form).token(token),
            callback,
        )
    }
}
