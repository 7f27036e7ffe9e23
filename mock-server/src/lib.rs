use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Header carrying the verb the client actually meant.
pub const METHOD_OVERRIDE_HEADER: &str = "unity_method";

/// Header echoing the real status; the transport status is always 200.
pub const REAL_STATUS_HEADER: &str = "real_status";

const BLANK_FIELD: &str = "This field may not be blank.";
const NO_CREDENTIALS: &str = "Authentication credentials were not provided.";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub user: String,
    pub score: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Savegame {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Clone, Debug)]
struct User {
    email: String,
    password: String,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    /// token -> username
    tokens: HashMap<String, String>,
    scores: Vec<Score>,
    savegames: Vec<Savegame>,
}

pub type Db = Arc<RwLock<Store>>;

type Fields = HashMap<String, String>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/getauthtoken/", post(get_auth_token))
        .route("/user/", post(register_user))
        .route("/user/delete/", post(delete_user))
        .route("/score/", get(list_scores).post(post_score))
        .route("/savegame/", get(list_savegames).post(post_savegame))
        .route("/savegame/list/", post(list_savegames_by_type))
        .with_state(db);

    // The override has to happen before method routing, so the real router
    // sits behind a fallback that the middleware wraps.
    Router::new()
        .fallback_service(Router::new().nest("/api", api))
        .layer(middleware::from_fn(method_override))
        .layer(middleware::from_fn(real_status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn method_override(mut req: Request, next: Next) -> Response {
    let method = req
        .headers()
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "UPDATE" | "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        });
    if let Some(method) = method {
        *req.method_mut() = method;
    }
    next.run(req).await
}

async fn real_status(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;
    let status = response.status();
    let line = format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or_default());
    if let Ok(value) = HeaderValue::from_str(line.trim_end()) {
        response.headers_mut().insert(REAL_STATUS_HEADER, value);
    }
    debug!(%path, status = status.as_u16(), "request handled");
    *response.status_mut() = StatusCode::OK;
    response
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Field-keyed 400 for the first blank or missing field.
fn require(fields: &Fields, names: &[&str]) -> Result<(), Response> {
    for name in names {
        if fields.get(*name).map_or(true, |value| value.trim().is_empty()) {
            let mut errors = serde_json::Map::new();
            errors.insert(name.to_string(), json!([BLANK_FIELD]));
            return Err(reply(StatusCode::BAD_REQUEST, Value::Object(errors)));
        }
    }
    Ok(())
}

/// Username owning the `Authorization: Token <key>` header.
fn authenticate(headers: &HeaderMap, store: &Store) -> Result<String, Response> {
    let Some(header) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Err(reply(StatusCode::UNAUTHORIZED, json!({ "detail": NO_CREDENTIALS })));
    };
    let key = header.strip_prefix("Token ").unwrap_or_default().trim();
    store
        .tokens
        .get(key)
        .cloned()
        .ok_or_else(|| reply(StatusCode::UNAUTHORIZED, json!({ "detail": "Invalid token." })))
}

async fn get_auth_token(State(db): State<Db>, Form(fields): Form<Fields>) -> Response {
    if let Err(rejection) = require(&fields, &["username", "password"]) {
        return rejection;
    }
    let username = &fields["username"];
    let mut store = db.write().await;
    let valid = store
        .users
        .get(username)
        .is_some_and(|user| user.password == fields["password"]);
    if !valid {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "non_field_errors": ["Unable to log in with provided credentials."] }),
        );
    }

    let existing = store
        .tokens
        .iter()
        .find(|(_, owner)| *owner == username)
        .map(|(key, _)| key.clone());
    let token = match existing {
        Some(token) => token,
        None => {
            let token = Uuid::new_v4().simple().to_string();
            store.tokens.insert(token.clone(), username.clone());
            token
        }
    };
    info!(%username, "issued auth token");
    reply(StatusCode::OK, json!({ "token": token }))
}

async fn register_user(State(db): State<Db>, Form(fields): Form<Fields>) -> Response {
    if let Err(rejection) = require(&fields, &["username", "email", "password"]) {
        return rejection;
    }
    let username = fields["username"].clone();
    let mut store = db.write().await;
    if store.users.contains_key(&username) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "username": ["A user with that username already exists."] }),
        );
    }
    let user = User {
        email: fields["email"].clone(),
        password: fields["password"].clone(),
    };
    let body = json!({ "username": username, "email": user.email });
    store.users.insert(username.clone(), user);
    info!(%username, "registered user");
    reply(StatusCode::CREATED, body)
}

async fn delete_user(State(db): State<Db>, Form(fields): Form<Fields>) -> Response {
    let mut store = db.write().await;
    let username = fields.get("username").cloned().unwrap_or_default();
    let matches = store.users.get(&username).is_some_and(|user| {
        Some(&user.email) == fields.get("email") && Some(&user.password) == fields.get("password")
    });
    if !matches {
        // A bare JSON string, not an object.
        return reply(StatusCode::BAD_REQUEST, json!("Could not find that user"));
    }
    store.users.remove(&username);
    store.tokens.retain(|_, owner| *owner != username);
    info!(%username, "deleted user");
    StatusCode::NO_CONTENT.into_response()
}

async fn list_scores(State(db): State<Db>) -> Json<Vec<Score>> {
    Json(db.read().await.scores.clone())
}

async fn post_score(State(db): State<Db>, headers: HeaderMap, Form(fields): Form<Fields>) -> Response {
    let mut store = db.write().await;
    let user = match authenticate(&headers, &store) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    let Some(score) = fields.get("score").and_then(|value| value.trim().parse::<i64>().ok()) else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "score": ["A valid integer is required."] }),
        );
    };

    let entry = Score { user, score };
    if !store.scores.contains(&entry) {
        store.scores.push(entry.clone());
    }
    reply(StatusCode::CREATED, json!(entry))
}

async fn list_savegames(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    let owner = match authenticate(&headers, &store) {
        Ok(owner) => owner,
        Err(rejection) => return rejection,
    };
    let own: Vec<&Savegame> = store.savegames.iter().filter(|save| save.owner == owner).collect();
    reply(StatusCode::OK, json!(own))
}

async fn post_savegame(State(db): State<Db>, headers: HeaderMap, Form(fields): Form<Fields>) -> Response {
    let mut store = db.write().await;
    let owner = match authenticate(&headers, &store) {
        Ok(owner) => owner,
        Err(rejection) => return rejection,
    };
    if let Err(rejection) = require(&fields, &["name", "type"]) {
        return rejection;
    }
    let name = fields["name"].clone();
    let kind = fields["type"].clone();
    let file = fields.get("file").cloned().unwrap_or_default();

    let existing = store
        .savegames
        .iter_mut()
        .find(|save| save.owner == owner && save.name == name && save.kind == kind);
    let saved = match existing {
        Some(save) => {
            save.file = file;
            save.clone()
        }
        None => {
            let save = Savegame {
                id: Uuid::new_v4(),
                name,
                kind,
                file,
                owner,
            };
            store.savegames.push(save.clone());
            save
        }
    };
    reply(StatusCode::CREATED, json!(saved))
}

async fn list_savegames_by_type(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(fields): Form<Fields>,
) -> Response {
    let store = db.read().await;
    let owner = match authenticate(&headers, &store) {
        Ok(owner) => owner,
        Err(rejection) => return rejection,
    };
    let Some(kind) = fields.get("SavegameType") else {
        return reply(StatusCode::OK, json!([]));
    };
    let matching: Vec<&Savegame> = store
        .savegames
        .iter()
        .filter(|save| save.owner == owner && &save.kind == kind)
        .collect();
    reply(StatusCode::OK, json!(matching))
}
