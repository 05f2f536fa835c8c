use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Largest body `/download/{size}` will produce.
pub const MAX_DOWNLOAD: usize = 8 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub username: String,
    #[serde(default)]
    pub categories: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub categories: String,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    pub name: String,
    pub comments: String,
}

#[derive(Deserialize)]
pub struct NewComment {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    pub name: String,
    pub comments: String,
}

#[derive(Deserialize)]
pub struct Signup {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PostFilter {
    pub category: Option<String>,
}

struct User {
    name: String,
    password: String,
}

#[derive(Clone, Default)]
pub struct Db {
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
    comments: Arc<RwLock<HashMap<Uuid, Comment>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
}

type ApiError = (StatusCode, Json<Value>);

fn reject(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(json!({ "msg": msg })))
}

pub fn app() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/file/upload", post(upload_file))
        .route("/create", post(create_post))
        .route("/posts", get(list_posts))
        .route("/post/{id}", get(get_post))
        .route("/update/{id}", put(update_post))
        .route("/delete/{id}", delete(delete_post))
        .route("/comment/new", post(new_comment))
        .route("/comments/{id}", get(list_comments))
        .route("/comment/delete/{id}", delete(delete_comment))
        .route("/status/{code}", get(status).post(status))
        .route("/slow/{millis}", get(slow))
        .route("/download/{size}", get(download))
        .with_state(Db::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn signup(State(db): State<Db>, Json(input): Json<Signup>) -> Result<Json<Value>, ApiError> {
    let mut users = db.users.write().await;
    if users.contains_key(&input.username) {
        return Err(reject(StatusCode::CONFLICT, "username already taken"));
    }
    users.insert(
        input.username,
        User {
            name: input.name,
            password: input.password,
        },
    );
    Ok(Json(json!({ "msg": "signup successfull" })))
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Result<Json<Value>, ApiError> {
    let users = db.users.read().await;
    let user = users
        .get(&input.username)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Username does not match"))?;
    if user.password != input.password {
        return Err(reject(StatusCode::BAD_REQUEST, "Password does not match"));
    }
    Ok(Json(json!({
        "accessToken": Uuid::new_v4(),
        "name": user.name,
        "username": input.username,
    })))
}

async fn upload_file(body: Bytes) -> Result<Json<Value>, ApiError> {
    if body.is_empty() {
        return Err(reject(StatusCode::NOT_FOUND, "File not found"));
    }
    let id = Uuid::new_v4();
    Ok(Json(json!({
        "imageUrl": format!("/file/{id}"),
        "size": body.len(),
    })))
}

async fn create_post(State(db): State<Db>, Json(input): Json<CreatePost>) -> Json<Post> {
    let post = Post {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        username: input.username,
        categories: input.categories,
    };
    db.posts.write().await.insert(post.id, post.clone());
    Json(post)
}

async fn list_posts(State(db): State<Db>, Query(filter): Query<PostFilter>) -> Json<Vec<Post>> {
    let posts = db.posts.read().await;
    let selected = posts
        .values()
        .filter(|post| match filter.category.as_deref() {
            None | Some("") => true,
            Some(category) => post.categories == category,
        })
        .cloned()
        .collect();
    Json(selected)
}

async fn get_post(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Post>, ApiError> {
    let posts = db.posts.read().await;
    posts
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "post not found"))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Value>, ApiError> {
    let mut posts = db.posts.write().await;
    let post = posts
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "post not found"))?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(description) = input.description {
        post.description = description;
    }
    if let Some(categories) = input.categories {
        post.categories = categories;
    }
    Ok(Json(json!({ "msg": "post updated successfully" })))
}

/// Rejects DELETE requests that carry a body, so clients that leak one show
/// up as a 400.
async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !body.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "unexpected request body"));
    }
    let mut posts = db.posts.write().await;
    posts
        .remove(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "post not found"))?;
    db.comments.write().await.retain(|_, c| c.post_id != id);
    Ok(Json(json!({ "msg": "post deleted successfully" })))
}

async fn new_comment(
    State(db): State<Db>,
    Json(input): Json<NewComment>,
) -> Result<Json<Comment>, ApiError> {
    if !db.posts.read().await.contains_key(&input.post_id) {
        return Err(reject(StatusCode::NOT_FOUND, "post not found"));
    }
    let comment = Comment {
        id: Uuid::new_v4(),
        post_id: input.post_id,
        name: input.name,
        comments: input.comments,
    };
    db.comments.write().await.insert(comment.id, comment.clone());
    Ok(Json(comment))
}

async fn list_comments(State(db): State<Db>, Path(post_id): Path<Uuid>) -> Json<Vec<Comment>> {
    let comments = db.comments.read().await;
    Json(
        comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect(),
    )
}

async fn delete_comment(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if !body.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "unexpected request body"));
    }
    db.comments
        .write()
        .await
        .remove(&id)
        .map(|_| Json(json!({ "msg": "comment deleted successfully" })))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "comment not found"))
}

/// Replies with the requested status and a `{msg, code}` body.
async fn status(Path(code): Path<u16>) -> ApiError {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        Json(json!({
            "msg": status.canonical_reason().unwrap_or("unknown status"),
            "code": status.as_u16(),
        })),
    )
}

async fn slow(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(json!({ "sleptMillis": millis }))
}

async fn download(Path(size): Path<usize>) -> Result<Vec<u8>, ApiError> {
    if size > MAX_DOWNLOAD {
        return Err(reject(StatusCode::PAYLOAD_TOO_LARGE, "download too large"));
    }
    Ok(vec![b'x'; size])
}
