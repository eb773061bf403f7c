use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str) -> Result<T, warp::Rejection> {
    raw.parse::<T>()
        .map_err(|_| reject::custom(ApiErrorCode::InvalidId))
}

fn created<T: Serialize>(data: T) -> impl warp::Reply {
    warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(data)),
        StatusCode::CREATED,
    )
}

// region auth

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub username: String,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(reject::custom(ApiErrorCode::MalformedBody));
    }

    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let login_response = LoginResponse {
        user_id: login_result.user_id,
        username: login_result.username,
        tokens: login_result.tokens,
    };
    Ok(warp::reply::json(&ApiResponse::ok(login_response)))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if body.refresh_token.is_empty() {
        return Err(reject::custom(ApiErrorCode::MalformedBody));
    }

    let tokens = session_manager
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(tokens)))
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked: u64,
}

/// The body is optional; an empty body or empty token revokes every session.
pub async fn logout(
    user_id: UserId,
    body: Bytes,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|_| reject::custom(ApiErrorCode::MalformedBody))?
    };
    let refresh_token = request.refresh_token.filter(|t| !t.is_empty());

    let revoked = session_manager
        .logout(user_id, refresh_token.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse { revoked })))
}

// endregion

// region categories

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

pub async fn list_categories(
    _user_id: UserId,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let categories = category_service
        .list()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(categories)))
}

pub async fn create_category(
    user_id: UserId,
    body: CategoryRequest,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let category = category_service
        .create(user_id, &body.name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(created(category))
}

pub async fn get_category(
    id: String,
    _user_id: UserId,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let category = category_service
        .get(parse_id(&id)?)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(category)))
}

pub async fn update_category(
    id: String,
    user_id: UserId,
    body: CategoryRequest,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let category = category_service
        .rename(user_id, parse_id(&id)?, &body.name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(category)))
}

pub async fn delete_category(
    id: String,
    _user_id: UserId,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    category_service
        .delete(parse_id(&id)?)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(())))
}

pub async fn list_category_books(
    id: String,
    _user_id: UserId,
    category_service: Arc<dyn CategoryService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let books = category_service
        .list_books(parse_id(&id)?)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(books)))
}

// endregion

// region books

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub release_year: i32,
    pub price: f64,
    pub total_page: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub release_year: Option<i32>,
    pub price: Option<f64>,
    pub total_page: Option<i32>,
}

pub async fn list_books(
    _user_id: UserId,
    book_service: Arc<dyn BookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let books = book_service
        .list()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(books)))
}

pub async fn create_book(
    user_id: UserId,
    body: CreateBookRequest,
    book_service: Arc<dyn BookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = NewBook {
        title: body.title,
        category_id: body.category_id,
        description: body.description,
        image_url: body.image_url,
        release_year: body.release_year,
        price: body.price,
        total_page: body.total_page,
    };
    let book = book_service
        .create(user_id, input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(created(book))
}

pub async fn get_book(
    id: String,
    _user_id: UserId,
    book_service: Arc<dyn BookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let book = book_service
        .get(parse_id(&id)?)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(book)))
}

pub async fn update_book(
    id: String,
    user_id: UserId,
    body: UpdateBookRequest,
    book_service: Arc<dyn BookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let patch = BookPatch {
        title: body.title,
        category_id: body.category_id,
        description: body.description,
        image_url: body.image_url,
        release_year: body.release_year,
        price: body.price,
        total_page: body.total_page,
    };
    let book = book_service
        .update(user_id, parse_id(&id)?, patch)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(book)))
}

pub async fn delete_book(
    id: String,
    _user_id: UserId,
    book_service: Arc<dyn BookService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    book_service
        .delete(parse_id(&id)?)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(())))
}

// endregion
