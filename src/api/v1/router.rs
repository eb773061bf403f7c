use super::error::*;
use super::handler;
use crate::application_impl::AccessGuard;
use crate::domain_model::UserId;
use crate::server::*;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::hyper::body::Bytes;
use warp::{Filter, reject};

const JSON_BODY_LIMIT: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    user_routes(server.clone())
        .or(category_routes(server.clone()))
        .or(book_routes(server))
}

fn user_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path!("users" / "login"))
        .and(json_body())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path!("users" / "refresh"))
        .and(json_body())
        .and(with(server.session_manager.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path!("users" / "logout"))
        .and(with_verification(server.access_guard.clone()))
        .and(optional_body())
        .and(with(server.session_manager.clone()))
        .and_then(handler::logout);

    login.or(refresh).or(logout)
}

fn category_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let guard = with_verification(server.access_guard.clone());
    let service = with(server.category_service.clone());

    let list = warp::get()
        .and(warp::path!("categories"))
        .and(guard.clone())
        .and(service.clone())
        .and_then(handler::list_categories);

    let create = warp::post()
        .and(warp::path!("categories"))
        .and(guard.clone())
        .and(json_body())
        .and(service.clone())
        .and_then(handler::create_category);

    let get = warp::get()
        .and(warp::path!("categories" / String))
        .and(guard.clone())
        .and(service.clone())
        .and_then(handler::get_category);

    let update = warp::put()
        .and(warp::path!("categories" / String))
        .and(guard.clone())
        .and(json_body())
        .and(service.clone())
        .and_then(handler::update_category);

    let delete = warp::delete()
        .and(warp::path!("categories" / String))
        .and(guard.clone())
        .and(service.clone())
        .and_then(handler::delete_category);

    let books = warp::get()
        .and(warp::path!("categories" / String / "books"))
        .and(guard)
        .and(service)
        .and_then(handler::list_category_books);

    list.or(create).or(get).or(update).or(delete).or(books)
}

fn book_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let guard = with_verification(server.access_guard.clone());
    let service = with(server.book_service.clone());

    let list = warp::get()
        .and(warp::path!("books"))
        .and(guard.clone())
        .and(service.clone())
        .and_then(handler::list_books);

    let create = warp::post()
        .and(warp::path!("books"))
        .and(guard.clone())
        .and(json_body())
        .and(service.clone())
        .and_then(handler::create_book);

    let get = warp::get()
        .and(warp::path!("books" / String))
        .and(guard.clone())
        .and(service.clone())
        .and_then(handler::get_book);

    let update = warp::put()
        .and(warp::path!("books" / String))
        .and(guard.clone())
        .and(json_body())
        .and(service.clone())
        .and_then(handler::update_book);

    let delete = warp::delete()
        .and(warp::path!("books" / String))
        .and(guard)
        .and(service)
        .and_then(handler::delete_book);

    list.or(create).or(get).or(update).or(delete)
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json())
}

/// Raw body that may be absent, capped like `json_body`. A body without a
/// declared length is only accepted when it is empty.
fn optional_body() -> impl Filter<Extract = (Bytes,), Error = warp::Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::header::optional::<String>("transfer-encoding"))
        .and_then(
            |length: Option<u64>, transfer_encoding: Option<String>| async move {
                match (length, transfer_encoding) {
                    (Some(length), _) if length > JSON_BODY_LIMIT => {
                        Err(reject::custom(ApiErrorCode::MalformedBody))
                    }
                    (None, Some(_)) => Err(reject::custom(ApiErrorCode::MalformedBody)),
                    _ => Ok(()),
                }
            },
        )
        .untuple_one()
        .and(warp::body::bytes())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    access_guard: Arc<AccessGuard>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let access_guard = access_guard.clone();
        async move {
            access_guard
                .authorize(header.as_deref())
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
