use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Book, BookUpdate, NewBook};
use crate::repo::BookRepo;

/// The single collection path; everything is dispatched on the HTTP method.
pub const BOOKS_PATH: &str = "/api/books";

#[derive(Clone)]
struct AppState<R> {
    repo: R,
}

#[derive(Debug, Deserialize)]
struct BookQuery {
    id: Option<String>,
}

impl BookQuery {
    /// An empty `?id=` counts as absent
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

pub fn build_api<R: BookRepo>(repo: R) -> Router {
    Router::new()
        .route(
            BOOKS_PATH,
            get(get_books::<R>)
                .post(insert_book::<R>)
                .put(update_book::<R>)
                .delete(delete_book::<R>)
                .fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { repo })
}

async fn get_books<R: BookRepo>(
    State(state): State<AppState<R>>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let Some(raw_id) = query.id() else {
        let results = state.repo.list_books().await.map_err(ApiError::store)?;

        info!("Retrieved {} books from the store", results.len());

        return Ok(Json(results).into_response());
    };

    // a malformed id cannot match any record, which is not an error
    let book = match Uuid::parse_str(raw_id) {
        Ok(id) => state.repo.get_book(id).await.map_err(ApiError::store)?,
        Err(_) => None,
    };

    match &book {
        Some(book) => info!("Retrieved book from the store: {:?}", book),
        None => info!("No book found in the store with ID: {}", raw_id),
    }

    Ok(Json(book).into_response())
}

async fn insert_book<R: BookRepo>(
    State(state): State<AppState<R>>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(new_book) = payload?;

    let inserted_book = state
        .repo
        .insert_book(new_book)
        .await
        .map_err(ApiError::store)?;

    info!("Inserted book into the store: {:?}", inserted_book);

    Ok((StatusCode::CREATED, Json(inserted_book)))
}

async fn update_book<R: BookRepo>(
    State(state): State<AppState<R>>,
    payload: Result<Json<BookUpdate>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(BookUpdate { id, changes }) = payload?;

    let updated_book = state
        .repo
        .update_book(id, changes)
        .await
        .map_err(ApiError::store)?;

    match updated_book {
        Some(book) => {
            info!("Updated book in the store: {:?}", book);
            Ok(Json(book))
        }
        None => Err(ApiError::not_found("Record to update not found.")),
    }
}

async fn delete_book<R: BookRepo>(
    State(state): State<AppState<R>>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<Json<Book>, ApiError> {
    let Query(query) = query?;
    let raw_id = query.id().ok_or(ApiError::MissingId)?;

    let deleted_book = match Uuid::parse_str(raw_id) {
        Ok(id) => state.repo.delete_book(id).await.map_err(ApiError::store)?,
        Err(_) => None,
    };

    match deleted_book {
        Some(book) => {
            info!("Deleted book from the store with ID: {}", book.id);
            Ok(Json(book))
        }
        None => Err(ApiError::not_found("Record to delete does not exist.")),
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::sample_book;
    use crate::memory::InMemoryBookRepo;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn sample_json(email: &str) -> Value {
        serde_json::to_value(sample_book(email)).unwrap()
    }

    #[tokio::test]
    async fn create_get_delete_round_trip() {
        let app = build_api(InMemoryBookRepo::new());

        let (status, created) = send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;
        assert_eq!(StatusCode::CREATED, status);
        let id = created["id"].as_str().unwrap().to_string();
        let mut expected = sample_json("a@x.com");
        expected["id"] = json!(id);
        assert_eq!(expected, created);

        let (status, fetched) = send(&app, "GET", &format!("{BOOKS_PATH}?id={id}"), None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(created, fetched);

        let (status, deleted) = send(&app, "DELETE", &format!("{BOOKS_PATH}?id={id}"), None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(created, deleted);

        let (status, listed) = send(&app, "GET", BOOKS_PATH, None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(json!([]), listed);
    }

    #[tokio::test]
    async fn get_unknown_or_malformed_id_is_null() {
        let app = build_api(InMemoryBookRepo::new());

        let uri = format!("{BOOKS_PATH}?id={}", Uuid::now_v7());
        assert_eq!((StatusCode::OK, Value::Null), send(&app, "GET", &uri, None).await);

        let uri = format!("{BOOKS_PATH}?id=not-a-uuid");
        assert_eq!((StatusCode::OK, Value::Null), send(&app, "GET", &uri, None).await);
    }

    #[tokio::test]
    async fn empty_id_lists_the_collection() {
        let app = build_api(InMemoryBookRepo::new());
        send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        let (status, listed) = send(&app, "GET", &format!("{BOOKS_PATH}?id="), None).await;

        assert_eq!(StatusCode::OK, status);
        assert_eq!(1, listed.as_array().unwrap().len());
    }

    #[tokio::test]
    async fn duplicate_email_reports_the_conflicting_field() {
        let app = build_api(InMemoryBookRepo::new());
        send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        let (status, body) = send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!(json!({ "message": "Something went wrong", "target": ["email"] }), body);
    }

    #[tokio::test]
    async fn partial_update_only_touches_submitted_fields() {
        let app = build_api(InMemoryBookRepo::new());
        let (_, created) = send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        let update = json!({ "id": created["id"], "city": "Paris", "number_of_pages": 320 });
        let (status, updated) = send(&app, "PUT", BOOKS_PATH, Some(update)).await;

        assert_eq!(StatusCode::OK, status);
        let mut expected = created.clone();
        expected["city"] = json!("Paris");
        expected["number_of_pages"] = json!(320);
        assert_eq!(expected, updated);

        let id = created["id"].as_str().unwrap();
        let (_, fetched) = send(&app, "GET", &format!("{BOOKS_PATH}?id={id}"), None).await;
        assert_eq!(expected, fetched);
    }

    #[tokio::test]
    async fn update_of_missing_book_is_a_store_failure() {
        let app = build_api(InMemoryBookRepo::new());

        let update = json!({ "id": Uuid::now_v7(), "city": "Paris" });
        let (status, body) = send(&app, "PUT", BOOKS_PATH, Some(update)).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("Something went wrong", body["message"]);
        assert_eq!("Record to update not found.", body["cause"]);
    }

    #[tokio::test]
    async fn delete_without_id_is_rejected_and_changes_nothing() {
        let app = build_api(InMemoryBookRepo::new());
        send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        for uri in [BOOKS_PATH.to_string(), format!("{BOOKS_PATH}?id=")] {
            let (status, body) = send(&app, "DELETE", &uri, None).await;
            assert_eq!(StatusCode::BAD_REQUEST, status);
            assert_eq!(json!({ "message": "You should have an id!" }), body);
        }

        let (_, listed) = send(&app, "GET", BOOKS_PATH, None).await;
        assert_eq!(1, listed.as_array().unwrap().len());
    }

    #[tokio::test]
    async fn delete_of_missing_book_is_a_store_failure() {
        let app = build_api(InMemoryBookRepo::new());

        let uri = format!("{BOOKS_PATH}?id={}", Uuid::now_v7());
        let (status, body) = send(&app, "DELETE", &uri, None).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("Record to delete does not exist.", body["cause"]);
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let app = build_api(InMemoryBookRepo::new());

        let body = Some(json!({ "email": "a@x.com" }));
        let (status, body) = send(&app, "POST", BOOKS_PATH, body).await;

        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("Something went wrong", body["message"]);
        assert!(body["cause"].is_string());
    }

    #[tokio::test]
    async fn update_without_attributes_returns_the_current_record() {
        let app = build_api(InMemoryBookRepo::new());
        let (_, created) = send(&app, "POST", BOOKS_PATH, Some(sample_json("a@x.com"))).await;

        let update = json!({ "id": created["id"] });
        let (status, current) = send(&app, "PUT", BOOKS_PATH, Some(update)).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!(created, current);

        let update = json!({ "id": Uuid::now_v7() });
        let (status, body) = send(&app, "PUT", BOOKS_PATH, Some(update)).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert_eq!("Record to update not found.", body["cause"]);
    }

    #[tokio::test]
    async fn unreadable_query_string_gets_a_json_error_body() {
        let app = build_api(InMemoryBookRepo::new());

        for method in ["GET", "DELETE"] {
            let uri = format!("{BOOKS_PATH}?id=a&id=b");
            let (status, body) = send(&app, method, &uri, None).await;

            assert_eq!(StatusCode::BAD_REQUEST, status);
            assert_eq!("Something went wrong", body["message"]);
            assert!(body["cause"].as_str().unwrap().contains("duplicate field"));
        }
    }

    #[tokio::test]
    async fn unsupported_method_is_405() {
        let app = build_api(InMemoryBookRepo::new());

        let (status, body) = send(&app, "PATCH", BOOKS_PATH, None).await;

        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, status);
        assert_eq!(json!({ "message": "Method not allowed!" }), body);
    }
}
