use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::database::Event;
use crate::http_server::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    pub artist_id: i64,
    pub name: String,
    pub date: String,
    pub location: Option<String>,
    pub price: Option<f64>,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.db.list_events().await?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    state
        .db
        .get_event(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("event"))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EventPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state
        .db
        .create_event(
            payload.artist_id,
            &payload.name,
            &payload.date,
            payload.location.as_deref(),
            payload.price,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<EventPayload>,
) -> Result<StatusCode, ApiError> {
    let affected = state
        .db
        .update_event(
            id,
            payload.artist_id,
            &payload.name,
            &payload.date,
            payload.location.as_deref(),
            payload.price,
        )
        .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("event"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let affected = state.db.delete_event(id).await?;

    if affected == 0 {
        return Err(ApiError::NotFound("event"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::http_server::{app, state::AppState};
    use crate::test_utils::test_db;

    async fn test_app() -> Router {
        app::router(Arc::new(AppState {
            db: test_db().await,
        }))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_artist(app: &Router, name: &str) -> i64 {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/artists", json!({ "name": name })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn create_then_get_includes_artist_name() {
        let app = test_app().await;
        let artist_id = create_artist(&app, "Daft Punk").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/events",
                json!({
                    "artist_id": artist_id,
                    "name": "Tour",
                    "date": "2025-01-01",
                    "price": 50.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await, json!({ "id": 1 }));

        let response = app.oneshot(get_request("/events/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "id": 1,
                "artist_id": artist_id,
                "artist_name": "Daft Punk",
                "name": "Tour",
                "date": "2025-01-01",
                "location": null,
                "price": 50.0
            })
        );
    }

    #[tokio::test]
    async fn list_joins_every_event_with_its_artist() {
        let app = test_app().await;
        let daft_punk = create_artist(&app, "Daft Punk").await;
        let justice = create_artist(&app, "Justice").await;

        for (artist_id, name) in [(daft_punk, "Alive Tour"), (justice, "Woman Tour")] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/events",
                    json!({ "artist_id": artist_id, "name": name, "date": "2025-01-01" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app.oneshot(get_request("/events")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 2);
        for event in events {
            assert!(event["artist_name"].is_string());
            assert!(event["artist_id"].is_i64());
        }
    }

    #[tokio::test]
    async fn create_with_unknown_artist_fails() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/events",
                json!({ "artist_id": 999, "name": "Ghost Show", "date": "2025-06-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Nothing was persisted
        let response = app.oneshot(get_request("/events")).await.unwrap();
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn deleting_artist_cascades_to_its_events() {
        let app = test_app().await;
        let artist_id = create_artist(&app, "Daft Punk").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/events",
                json!({
                    "artist_id": artist_id,
                    "name": "Tour",
                    "date": "2025-01-01",
                    "price": 50.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/artists/{artist_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get_request("/events/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_missing_event_is_not_found() {
        let app = test_app().await;
        let artist_id = create_artist(&app, "Daft Punk").await;

        let response = app
            .oneshot(json_request(
                "PUT",
                "/events/999",
                json!({ "artist_id": artist_id, "name": "Tour", "date": "2025-01-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_overwrites_optional_fields() {
        let app = test_app().await;
        let artist_id = create_artist(&app, "Daft Punk").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/events",
                json!({
                    "artist_id": artist_id,
                    "name": "Tour",
                    "date": "2025-01-01",
                    "location": "Paris",
                    "price": 50.0
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // Omitted location and price are written as null
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/events/1",
                json!({ "artist_id": artist_id, "name": "Tour", "date": "2025-02-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get_request("/events/1")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["date"], "2025-02-01");
        assert_eq!(body["location"], Value::Null);
        assert_eq!(body["price"], Value::Null);
    }

    #[tokio::test]
    async fn delete_event_then_get_is_not_found() {
        let app = test_app().await;
        let artist_id = create_artist(&app, "Daft Punk").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/events",
                json!({ "artist_id": artist_id, "name": "Tour", "date": "2025-01-01" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/events/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.clone().oneshot(get_request("/events/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The artist itself is untouched
        let response = app.oneshot(get_request(&format!("/artists/{artist_id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
