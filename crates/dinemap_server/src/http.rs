//! HTTP routes and WebSocket sessions.

use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use crate::registry::ChannelSink;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use dinemap_protocol::{
    ErrorBody, HealthResponse, MenuResponse, RestaurantFilter, RestaurantId, RestaurantRecord,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

type SharedHandler = Arc<RequestHandler>;

/// Builds the application router.
///
/// REST endpoints live under `/api`; the socket endpoint answers on both
/// `/` and `/ws`.
pub fn router(handler: SharedHandler) -> Router {
    let api = Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/menu", get(get_menu))
        .route("/restaurants/{id}/status", patch(update_status))
        .route("/health", get(health));

    let mut app = Router::new()
        .route("/", get(socket_upgrade))
        .route("/ws", get(socket_upgrade))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http());

    if handler.context().config.permissive_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(handler)
}

async fn list_restaurants(
    State(handler): State<SharedHandler>,
    Query(filter): Query<RestaurantFilter>,
) -> Json<Vec<RestaurantRecord>> {
    Json(handler.list(&filter))
}

async fn get_restaurant(
    State(handler): State<SharedHandler>,
    Path(id): Path<String>,
) -> ServerResult<Json<RestaurantRecord>> {
    handler.get(parse_id(&id)?).map(Json)
}

async fn get_menu(
    State(handler): State<SharedHandler>,
    Path(id): Path<String>,
) -> ServerResult<Json<MenuResponse>> {
    handler.menu(parse_id(&id)?).map(Json)
}

async fn update_status(
    State(handler): State<SharedHandler>,
    Path(id): Path<String>,
    body: Bytes,
) -> ServerResult<Json<RestaurantRecord>> {
    let id = parse_id(&id)?;
    if !handler.context().store.contains(id) {
        return Err(ServerError::NotFound(id));
    }
    let body = parse_json(&body)?;
    handler.set_open_status(id, &body).map(Json)
}

async fn create_restaurant(
    State(handler): State<SharedHandler>,
    body: Bytes,
) -> ServerResult<(StatusCode, Json<RestaurantRecord>)> {
    let body = parse_json(&body)?;
    let record = handler.create_restaurant(body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn health(State(handler): State<SharedHandler>) -> Json<HealthResponse> {
    Json(handler.health())
}

async fn route_not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Route not found")))
}

// A segment that is not an id names no restaurant.
fn parse_id(raw: &str) -> ServerResult<RestaurantId> {
    raw.parse::<u64>()
        .map(RestaurantId)
        .map_err(|_| ServerError::UnknownId(raw.to_string()))
}

fn parse_json(body: &[u8]) -> ServerResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| ServerError::invalid_argument(format!("malformed JSON body: {e}")))
}

async fn socket_upgrade(State(handler): State<SharedHandler>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(handler, socket))
        .into_response()
}

/// Drives one socket: a writer task drains the connection's outbound
/// queue while this task reads until the client goes away.
async fn run_session(handler: SharedHandler, socket: WebSocket) {
    let (sink, mut outbound) = ChannelSink::new(handler.context().config.outbound_buffer);
    let id = match handler.attach(Arc::new(sink)) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "failed to attach connection");
            return;
        }
    };

    let (mut tx, mut rx) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                break;
            }
        }
        let _ = tx.close().await;
    });

    loop {
        tokio::select! {
            _ = &mut writer => {
                debug!(connection = %id, "outbound queue closed");
                break;
            }
            msg = rx.next() => match msg {
                Some(Ok(Message::Close(frame))) => {
                    debug!(connection = %id, ?frame, "client closed connection");
                    break;
                }
                Some(Ok(Message::Text(text))) => {
                    debug!(connection = %id, len = text.as_str().len(), "ignoring inbound text");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection = %id, error = %e, "socket error");
                    break;
                }
                None => break,
            }
        }
    }

    handler.detach(id);
    writer.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::handler::HandlerContext;
    use crate::store::RestaurantStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> (Router, SharedHandler) {
        let context = Arc::new(HandlerContext::new(
            ServerConfig::default(),
            Arc::new(RestaurantStore::seeded()),
        ));
        let handler = Arc::new(RequestHandler::new(context));
        (router(Arc::clone(&handler)), handler)
    }

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn list_all() {
        let (app, _) = app();
        let (status, body) = call(app, Method::GET, "/api/restaurants", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(6));
    }

    #[tokio::test]
    async fn list_with_filters() {
        let (app, _) = app();
        let (_, body) = call(app.clone(), Method::GET, "/api/restaurants?cuisine=JAPAN", None).await;
        assert_eq!(body[0]["name"], json!("Sushi Tokyo"));
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (_, body) = call(app.clone(), Method::GET, "/api/restaurants?type=takeaway", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (_, body) = call(app.clone(), Method::GET, "/api/restaurants?delivery=false", None).await;
        assert_eq!(body[0]["name"], json!("Café Central"));

        let (_, body) = call(app.clone(), Method::GET, "/api/restaurants?cuisine=&type=", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(6));

        for uri in ["/api/restaurants?delivery=", "/api/restaurants?delivery=yes"] {
            let (status, body) = call(app.clone(), Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(body.as_array().map(Vec::len), Some(6), "{uri}");
        }
    }

    #[tokio::test]
    async fn non_numeric_ids_are_not_found() {
        let (app, handler) = app();
        let before = handler.list(&RestaurantFilter::new());
        let requests = [
            (Method::GET, "/api/restaurants/abc"),
            (Method::GET, "/api/restaurants/-1"),
            (Method::GET, "/api/restaurants/abc/menu"),
            (Method::PATCH, "/api/restaurants/abc/status"),
        ];
        for (method, uri) in requests {
            let body = (method == Method::PATCH).then(|| json!({ "isOpen": false }));
            let (status, body) = call(app.clone(), method, uri, body).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
        assert_eq!(handler.list(&RestaurantFilter::new()), before);
    }

    #[tokio::test]
    async fn get_and_menu() {
        let (app, _) = app();
        let (status, body) = call(app.clone(), Method::GET, "/api/restaurants/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("Thai Garden"));

        let (status, body) = call(app.clone(), Method::GET, "/api/restaurants/4/menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restaurantName"], json!("Thai Garden"));
        assert_eq!(body["menu"][0]["category"], json!("Curry"));

        let (status, body) = call(app, Method::GET, "/api/restaurants/40/menu", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn patch_status() {
        let (app, handler) = app();
        let (status, body) = call(
            app.clone(),
            Method::PATCH,
            "/api/restaurants/3/status",
            Some(json!({ "isOpen": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isOpen"], json!(false));
        assert!(body["lastUpdated"].is_string());
        assert!(!handler.get(RestaurantId(3)).unwrap().is_open);

        let (status, _) = call(
            app.clone(),
            Method::PATCH,
            "/api/restaurants/3/status",
            Some(json!({ "isOpen": "false" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            app,
            Method::PATCH,
            "/api/restaurants/30/status",
            Some(json!({ "isOpen": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_restaurant() {
        let (app, handler) = app();
        let (status, body) = call(
            app.clone(),
            Method::POST,
            "/api/restaurants",
            Some(json!({
                "name": "Bäckerei Kleiner",
                "lat": 47.3702,
                "lng": 8.5391,
                "type": "cafe",
                "cuisine": "schweizerisch",
                "hours": "06:00 - 18:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], json!(7));
        assert_eq!(body["isOpen"], json!(true));
        assert_eq!(body["rating"], json!(0.0));
        assert!(body["createdAt"].is_string());

        let (status, body) = call(
            app,
            Method::POST,
            "/api/restaurants",
            Some(json!({ "lat": 47.0, "lng": 8.0, "type": "cafe", "cuisine": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));
        assert_eq!(handler.context().store.len(), 7);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (app, _) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/restaurants")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_and_fallback() {
        let (app, _) = app();
        let (status, body) = call(app.clone(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["connectedClients"], json!(0));

        let (status, body) = call(app, Method::GET, "/api/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Route not found" }));
    }
}
