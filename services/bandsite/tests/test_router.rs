//! Router tests against an in-memory backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use bandsite::io::{HttpClient, HttpResponse};
use bandsite::web::build_router;
use bandsite::{build_state, Config};

/// A recorded backend call
#[derive(Debug, Clone)]
struct Call {
    method: &'static str,
    url: String,
    bearer: Option<String>,
}

#[derive(Default)]
struct StubBackend {
    tables: HashMap<&'static str, Value>,
    failing: Vec<&'static str>,
    calls: Mutex<Vec<Call>>,
}

impl StubBackend {
    fn with_table(mut self, table: &'static str, rows: Value) -> Self {
        self.tables.insert(table, rows);
        self
    }

    fn failing(mut self, table: &'static str) -> Self {
        self.failing.push(table);
        self
    }

    fn record(&self, method: &'static str, url: &str, headers: &[(&str, &str)]) {
        let bearer = headers
            .iter()
            .find(|(name, _)| *name == "Authorization")
            .map(|(_, value)| value.to_string());
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            bearer,
        });
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn table_of(url: &str) -> &str {
        let path = url.split("/rest/v1/").nth(1).unwrap_or_default();
        path.split('?').next().unwrap_or_default()
    }

    fn respond(status: u16, body: Value) -> bandsite::Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }
}

#[async_trait]
impl HttpClient for StubBackend {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> bandsite::Result<HttpResponse> {
        self.record("GET", url, headers);
        let table = Self::table_of(url);
        if self.failing.iter().any(|failing| *failing == table) {
            return Self::respond(503, json!({ "message": "Service unavailable" }));
        }
        let rows = self.tables.get(table).cloned().unwrap_or_else(|| json!([]));
        if url.contains("limit=1") {
            let first = rows.as_array().and_then(|r| r.first()).cloned();
            return Self::respond(200, json!(first.into_iter().collect::<Vec<_>>()));
        }
        Self::respond(200, rows)
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> bandsite::Result<HttpResponse> {
        self.record("POST", url, headers);
        if url.contains("grant_type=password") {
            if body["password"] == "secret" {
                return Self::respond(
                    200,
                    json!({
                        "access_token": "editor-jwt",
                        "refresh_token": "refresh",
                        "expires_in": 3600,
                        "user": { "id": "u-1", "email": body["email"] }
                    }),
                );
            }
            return Self::respond(
                400,
                json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
            );
        }
        if url.ends_with("/logout") {
            return Ok(HttpResponse {
                status: 204,
                body: String::new(),
            });
        }
        let mut row = body.clone();
        row["id"] = json!(99);
        Self::respond(201, json!([row]))
    }

    async fn patch_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> bandsite::Result<HttpResponse> {
        self.record("PATCH", url, headers);
        let id: i64 = url
            .rsplit("id=eq.")
            .next()
            .and_then(|id| id.parse().ok())
            .unwrap_or_default();
        let mut row = body.clone();
        row["id"] = json!(id);
        Self::respond(200, json!([row]))
    }

    async fn delete(&self, url: &str, headers: &[(&str, &str)]) -> bandsite::Result<HttpResponse> {
        self.record("DELETE", url, headers);
        Ok(HttpResponse {
            status: 204,
            body: String::new(),
        })
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.backend.url = "https://project.example.co".to_string();
    config.backend.anon_key = "anon".to_string();
    config
}

fn app(backend: Arc<StubBackend>) -> Router {
    build_router(build_state(test_config(), backend))
}

fn show_row(id: i64, city: &str, offset: Duration) -> Value {
    json!({
        "id": id,
        "start_at": (Utc::now() + offset).to_rfc3339(),
        "city": city,
        "venue": "Teatro ABC",
        "status": "tickets",
        "ticket_url": "https://tickets.example.com/1",
        "min_age": 18
    })
}

fn release_row(id: i64, title: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "release_date": date,
        "cover_art_url": null,
        "genres": ["urbano", "latino"],
        "spotify_url": "https://open.spotify.com/album/1"
    })
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=editor%40eliteklan.com&password=secret"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app(Arc::new(StubBackend::default()));
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn shows_page_splits_upcoming_and_past() {
    let backend = StubBackend::default().with_table(
        "shows",
        json!([
            show_row(1, "Barranquilla", Duration::days(-10)),
            show_row(2, "Cartagena", Duration::days(20)),
        ]),
    );
    let app = app(Arc::new(backend));

    let response = get(&app, "/shows").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;

    let upcoming = html.find("Próximos shows").unwrap();
    let past = html.find("Shows anteriores").unwrap();
    let cartagena = html.find("Cartagena").unwrap();
    let barranquilla = html.find("Barranquilla").unwrap();
    assert!(upcoming < cartagena && cartagena < past && past < barranquilla);
    assert!(html.contains("+18"));
}

#[tokio::test]
async fn music_page_without_releases_shows_info_alert() {
    let app = app(Arc::new(StubBackend::default()));
    let html = body_string(get(&app, "/musica").await).await;
    assert!(html.contains("Aún no hay lanzamientos registrados."));
}

#[tokio::test]
async fn backend_failure_renders_inline_error() {
    let backend = StubBackend::default().failing("media_items");
    let app = app(Arc::new(backend));

    let response = get(&app, "/media").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("alert-error"));
    assert!(html.contains("Service unavailable"));
}

#[tokio::test]
async fn home_features_next_show_and_latest_release() {
    let backend = StubBackend::default()
        .with_table(
            "shows",
            json!([
                show_row(1, "Barranquilla", Duration::days(-3)),
                show_row(2, "Cartagena", Duration::days(2)),
                show_row(3, "Medellín", Duration::days(30)),
            ]),
        )
        .with_table(
            "releases",
            json!([
                release_row(1, "Elite Sessions", "2023-05-01"),
                release_row(2, "Noches de Neón", "2025-03-15"),
            ]),
        )
        .with_table(
            "site_settings",
            json!([{ "id": 1, "hero_title": "Sonido Elite", "social_links": null }]),
        );
    let app = app(Arc::new(backend));

    let html = body_string(get(&app, "/").await).await;
    assert!(html.contains("Sonido Elite"));
    assert!(html.contains("Cartagena · Teatro ABC"));
    assert!(html.contains(r#"id="countdown""#));
    assert!(html.contains("Noches de Neón"));
    assert!(!html.contains("Elite Sessions"));
}

#[tokio::test]
async fn epk_without_settings_shows_info_alert() {
    let app = app(Arc::new(StubBackend::default()));
    let html = body_string(get(&app, "/epk").await).await;
    assert!(html.contains("No hay contenido configurado para el press kit todavía."));
}

#[tokio::test]
async fn api_shows_are_camel_case() {
    let backend = StubBackend::default()
        .with_table("shows", json!([show_row(7, "Cali", Duration::days(1))]));
    let app = app(Arc::new(backend));

    let response = get(&app, "/api/shows").await;
    assert_eq!(response.status(), StatusCode::OK);
    let shows: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(shows[0]["id"], 7);
    assert!(shows[0]["startAt"].is_string());
    assert_eq!(shows[0]["ticketUrl"], "https://tickets.example.com/1");
    assert_eq!(shows[0]["minAge"], 18);
}

#[tokio::test]
async fn api_releases_newest_first() {
    let backend = StubBackend::default().with_table(
        "releases",
        json!([
            release_row(1, "Old", "2021-01-01"),
            release_row(2, "New", "2024-06-01"),
        ]),
    );
    let app = app(Arc::new(backend));

    let releases: Value =
        serde_json::from_str(&body_string(get(&app, "/api/releases").await).await).unwrap();
    assert_eq!(releases[0]["title"], "New");
    assert_eq!(releases[0]["coverArtUrl"], "");
    assert_eq!(releases[0]["links"]["spotify"], "https://open.spotify.com/album/1");
}

#[tokio::test]
async fn api_next_show_includes_countdown() {
    let backend = StubBackend::default().with_table(
        "shows",
        json!([
            show_row(1, "Pasto", Duration::days(-1)),
            show_row(2, "Neiva", Duration::days(3)),
        ]),
    );
    let app = app(Arc::new(backend));

    let next: Value =
        serde_json::from_str(&body_string(get(&app, "/api/next-show").await).await).unwrap();
    assert_eq!(next["show"]["city"], "Neiva");
    assert_eq!(next["upcoming"], true);
    assert_eq!(next["countdown"]["days"], 2);
}

#[tokio::test]
async fn api_error_is_json() {
    let app = app(Arc::new(StubBackend::default().failing("shows")));
    let response = get(&app, "/api/shows").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "Service unavailable");
}

#[tokio::test]
async fn countdown_stream_ends_without_upcoming_show() {
    let backend = StubBackend::default()
        .with_table("shows", json!([show_row(1, "Pasto", Duration::days(-1))]));
    let app = app(Arc::new(backend));

    let response = get(&app, "/api/countdown").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    let body = body_string(response).await;
    assert!(body.contains("event: ended"));
    assert!(!body.contains("event: countdown"));
}

#[tokio::test]
async fn contact_rejects_invalid_submission() {
    let app = app(Arc::new(StubBackend::default()));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contacto")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Laura&email=no-es-correo&event_type=festival"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_string(response).await;
    assert!(html.contains("Ingresa un correo electrónico válido."));
    assert!(html.contains(r#"value="Laura""#));
}

#[tokio::test]
async fn contact_accepts_valid_submission() {
    let app = app(Arc::new(StubBackend::default()));
    let form = "name=Laura&email=laura%40promotora.co&event_type=privado&budget=5000&event_date=2025-12-31&message=Fiesta";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/contacto")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("¡Gracias! Te contactaremos pronto."));
    assert!(!html.contains(r#"value="Laura""#));
}

#[tokio::test]
async fn dashboard_redirects_to_login_without_session() {
    let app = app(Arc::new(StubBackend::default()));
    let response = get(&app, "/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );
}

#[tokio::test]
async fn admin_api_rejects_without_session() {
    let app = app(Arc::new(StubBackend::default()));
    let response = get(&app, "/admin/api/shows").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn unknown_session_cookie_is_expired() {
    let app = app(Arc::new(StubBackend::default()));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .header(header::COOKIE, "bandsite_session=stale-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("bandsite_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn login_cookie_is_http_only() {
    let app = app(Arc::new(StubBackend::default()));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=editor%40eliteklan.com&password=secret"))
                .unwrap(),
        )
        .await
        .unwrap();

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
}

#[tokio::test]
async fn admin_index_redirects_to_dashboard() {
    let app = app(Arc::new(StubBackend::default()));
    let response = get(&app, "/admin").await;
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/dashboard"
    );
}

#[tokio::test]
async fn login_with_bad_password_rerenders_form() {
    let app = app(Arc::new(StubBackend::default()));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=editor%40eliteklan.com&password=nope"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = body_string(response).await;
    assert!(html.contains("Invalid login credentials"));
    assert!(html.contains("editor@eliteklan.com"));
}

#[tokio::test]
async fn signed_in_editor_uses_own_token() {
    let backend = Arc::new(
        StubBackend::default().with_table("shows", json!([show_row(1, "Cali", Duration::days(5))])),
    );
    let app = app(Arc::clone(&backend));
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/api/shows")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let last = backend.calls().pop().unwrap();
    assert_eq!(last.method, "GET");
    assert!(last.url.contains("/rest/v1/shows"));
    assert_eq!(last.bearer.as_deref(), Some("Bearer editor-jwt"));
}

#[tokio::test]
async fn dashboard_renders_for_signed_in_editor() {
    let backend = Arc::new(
        StubBackend::default().with_table("releases", json!([release_row(4, "Noches de Neón", "2025-03-15")])),
    );
    let app = app(Arc::clone(&backend));
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/dashboard")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Panel de contenido"));
    assert!(html.contains("editor@eliteklan.com"));
    assert!(html.contains("Noches de Neón"));
    assert!(html.contains("Aún no hay shows registrados."));
}

#[tokio::test]
async fn create_show_through_admin_api() {
    let backend = Arc::new(StubBackend::default());
    let app = app(Arc::clone(&backend));
    let cookie = sign_in(&app).await;

    let draft = json!({
        "startAt": "2025-11-08T20:00:00Z",
        "city": "Bogotá",
        "venue": "Movistar Arena",
        "status": "waitlist"
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/api/shows")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(draft.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(created["id"], 99);
    assert_eq!(created["city"], "Bogotá");
    assert_eq!(created["status"], "waitlist");
}

#[tokio::test]
async fn update_and_delete_release_through_admin_api() {
    let backend = Arc::new(StubBackend::default());
    let app = app(Arc::clone(&backend));
    let cookie = sign_in(&app).await;

    let draft = json!({
        "title": "Noches de Neón (Deluxe)",
        "releaseDate": "2025-03-15",
        "coverArtUrl": "https://cdn.example.com/neon.jpg",
        "links": { "appleMusic": "https://music.apple.com/album/2" }
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/admin/api/releases/12")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(draft.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(updated["id"], 12);
    assert_eq!(updated["links"]["appleMusic"], "https://music.apple.com/album/2");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/admin/api/releases/12")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(backend
        .calls()
        .iter()
        .any(|c| c.method == "DELETE" && c.url.ends_with("/releases?id=eq.12")));
}

#[tokio::test]
async fn logout_clears_session() {
    let backend = Arc::new(StubBackend::default());
    let app = app(Arc::clone(&backend));
    let cookie = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/api/shows")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
