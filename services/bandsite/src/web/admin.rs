//! Admin login, dashboard and content CRUD API

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, put};
use axum::{Extension, Form, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::guard::{self, Editor, LOGIN_PATH};
use super::layout::{alert, escape, format_date, format_show_time, render_query, Severity};
use super::pages::load;
use super::AppState;
use crate::content::{
    ContentRepository, Entity, MediaItem, Release, Show, SiteSettings, SiteSettingsDraft,
};
use crate::{Result, SiteError};

pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Routes that require a signed-in editor
pub fn protected_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(DASHBOARD_PATH, get(dashboard))
        .route("/admin/api/shows", get(list::<Show>).post(create::<Show>))
        .route(
            "/admin/api/shows/{id}",
            get(fetch::<Show>).put(update::<Show>).delete(remove::<Show>),
        )
        .route(
            "/admin/api/releases",
            get(list::<Release>).post(create::<Release>),
        )
        .route(
            "/admin/api/releases/{id}",
            get(fetch::<Release>)
                .put(update::<Release>)
                .delete(remove::<Release>),
        )
        .route(
            "/admin/api/media",
            get(list::<MediaItem>).post(create::<MediaItem>),
        )
        .route(
            "/admin/api/media/{id}",
            get(fetch::<MediaItem>)
                .put(update::<MediaItem>)
                .delete(remove::<MediaItem>),
        )
        .route(
            "/admin/api/settings",
            get(current_settings).put(save_settings),
        )
        .route("/admin/api/settings/{id}", put(upsert_settings))
        .layer(middleware::from_fn_with_state(state, guard::require_session))
}

pub async fn index() -> Redirect {
    Redirect::to(DASHBOARD_PATH)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn login_html(site_name: &str, error: Option<&str>, email: &str) -> Html<String> {
    let notice = error
        .map(|message| alert(Severity::Error, message))
        .unwrap_or_default();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Acceso administrativo · {site}</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center; background: #f5f5f5;">
    <form method="post" action="{action}" style="background: #fff; padding: 2.5rem; border-radius: 1rem; max-width: 420px; width: 100%; display: grid; gap: 1rem;">
        <h1 style="margin: 0;">Acceso administrativo</h1>
        <p style="color: #6c757d; margin: 0;">Ingresa tus credenciales para gestionar el contenido del sitio.</p>
        {notice}
        <label>Correo electrónico <input name="email" type="email" required value="{email}" style="width: 100%;"></label>
        <label>Contraseña <input name="password" type="password" required style="width: 100%;"></label>
        <button type="submit">Ingresar</button>
    </form>
</body>
</html>"#,
        site = escape(site_name),
        action = LOGIN_PATH,
        notice = notice,
        email = escape(email),
    ))
}

pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(id) = guard::session_id(&jar, &state.config.auth.cookie_name) {
        if state.auth.session(&id).await.is_some() {
            return Redirect::to(DASHBOARD_PATH).into_response();
        }
    }
    login_html(&state.config.site.name, None, "").into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form.email, &form.password).await {
        Ok((session_id, _)) => (
            guard::remember(jar, &state.config.auth, session_id),
            Redirect::to(DASHBOARD_PATH),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Admin login failed for {}: {}", form.email, e);
            let message = match &e {
                SiteError::Validation(_) => "Ingresa tu correo y contraseña.".to_string(),
                SiteError::Auth(message) => message.clone(),
                _ => "Error de autenticación.".to_string(),
            };
            (
                StatusCode::UNAUTHORIZED,
                login_html(&state.config.site.name, Some(&message), &form.email),
            )
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(id) = guard::session_id(&jar, &state.config.auth.cookie_name) {
        if let Err(e) = state.auth.logout(&id).await {
            tracing::warn!("Remote sign-out failed: {}", e);
        }
    }
    (guard::forget(jar, &state.config.auth), Redirect::to(LOGIN_PATH)).into_response()
}

fn editor_repository(state: &AppState, editor: &Editor) -> ContentRepository {
    state.repository.as_user(&editor.session.access_token)
}

fn delete_button(resource: &str, id: i64) -> String {
    format!(
        r#"<button type="button" onclick="removeItem('{}', {})">Eliminar</button>"#,
        resource, id
    )
}

fn section(resource: &str, heading: &str, table: String) -> String {
    format!(
        r#"<section id="{resource}" style="margin-bottom: 2.5rem;">
            <h2>{heading}</h2>
            {table}
            <details>
                <summary>Nuevo / editar (JSON)</summary>
                <form onsubmit="return saveItem(event, '{resource}')">
                    <input name="item_id" placeholder="id (vacío para crear)">
                    <textarea name="body" rows="6" style="width: 100%;"></textarea>
                    <button type="submit">Guardar</button>
                </form>
            </details>
        </section>"#,
        resource = resource,
        heading = heading,
        table = table,
    )
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
) -> Html<String> {
    let repository = editor_repository(&state, &editor);
    let shows = load(&repository, |repo| async move { repo.list_shows().await });
    let releases = load(&repository, |repo| async move { repo.list_releases().await });
    let media = load(&repository, |repo| async move { repo.list_media_items().await });
    let settings = load(&repository, |repo| async move {
        repo.current_site_settings().await
    });

    let shows = shows.settled().await;
    let releases = releases.settled().await;
    let media = media.settled().await;
    let settings = settings.settled().await;

    let shows_table = render_query(
        &shows,
        |shows: &Vec<Show>| shows.is_empty(),
        "Aún no hay shows registrados.",
        |shows| {
            let rows: String = shows
                .iter()
                .map(|s| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        s.id,
                        format_show_time(s.start_at),
                        escape(&s.city),
                        escape(&s.venue),
                        s.status,
                        delete_button("shows", s.id)
                    )
                })
                .collect();
            format!("<table><thead><tr><th>#</th><th>Fecha</th><th>Ciudad</th><th>Lugar</th><th>Estado</th><th></th></tr></thead><tbody>{}</tbody></table>", rows)
        },
    );

    let releases_table = render_query(
        &releases,
        |releases: &Vec<Release>| releases.is_empty(),
        "Aún no hay lanzamientos registrados.",
        |releases| {
            let rows: String = releases
                .iter()
                .map(|r| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        r.id,
                        escape(&r.title),
                        format_date(r.release_date),
                        delete_button("releases", r.id)
                    )
                })
                .collect();
            format!("<table><thead><tr><th>#</th><th>Título</th><th>Fecha de lanzamiento</th><th></th></tr></thead><tbody>{}</tbody></table>", rows)
        },
    );

    let media_table = render_query(
        &media,
        |items: &Vec<MediaItem>| items.is_empty(),
        "Aún no hay contenido multimedia.",
        |items| {
            let rows: String = items
                .iter()
                .map(|m| {
                    let kind = serde_json::to_value(m.kind)
                        .ok()
                        .and_then(|v| v.as_str().map(str::to_string))
                        .unwrap_or_default();
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        m.id,
                        escape(m.title.as_deref().unwrap_or_default()),
                        kind,
                        m.display_order.map(|o| o.to_string()).unwrap_or_default(),
                        delete_button("media", m.id)
                    )
                })
                .collect();
            format!("<table><thead><tr><th>#</th><th>Título</th><th>Tipo</th><th>Orden</th><th></th></tr></thead><tbody>{}</tbody></table>", rows)
        },
    );

    let settings_block = render_query(
        &settings,
        |settings: &Option<SiteSettings>| settings.is_none(),
        "Aún no hay ajustes guardados.",
        |settings| {
            settings
                .as_ref()
                .and_then(|s| serde_json::to_string_pretty(&s.draft()).ok())
                .map(|json| format!("<pre>{}</pre>", escape(&json)))
                .unwrap_or_default()
        },
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Panel de contenido · {site}</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 2rem; background: #f5f5f5; color: #212529;">
    <div style="max-width: 1100px; margin: 0 auto;">
        <header style="display: flex; justify-content: space-between; align-items: center;">
            <h1>Panel de contenido</h1>
            <form method="post" action="/admin/logout">
                <span>{email}</span> <button type="submit">Cerrar sesión</button>
            </form>
        </header>
        <div id="feedback"></div>
        {shows}
        {releases}
        {media}
        {settings}
    </div>
    <script>
        function feedback(message, ok) {{
            document.getElementById("feedback").textContent = message;
            if (ok) setTimeout(() => location.reload(), 600);
        }}
        async function removeItem(resource, id) {{
            const res = await fetch(`/admin/api/${{resource}}/${{id}}`, {{ method: "DELETE" }});
            feedback(res.ok ? "Elemento eliminado." : (await res.json()).error, res.ok);
        }}
        async function saveItem(event, resource) {{
            event.preventDefault();
            const form = event.target;
            const id = form.elements.item_id.value.trim();
            const url = id ? `/admin/api/${{resource}}/${{id}}` : `/admin/api/${{resource}}`;
            const method = id || resource === "settings" ? "PUT" : "POST";
            const res = await fetch(url, {{ method, headers: {{ "Content-Type": "application/json" }}, body: form.elements.body.value }});
            feedback(res.ok ? "Guardado correctamente." : (await res.json()).error, res.ok);
            return false;
        }}
    </script>
</body>
</html>"#,
        site = escape(&state.config.site.name),
        email = escape(editor.session.email()),
        shows = section("shows", "Shows", shows_table),
        releases = section("releases", "Lanzamientos", releases_table),
        media = section("media", "Media", media_table),
        settings = section("settings", "Hero / EPK", settings_block),
    ))
}

async fn list<E>(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
) -> Result<Json<Vec<E>>>
where
    E: Entity + Serialize,
{
    Ok(Json(editor_repository(&state, &editor).list::<E>().await?))
}

async fn fetch<E>(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<i64>,
) -> Result<Json<E>>
where
    E: Entity + Serialize,
{
    editor_repository(&state, &editor)
        .get::<E>(id)
        .await?
        .map(Json)
        .ok_or_else(|| SiteError::NotFound(format!("{} {}", E::LABEL, id)))
}

async fn create<E>(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Json(draft): Json<E::Draft>,
) -> Result<(StatusCode, Json<E>)>
where
    E: Entity + Serialize,
    E::Draft: DeserializeOwned,
{
    let created = editor_repository(&state, &editor)
        .create::<E>(&draft)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update<E>(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<i64>,
    Json(draft): Json<E::Draft>,
) -> Result<Json<E>>
where
    E: Entity + Serialize,
    E::Draft: DeserializeOwned,
{
    Ok(Json(
        editor_repository(&state, &editor)
            .update::<E>(id, &draft)
            .await?,
    ))
}

async fn remove<E>(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<i64>,
) -> Result<StatusCode>
where
    E: Entity,
{
    editor_repository(&state, &editor).delete::<E>(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn current_settings(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
) -> Result<Json<Option<SiteSettings>>> {
    Ok(Json(
        editor_repository(&state, &editor)
            .current_site_settings()
            .await?,
    ))
}

async fn save_settings(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Json(draft): Json<SiteSettingsDraft>,
) -> Result<Json<SiteSettings>> {
    Ok(Json(
        editor_repository(&state, &editor)
            .save_site_settings(&draft)
            .await?,
    ))
}

async fn upsert_settings(
    State(state): State<AppState>,
    Extension(editor): Extension<Editor>,
    Path(id): Path<i64>,
    Json(draft): Json<SiteSettingsDraft>,
) -> Result<Json<SiteSettings>> {
    Ok(Json(
        editor_repository(&state, &editor)
            .upsert_site_settings(id, &draft)
            .await?,
    ))
}
