//! Public pages
//!
//! Every page loads its content through a [`ContentQuery`] and never fails:
//! backend errors become inline alerts.

use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Form;
use chrono::Utc;

use super::layout::{
    alert, escape, format_date, format_show_time, page, render_query, Severity,
};
use super::AppState;
use crate::contact::{self, BookingForm, EventType, FieldErrors};
use crate::content::{
    ContentRepository, MediaItem, MediaKind, Release, Show, ShowStatus, SiteSettings,
};
use crate::query::{loader, ContentQuery};
use crate::selection::{self, Countdown};

const DEFAULT_TAGLINE: &str = "Nuevo single";
const DEFAULT_TITLE: &str = "Sonido Elite. Energía en vivo.";

/// Mount a query that loads with a clone of the repository
pub(super) fn load<T, F, Fut>(repository: &ContentRepository, fetch: F) -> ContentQuery<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(ContentRepository) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<T>> + Send + 'static,
{
    let repository = repository.clone();
    ContentQuery::mount(loader(move || fetch(repository.clone())))
}

fn show_row(show: &Show) -> String {
    let action = match (show.status, &show.ticket_url) {
        (ShowStatus::Tickets, Some(url)) => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            escape(url),
            show.status
        ),
        _ => show.status.to_string(),
    };
    let age = show
        .min_age
        .map(|age| format!("+{}", age))
        .unwrap_or_default();
    format!(
        r#"<tr class="show" data-id="{}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
        show.id,
        format_show_time(show.start_at),
        escape(&show.city),
        escape(&show.venue),
        age,
        action
    )
}

fn shows_table(shows: &[&Show]) -> String {
    let rows: String = shows.iter().map(|show| show_row(show)).collect();
    format!(
        r#"<table style="width: 100%; border-collapse: collapse;">
            <thead><tr><th>Fecha</th><th>Ciudad</th><th>Lugar</th><th>Edad</th><th></th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        rows
    )
}

fn release_links(release: &Release) -> String {
    [
        ("Spotify", &release.links.spotify),
        ("Apple Music", &release.links.apple_music),
        ("YouTube", &release.links.youtube),
    ]
    .iter()
    .filter_map(|(label, url)| {
        url.as_deref().map(|url| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escape(url),
                label
            )
        })
    })
    .collect::<Vec<_>>()
    .join(" · ")
}

fn release_card(release: &Release, featured: bool) -> String {
    let heading = if featured { "h2" } else { "h3" };
    let genres = if release.genres.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="genres">{}</p>"#,
            escape(&release.genres.join(" / "))
        )
    };
    let cover = if release.cover_art_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{}" style="max-width: 100%; border-radius: 0.5rem;">"#,
            escape(&release.cover_art_url),
            escape(&release.title)
        )
    };
    format!(
        r#"<article class="release" data-id="{id}">
            {cover}
            <{h}>{title}</{h}>
            <p>{date}</p>
            {genres}
            <p>{description}</p>
            <p>{links}</p>
        </article>"#,
        id = release.id,
        cover = cover,
        h = heading,
        title = escape(&release.title),
        date = format_date(release.release_date),
        genres = genres,
        description = escape(release.description.as_deref().unwrap_or_default()),
        links = release_links(release),
    )
}

fn media_card(item: &MediaItem) -> String {
    let title = item.title.as_deref().unwrap_or_default();
    let body = match (item.kind, &item.embed_url) {
        (MediaKind::Video, Some(embed)) => format!(
            r#"<iframe src="{}" title="{}" allowfullscreen style="width: 100%; aspect-ratio: 16 / 9; border: 0;"></iframe>"#,
            escape(embed),
            escape(title)
        ),
        (MediaKind::Video, None) => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">Ver video</a>"#,
            escape(&item.media_url)
        ),
        (MediaKind::Image, _) => format!(
            r#"<img src="{}" alt="{}" style="max-width: 100%;">"#,
            escape(&item.media_url),
            escape(title)
        ),
    };
    format!(
        r#"<figure class="media" data-id="{}">{}<figcaption><strong>{}</strong> {}</figcaption></figure>"#,
        item.id,
        body,
        escape(title),
        escape(item.description.as_deref().unwrap_or_default())
    )
}

fn countdown_block(show: &Show) -> String {
    let now = Utc::now();
    match Countdown::until(show.start_at, now) {
        Some(countdown) => format!(
            r#"<p class="countdown" id="countdown">{}</p>
            <script>
                const source = new EventSource("/api/countdown");
                source.addEventListener("countdown", (e) => {{
                    document.getElementById("countdown").textContent = JSON.parse(e.data).display;
                }});
                source.addEventListener("ended", () => source.close());
            </script>"#,
            countdown
        ),
        None => String::from(r#"<p class="countdown">¡Gracias por acompañarnos!</p>"#),
    }
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let settings = load(&state.repository, |repo| async move {
        repo.current_site_settings().await
    });
    let shows = load(&state.repository, |repo| async move { repo.list_shows().await });
    let releases = load(&state.repository, |repo| async move { repo.list_releases().await });

    let settings = settings.settled().await;
    let shows = shows.settled().await;
    let releases = releases.settled().await;

    let hero = settings.data.clone().flatten();
    let tagline = hero
        .as_ref()
        .and_then(|s| s.hero_tagline.clone())
        .unwrap_or_else(|| DEFAULT_TAGLINE.to_string());
    let title = hero
        .as_ref()
        .and_then(|s| s.hero_title.clone())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let description = hero
        .as_ref()
        .and_then(|s| s.hero_description.clone())
        .unwrap_or_default();
    let release_label = hero
        .as_ref()
        .and_then(|s| s.release_date_label.as_deref())
        .map(|label| format!("<p>Lanzamiento oficial · {}</p>", escape(label)))
        .unwrap_or_default();
    let video = hero
        .as_ref()
        .and_then(|s| s.hero_video_url.as_deref())
        .map(|url| {
            format!(
                r#"<video autoplay muted loop playsinline src="{}" style="width: 100%; max-height: 420px; object-fit: cover;"></video>"#,
                escape(url)
            )
        })
        .unwrap_or_default();
    let social: String = hero
        .as_ref()
        .map(|s| {
            s.social_links
                .entries()
                .into_iter()
                .map(|(name, url)| {
                    format!(
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a> "#,
                        escape(url),
                        name
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    let settings_error = settings
        .error
        .as_deref()
        .map(|e| alert(Severity::Error, e))
        .unwrap_or_default();

    let next = render_query(
        &shows,
        |shows: &Vec<Show>| shows.is_empty(),
        "Aún no hay shows programados.",
        |shows| match selection::next_show(shows, Utc::now()) {
            Some(show) => format!(
                r#"<div class="next-show"><h3>{} · {}</h3><p>{}</p>{}<a href="/shows">Comprar boletas</a></div>"#,
                escape(&show.city),
                escape(&show.venue),
                format_show_time(show.start_at),
                countdown_block(show)
            ),
            None => String::new(),
        },
    );

    let latest = render_query(
        &releases,
        |releases: &Vec<Release>| releases.is_empty(),
        "Aún no hay lanzamientos registrados.",
        |releases| {
            let (latest, _) = selection::split_latest(releases.clone());
            latest
                .map(|release| release_card(&release, true))
                .unwrap_or_default()
        },
    );

    let content = format!(
        r#"{settings_error}
        <section class="hero">
            {video}
            <span class="tagline">{tagline}</span>
            <h2>{title}</h2>
            <p>{description}</p>
            {release_label}
            <p>{social}</p>
            <p><a href="/musica">Escuchar ahora</a> · <a href="/shows">Ver shows</a></p>
        </section>
        <section><h2>Próximo show</h2>{next}</section>
        <section><h2>Último lanzamiento</h2>{latest}</section>"#,
        settings_error = settings_error,
        video = video,
        tagline = escape(&tagline),
        title = escape(&title),
        description = escape(&description),
        release_label = release_label,
        social = social,
        next = next,
        latest = latest,
    );

    page(&state.config.site.name, "Inicio", "/", &content)
}

pub async fn music(State(state): State<AppState>) -> Html<String> {
    let releases = load(&state.repository, |repo| async move { repo.list_releases().await });
    let settings = load(&state.repository, |repo| async move {
        repo.current_site_settings().await
    });
    let releases = releases.settled().await;
    let settings = settings.settled().await;

    let catalog = render_query(
        &releases,
        |releases: &Vec<Release>| releases.is_empty(),
        "Aún no hay lanzamientos registrados.",
        |releases| {
            let (latest, rest) = selection::split_latest(releases.clone());
            let mut html = latest
                .map(|release| release_card(&release, true))
                .unwrap_or_default();
            if !rest.is_empty() {
                html.push_str("<h2>Catálogo</h2><div class=\"catalog\">");
                for release in &rest {
                    html.push_str(&release_card(release, false));
                }
                html.push_str("</div>");
            }
            html
        },
    );

    let playlist = match &settings.error {
        Some(error) => alert(Severity::Error, error),
        None => settings
            .data
            .clone()
            .flatten()
            .and_then(|s| s.playlist_embed_url)
            .map(|url| {
                format!(
                    r#"<h2>Playlist</h2><iframe src="{}" title="{} Playlist" style="width: 100%; height: 380px; border: 0;"></iframe>"#,
                    escape(&url),
                    escape(&state.config.site.name)
                )
            })
            .unwrap_or_default(),
    };

    page(
        &state.config.site.name,
        "Música",
        "/musica",
        &format!("{}{}", catalog, playlist),
    )
}

pub async fn shows(State(state): State<AppState>) -> Html<String> {
    let shows = load(&state.repository, |repo| async move { repo.list_shows().await });
    let shows = shows.settled().await;
    let now = Utc::now();

    let content = render_query(
        &shows,
        |shows: &Vec<Show>| shows.is_empty(),
        "Aún no hay shows programados.",
        |shows| {
            let upcoming = selection::upcoming_shows(shows, now);
            let past = selection::past_shows(shows, now);
            let mut html = String::from("<h2>Próximos shows</h2>");
            if upcoming.is_empty() {
                html.push_str(&alert(Severity::Info, "No hay fechas próximas por ahora."));
            } else {
                html.push_str(&shows_table(&upcoming));
            }
            if !past.is_empty() {
                html.push_str("<h2>Shows anteriores</h2>");
                html.push_str(&shows_table(&past));
            }
            html
        },
    );

    page(&state.config.site.name, "Shows", "/shows", &content)
}

pub async fn media(State(state): State<AppState>) -> Html<String> {
    let media = load(&state.repository, |repo| async move {
        repo.list_media_items().await
    });
    let media = media.settled().await;

    let content = render_query(
        &media,
        |items: &Vec<MediaItem>| items.is_empty(),
        "Aún no hay contenido multimedia.",
        |items| {
            let cards: String = items.iter().map(media_card).collect();
            format!(
                r#"<div class="gallery" style="display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 1rem;">{}</div>"#,
                cards
            )
        },
    );

    page(&state.config.site.name, "Media", "/media", &content)
}

fn epk_body(settings: &SiteSettings) -> String {
    let field = |value: &Option<String>, fallback: &str| {
        escape(value.as_deref().unwrap_or(fallback))
    };
    let downloads: String = settings
        .epk_downloads
        .iter()
        .map(|d| {
            format!(
                r#"<li><a href="{}" target="_blank" rel="noopener">{}</a></li>"#,
                escape(&d.url),
                escape(&d.label)
            )
        })
        .collect();
    let social: String = settings
        .social_links
        .entries()
        .into_iter()
        .map(|(name, url)| format!(r#"<li><a href="{}">{}</a></li>"#, escape(url), name))
        .collect();

    format!(
        r#"<p><strong>Género:</strong> {genre}</p>
        <p><strong>Ciudad base:</strong> {city}</p>
        <p><strong>Bio corta:</strong> {bio}</p>
        <p><strong>Para prensa:</strong> {press}</p>
        <h2>Descargas</h2><ul>{downloads}</ul>
        <h2>Redes</h2><ul>{social}</ul>"#,
        genre = field(&settings.epk_genre, "-"),
        city = field(&settings.epk_city, "-"),
        bio = field(&settings.epk_bio, "Actualiza la bio desde el panel de contenido."),
        press = field(
            &settings.press_contact,
            "Sin información de contacto definida."
        ),
        downloads = downloads,
        social = social,
    )
}

pub async fn epk(State(state): State<AppState>) -> Html<String> {
    let settings = load(&state.repository, |repo| async move {
        repo.current_site_settings().await
    });
    let settings = settings.settled().await;

    let content = render_query(
        &settings,
        |settings: &Option<SiteSettings>| settings.is_none(),
        "No hay contenido configurado para el press kit todavía.",
        |settings| settings.as_ref().map(epk_body).unwrap_or_default(),
    );

    page(
        &state.config.site.name,
        "EPK · Electronic Press Kit",
        "/epk",
        &content,
    )
}

fn field_error(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|message| {
            format!(
                r#"<small class="field-error" style="color: #f28b82;">{}</small>"#,
                escape(message)
            )
        })
        .unwrap_or_default()
}

fn contact_form(values: &BookingForm, errors: &FieldErrors) -> String {
    let options: String = EventType::ALL
        .iter()
        .map(|t| {
            let selected = if values.event_type == t.value() {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{}"{}>{}</option>"#, t.value(), selected, t)
        })
        .collect();

    format!(
        r#"<form method="post" action="/contacto" style="display: grid; gap: 0.75rem; max-width: 560px;">
            <label>Nombre de contacto <input name="name" value="{name}"></label>{name_err}
            <label>Correo electrónico <input name="email" type="email" value="{email}"></label>{email_err}
            <label>Tipo de evento <select name="event_type"><option value=""></option>{options}</select></label>{type_err}
            <label>Presupuesto estimado <input name="budget" value="{budget}"></label>{budget_err}
            <label>Fecha tentativa <input name="event_date" type="date" value="{date}"></label>{date_err}
            <label>Mensaje <textarea name="message" rows="4">{message}</textarea></label>{message_err}
            <button type="submit">Enviar solicitud</button>
        </form>"#,
        name = escape(&values.name),
        name_err = field_error(errors, "name"),
        email = escape(&values.email),
        email_err = field_error(errors, "email"),
        options = options,
        type_err = field_error(errors, "event_type"),
        budget = escape(&values.budget),
        budget_err = field_error(errors, "budget"),
        date = escape(&values.event_date),
        date_err = field_error(errors, "event_date"),
        message = escape(&values.message),
        message_err = field_error(errors, "message"),
    )
}

fn contact_page(
    state: &AppState,
    notice: Option<(Severity, &str)>,
    values: &BookingForm,
    errors: &FieldErrors,
) -> Html<String> {
    let notice = notice
        .map(|(severity, message)| alert(severity, message))
        .unwrap_or_default();
    let email = escape(&state.config.site.booking_email);
    let content = format!(
        r#"{notice}
        <div style="display: flex; flex-wrap: wrap; gap: 2rem;">
            {form}
            <aside>
                <h2>Booking directo</h2>
                <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
                <p><a href="/epk">Press kit &amp; recursos</a></p>
            </aside>
        </div>"#,
        notice = notice,
        form = contact_form(values, errors),
        email = email,
    );
    page(&state.config.site.name, "Contacto", "/contacto", &content)
}

pub async fn contact(State(state): State<AppState>) -> Html<String> {
    contact_page(&state, None, &BookingForm::default(), &FieldErrors::new())
}

pub async fn submit_contact(
    State(state): State<AppState>,
    Form(form): Form<BookingForm>,
) -> impl IntoResponse {
    match form.validate() {
        Ok(request) => {
            contact::submit(&request);
            (
                StatusCode::OK,
                contact_page(
                    &state,
                    Some((Severity::Success, contact::SUCCESS_MESSAGE)),
                    &BookingForm::default(),
                    &FieldErrors::new(),
                ),
            )
        }
        Err(errors) => {
            tracing::debug!("Booking form rejected: {:?}", errors.keys());
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                contact_page(&state, None, &form, &errors),
            )
        }
    }
}
