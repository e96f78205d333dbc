//! Wire rows and the field mapping to and from view models
//!
//! Rows use the table store's snake_case column names. Reading coalesces
//! missing or null optional columns; list columns that are not arrays read
//! as empty lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::model::{
    EpkDownload, MediaItem, MediaItemDraft, MediaKind, Platform, Release, ReleaseDraft,
    ReleaseLinks, Show, ShowDraft, ShowStatus, SiteSettings, SiteSettingsDraft, SocialLinks,
};

/// Null reads as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything but an array reads as an empty list
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Deserialize)]
pub struct ShowRow {
    pub id: i64,
    pub start_at: DateTime<Utc>,
    pub city: String,
    pub venue: String,
    pub status: ShowStatus,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub min_age: Option<u32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ShowRow> for Show {
    fn from(row: ShowRow) -> Self {
        Show {
            id: row.id,
            start_at: row.start_at,
            city: row.city,
            venue: row.venue,
            status: row.status,
            ticket_url: row.ticket_url,
            min_age: row.min_age,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShowWrite<'a> {
    start_at: &'a DateTime<Utc>,
    city: &'a str,
    venue: &'a str,
    status: ShowStatus,
    ticket_url: Option<&'a str>,
    min_age: Option<u32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl ShowDraft {
    pub fn to_row(&self) -> Value {
        to_value(&ShowWrite {
            start_at: &self.start_at,
            city: &self.city,
            venue: &self.venue,
            status: self.status,
            ticket_url: self.ticket_url.as_deref(),
            min_age: self.min_age,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRow {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_art_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub apple_music_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ReleaseRow> for Release {
    fn from(row: ReleaseRow) -> Self {
        Release {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
            cover_art_url: row.cover_art_url,
            description: row.description,
            genres: row.genres,
            links: ReleaseLinks {
                spotify: row.spotify_url,
                apple_music: row.apple_music_url,
                youtube: row.youtube_url,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReleaseWrite<'a> {
    title: &'a str,
    release_date: &'a NaiveDate,
    cover_art_url: &'a str,
    description: Option<&'a str>,
    genres: &'a [String],
    spotify_url: Option<&'a str>,
    apple_music_url: Option<&'a str>,
    youtube_url: Option<&'a str>,
}

impl ReleaseDraft {
    pub fn to_row(&self) -> Value {
        to_value(&ReleaseWrite {
            title: &self.title,
            release_date: &self.release_date,
            cover_art_url: &self.cover_art_url,
            description: self.description.as_deref(),
            genres: &self.genres,
            spotify_url: self.links.spotify.as_deref(),
            apple_music_url: self.links.apple_music.as_deref(),
            youtube_url: self.links.youtube.as_deref(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaItemRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub media_url: String,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<MediaItemRow> for MediaItem {
    fn from(row: MediaItemRow) -> Self {
        MediaItem {
            id: row.id,
            kind: row.kind,
            title: row.title,
            description: row.description,
            media_url: row.media_url,
            embed_url: row.embed_url,
            thumbnail_url: row.thumbnail_url,
            platform: row.platform,
            display_order: row.display_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct MediaItemWrite<'a> {
    #[serde(rename = "type")]
    kind: MediaKind,
    title: Option<&'a str>,
    description: Option<&'a str>,
    media_url: &'a str,
    embed_url: Option<&'a str>,
    thumbnail_url: Option<&'a str>,
    platform: Option<Platform>,
    display_order: Option<i32>,
}

impl MediaItemDraft {
    pub fn to_row(&self) -> Value {
        to_value(&MediaItemWrite {
            kind: self.kind,
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            media_url: &self.media_url,
            embed_url: self.embed_url.as_deref(),
            thumbnail_url: self.thumbnail_url.as_deref(),
            platform: self.platform,
            display_order: self.display_order,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SiteSettingsRow {
    pub id: i64,
    #[serde(default)]
    pub hero_tagline: Option<String>,
    #[serde(default)]
    pub hero_title: Option<String>,
    #[serde(default)]
    pub hero_description: Option<String>,
    #[serde(default)]
    pub hero_video_url: Option<String>,
    #[serde(default)]
    pub release_date_label: Option<String>,
    #[serde(default)]
    pub playlist_embed_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: SocialLinks,
    #[serde(default)]
    pub epk_genre: Option<String>,
    #[serde(default)]
    pub epk_city: Option<String>,
    #[serde(default)]
    pub epk_bio: Option<String>,
    #[serde(default)]
    pub press_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub epk_downloads: Vec<EpkDownload>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SiteSettingsRow> for SiteSettings {
    fn from(row: SiteSettingsRow) -> Self {
        SiteSettings {
            id: row.id,
            hero_tagline: row.hero_tagline,
            hero_title: row.hero_title,
            hero_description: row.hero_description,
            hero_video_url: row.hero_video_url,
            release_date_label: row.release_date_label,
            playlist_embed_url: row.playlist_embed_url,
            social_links: row.social_links,
            epk_genre: row.epk_genre,
            epk_city: row.epk_city,
            epk_bio: row.epk_bio,
            press_contact: row.press_contact,
            epk_downloads: row.epk_downloads,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct SiteSettingsWrite<'a> {
    hero_tagline: Option<&'a str>,
    hero_title: Option<&'a str>,
    hero_description: Option<&'a str>,
    hero_video_url: Option<&'a str>,
    release_date_label: Option<&'a str>,
    playlist_embed_url: Option<&'a str>,
    social_links: &'a SocialLinks,
    epk_genre: Option<&'a str>,
    epk_city: Option<&'a str>,
    epk_bio: Option<&'a str>,
    press_contact: Option<&'a str>,
    epk_downloads: &'a [EpkDownload],
}

impl SiteSettingsDraft {
    pub fn to_row(&self) -> Value {
        to_value(&SiteSettingsWrite {
            hero_tagline: self.hero_tagline.as_deref(),
            hero_title: self.hero_title.as_deref(),
            hero_description: self.hero_description.as_deref(),
            hero_video_url: self.hero_video_url.as_deref(),
            release_date_label: self.release_date_label.as_deref(),
            playlist_embed_url: self.playlist_embed_url.as_deref(),
            social_links: &self.social_links,
            epk_genre: self.epk_genre.as_deref(),
            epk_city: self.epk_city.as_deref(),
            epk_bio: self.epk_bio.as_deref(),
            press_contact: self.press_contact.as_deref(),
            epk_downloads: &self.epk_downloads,
        })
    }
}

// Plain structs of strings, numbers and options cannot fail to serialize.
fn to_value<T: Serialize>(row: &T) -> Value {
    serde_json::to_value(row).unwrap_or(Value::Null)
}
