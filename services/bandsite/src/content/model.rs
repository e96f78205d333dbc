//! View models for site content

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket availability for a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    Tickets,
    Waitlist,
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowStatus::Tickets => write!(f, "Boletas"),
            ShowStatus::Waitlist => write!(f, "Lista de espera"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub id: i64,
    pub start_at: DateTime<Utc>,
    pub city: String,
    pub venue: String,
    pub status: ShowStatus,
    pub ticket_url: Option<String>,
    pub min_age: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable fields of a show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDraft {
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
}

impl Show {
    pub fn draft(&self) -> ShowDraft {
        ShowDraft {
            start_at: self.start_at,
            city: self.city.clone(),
            venue: self.venue.clone(),
            status: self.status,
            ticket_url: self.ticket_url.clone(),
            min_age: self.min_age,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Streaming links for a release
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseLinks {
    #[serde(default)]
    pub spotify: Option<String>,
    #[serde(default)]
    pub apple_music: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: i64,
    pub title: String,
    pub release_date: NaiveDate,
    pub cover_art_url: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub links: ReleaseLinks,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDraft {
    pub title: String,
    pub release_date: NaiveDate,
    pub cover_art_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub links: ReleaseLinks,
}

impl Release {
    pub fn draft(&self) -> ReleaseDraft {
        ReleaseDraft {
            title: self.title.clone(),
            release_date: self.release_date,
            cover_art_url: self.cover_art_url.clone(),
            description: self.description.clone(),
            genres: self.genres.clone(),
            links: self.links.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Where a media item is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    Instagram,
    Tiktok,
    Spotify,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub media_url: String,
    pub embed_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub platform: Option<Platform>,
    pub display_order: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemDraft {
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
}

impl MediaItem {
    pub fn draft(&self) -> MediaItemDraft {
        MediaItemDraft {
            kind: self.kind,
            title: self.title.clone(),
            description: self.description.clone(),
            media_url: self.media_url.clone(),
            embed_url: self.embed_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            platform: self.platform,
            display_order: self.display_order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub spotify: Option<String>,
}

impl SocialLinks {
    /// Configured links as (network, url) pairs
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Instagram", &self.instagram),
            ("Facebook", &self.facebook),
            ("X", &self.x),
            ("YouTube", &self.youtube),
            ("TikTok", &self.tiktok),
            ("Spotify", &self.spotify),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.as_deref().map(|url| (name, url)))
        .collect()
    }
}

/// Downloadable press asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpkDownload {
    pub label: String,
    pub url: String,
}

/// Hero copy, social links and press kit fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: i64,
    pub hero_tagline: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub hero_video_url: Option<String>,
    pub release_date_label: Option<String>,
    pub playlist_embed_url: Option<String>,
    pub social_links: SocialLinks,
    pub epk_genre: Option<String>,
    pub epk_city: Option<String>,
    pub epk_bio: Option<String>,
    pub press_contact: Option<String>,
    pub epk_downloads: Vec<EpkDownload>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettingsDraft {
    pub hero_tagline: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub hero_video_url: Option<String>,
    pub release_date_label: Option<String>,
    pub playlist_embed_url: Option<String>,
    pub social_links: SocialLinks,
    pub epk_genre: Option<String>,
    pub epk_city: Option<String>,
    pub epk_bio: Option<String>,
    pub press_contact: Option<String>,
    pub epk_downloads: Vec<EpkDownload>,
}

impl SiteSettings {
    pub fn draft(&self) -> SiteSettingsDraft {
        SiteSettingsDraft {
            hero_tagline: self.hero_tagline.clone(),
            hero_title: self.hero_title.clone(),
            hero_description: self.hero_description.clone(),
            hero_video_url: self.hero_video_url.clone(),
            release_date_label: self.release_date_label.clone(),
            playlist_embed_url: self.playlist_embed_url.clone(),
            social_links: self.social_links.clone(),
            epk_genre: self.epk_genre.clone(),
            epk_city: self.epk_city.clone(),
            epk_bio: self.epk_bio.clone(),
            press_contact: self.press_contact.clone(),
            epk_downloads: self.epk_downloads.clone(),
        }
    }
}
