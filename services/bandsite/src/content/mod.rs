//! Site content: view models, wire rows and the repository

pub mod model;
pub mod repository;
pub mod rows;

pub use model::{
    EpkDownload, MediaItem, MediaItemDraft, MediaKind, Platform, Release, ReleaseDraft,
    ReleaseLinks, Show, ShowDraft, ShowStatus, SiteSettings, SiteSettingsDraft, SocialLinks,
};
pub use repository::{ContentRepository, Entity};
