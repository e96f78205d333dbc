//! Content repository: list/get/create/update/delete for each entity

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::model::{
    MediaItem, MediaItemDraft, Release, ReleaseDraft, Show, ShowDraft, SiteSettings,
    SiteSettingsDraft,
};
use super::rows::{MediaItemRow, ReleaseRow, ShowRow, SiteSettingsRow};
use crate::store::{Query, TableStore};
use crate::{Result, SiteError};

/// A content entity stored in its own table
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Lower-case name used in error messages
    const LABEL: &'static str;

    type Row: DeserializeOwned + Into<Self>;
    type Draft;

    fn list_query() -> Query {
        Query::new()
    }

    fn draft_row(draft: &Self::Draft) -> Value;

    fn from_value(value: Value) -> Result<Self> {
        let row: Self::Row = serde_json::from_value(value)?;
        Ok(row.into())
    }
}

impl Entity for Show {
    const TABLE: &'static str = "shows";
    const LABEL: &'static str = "show";
    type Row = ShowRow;
    type Draft = ShowDraft;

    fn list_query() -> Query {
        Query::new().order("start_at", true)
    }

    fn draft_row(draft: &ShowDraft) -> Value {
        draft.to_row()
    }
}

impl Entity for Release {
    const TABLE: &'static str = "releases";
    const LABEL: &'static str = "release";
    type Row = ReleaseRow;
    type Draft = ReleaseDraft;

    fn list_query() -> Query {
        Query::new().order("release_date", false)
    }

    fn draft_row(draft: &ReleaseDraft) -> Value {
        draft.to_row()
    }
}

impl Entity for MediaItem {
    const TABLE: &'static str = "media_items";
    const LABEL: &'static str = "media item";
    type Row = MediaItemRow;
    type Draft = MediaItemDraft;

    fn list_query() -> Query {
        Query::new()
            .order_nulls_last("display_order", true)
            .order("created_at", false)
    }

    fn draft_row(draft: &MediaItemDraft) -> Value {
        draft.to_row()
    }
}

impl Entity for SiteSettings {
    const TABLE: &'static str = "site_settings";
    const LABEL: &'static str = "site settings";
    type Row = SiteSettingsRow;
    type Draft = SiteSettingsDraft;

    fn draft_row(draft: &SiteSettingsDraft) -> Value {
        draft.to_row()
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reads and writes site content through the table store
#[derive(Debug, Clone)]
pub struct ContentRepository {
    store: TableStore,
}

impl ContentRepository {
    pub fn new(store: TableStore) -> Self {
        Self { store }
    }

    /// A repository whose writes are made as the signed-in editor
    pub fn as_user(&self, access_token: &str) -> Self {
        Self {
            store: self.store.with_access_token(access_token),
        }
    }

    pub async fn list<E: Entity>(&self) -> Result<Vec<E>> {
        let rows = self.store.select(E::TABLE, &E::list_query()).await?;
        tracing::debug!("Loaded {} rows from {}", rows.len(), E::TABLE);
        rows.into_iter().map(E::from_value).collect()
    }

    pub async fn get<E: Entity>(&self, id: i64) -> Result<Option<E>> {
        self.store
            .select_one(E::TABLE, &Query::new().eq("id", id))
            .await?
            .map(E::from_value)
            .transpose()
    }

    pub async fn create<E: Entity>(&self, draft: &E::Draft) -> Result<E> {
        let row = self
            .store
            .insert(E::TABLE, &E::draft_row(draft))
            .await?
            .ok_or_else(|| SiteError::NotSaved(format!("Unable to create {}", E::LABEL)))?;
        let created = E::from_value(row)?;
        tracing::info!("Created {} in {}", E::LABEL, E::TABLE);
        Ok(created)
    }

    pub async fn update<E: Entity>(&self, id: i64, draft: &E::Draft) -> Result<E> {
        let row = self
            .store
            .update(E::TABLE, id, &E::draft_row(draft))
            .await?
            .ok_or_else(|| {
                SiteError::NotFound(format!(
                    "{} with id {} was not updated",
                    capitalize(E::LABEL),
                    id
                ))
            })?;
        tracing::info!("Updated {} {}", E::LABEL, id);
        E::from_value(row)
    }

    pub async fn delete<E: Entity>(&self, id: i64) -> Result<()> {
        self.store.delete(E::TABLE, id).await?;
        tracing::info!("Deleted {} {}", E::LABEL, id);
        Ok(())
    }

    pub async fn list_shows(&self) -> Result<Vec<Show>> {
        self.list::<Show>().await
    }

    pub async fn get_show(&self, id: i64) -> Result<Option<Show>> {
        self.get::<Show>(id).await
    }

    pub async fn create_show(&self, draft: &ShowDraft) -> Result<Show> {
        self.create::<Show>(draft).await
    }

    pub async fn update_show(&self, id: i64, draft: &ShowDraft) -> Result<Show> {
        self.update::<Show>(id, draft).await
    }

    pub async fn delete_show(&self, id: i64) -> Result<()> {
        self.delete::<Show>(id).await
    }

    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        self.list::<Release>().await
    }

    pub async fn get_release(&self, id: i64) -> Result<Option<Release>> {
        self.get::<Release>(id).await
    }

    pub async fn create_release(&self, draft: &ReleaseDraft) -> Result<Release> {
        self.create::<Release>(draft).await
    }

    pub async fn update_release(&self, id: i64, draft: &ReleaseDraft) -> Result<Release> {
        self.update::<Release>(id, draft).await
    }

    pub async fn delete_release(&self, id: i64) -> Result<()> {
        self.delete::<Release>(id).await
    }

    pub async fn list_media_items(&self) -> Result<Vec<MediaItem>> {
        self.list::<MediaItem>().await
    }

    pub async fn get_media_item(&self, id: i64) -> Result<Option<MediaItem>> {
        self.get::<MediaItem>(id).await
    }

    pub async fn create_media_item(&self, draft: &MediaItemDraft) -> Result<MediaItem> {
        self.create::<MediaItem>(draft).await
    }

    pub async fn update_media_item(&self, id: i64, draft: &MediaItemDraft) -> Result<MediaItem> {
        self.update::<MediaItem>(id, draft).await
    }

    pub async fn delete_media_item(&self, id: i64) -> Result<()> {
        self.delete::<MediaItem>(id).await
    }

    pub async fn list_site_settings(&self) -> Result<Vec<SiteSettings>> {
        self.list::<SiteSettings>().await
    }

    pub async fn get_site_settings(&self, id: i64) -> Result<Option<SiteSettings>> {
        self.get::<SiteSettings>(id).await
    }

    pub async fn create_site_settings(&self, draft: &SiteSettingsDraft) -> Result<SiteSettings> {
        self.create::<SiteSettings>(draft).await
    }

    pub async fn update_site_settings(
        &self,
        id: i64,
        draft: &SiteSettingsDraft,
    ) -> Result<SiteSettings> {
        self.update::<SiteSettings>(id, draft).await
    }

    pub async fn delete_site_settings(&self, id: i64) -> Result<()> {
        self.delete::<SiteSettings>(id).await
    }

    /// The settings row the public pages read: the first one, if any
    pub async fn current_site_settings(&self) -> Result<Option<SiteSettings>> {
        self.store
            .select_one(SiteSettings::TABLE, &SiteSettings::list_query())
            .await?
            .map(SiteSettings::from_value)
            .transpose()
    }

    /// Create or replace the settings row with the given id
    pub async fn upsert_site_settings(
        &self,
        id: i64,
        draft: &SiteSettingsDraft,
    ) -> Result<SiteSettings> {
        let mut row = draft.to_row();
        if let Value::Object(columns) = &mut row {
            columns.insert("id".to_string(), Value::from(id));
        }
        let saved = self
            .store
            .upsert(SiteSettings::TABLE, &row)
            .await?
            .ok_or_else(|| SiteError::NotSaved("Unable to save site settings".to_string()))?;
        SiteSettings::from_value(saved)
    }

    /// Update the current settings row, or create the first one
    pub async fn save_site_settings(&self, draft: &SiteSettingsDraft) -> Result<SiteSettings> {
        match self.current_site_settings().await? {
            Some(current) => self.update_site_settings(current.id, draft).await,
            None => self.create_site_settings(draft).await,
        }
    }
}
