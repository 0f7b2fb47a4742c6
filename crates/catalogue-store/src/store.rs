// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`CatalogueStore`]: the typed facade that `device-registry`, `scene-engine`,
//! `graylogic-auth` and `graylogic-api` actually depend on. Nobody outside
//! this crate touches [`crate::queries`] or a raw [`rusqlite::Connection`]
//! directly.

use std::path::Path;

use chrono::Utc;
use graylogic_core::model::*;
use graylogic_core::value::StateMap;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::executor::AsyncDb;
use crate::queries;

#[derive(Clone)]
pub struct CatalogueStore {
    db: AsyncDb,
}

impl CatalogueStore {
    pub async fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self { db: AsyncDb::open(path).await? })
    }

    #[cfg(any(test, feature = "test-util"))]
    pub async fn open_in_memory() -> StoreResult<Self> {
        Ok(Self { db: AsyncDb::open_in_memory().await? })
    }

    pub fn path(&self) -> &str {
        self.db.path()
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        self.db.health_check().await
    }

    // -- site --

    pub async fn get_site(&self) -> StoreResult<Option<Site>> {
        self.db.call(|conn| queries::get_site(conn)).await
    }

    pub async fn upsert_site(&self, site: Site) -> StoreResult<()> {
        self.db.call(move |conn| queries::upsert_site(conn, &site)).await
    }

    // -- area --

    pub async fn insert_area(&self, area: Area) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_area(conn, &area)).await
    }

    pub async fn get_area(&self, id: Uuid) -> StoreResult<Option<Area>> {
        self.db.call(move |conn| queries::get_area(conn, id)).await
    }

    pub async fn list_areas(&self) -> StoreResult<Vec<Area>> {
        self.db.call(queries::list_areas).await
    }

    pub async fn update_area(&self, area: Area) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_area(conn, &area)).await
    }

    pub async fn delete_area(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_area(conn, id)).await
    }

    // -- room --

    pub async fn insert_room(&self, room: Room) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_room(conn, &room)).await
    }

    pub async fn get_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        self.db.call(move |conn| queries::get_room(conn, id)).await
    }

    pub async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        self.db.call(queries::list_rooms).await
    }

    pub async fn update_room(&self, room: Room) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_room(conn, &room)).await
    }

    pub async fn delete_room(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_room(conn, id)).await
    }

    // -- device --

    pub async fn insert_device(&self, device: Device) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_device(conn, &device)).await
    }

    pub async fn get_device(&self, id: Uuid) -> StoreResult<Option<Device>> {
        self.db.call(move |conn| queries::get_device(conn, id)).await
    }

    pub async fn get_device_by_slug(&self, slug: String) -> StoreResult<Option<Device>> {
        self.db.call(move |conn| queries::get_device_by_slug(conn, &slug)).await
    }

    pub async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        self.db.call(queries::list_devices).await
    }

    pub async fn list_devices_by_room(&self, room_id: Uuid) -> StoreResult<Vec<Device>> {
        self.db.call(move |conn| queries::list_devices_by_room(conn, room_id)).await
    }

    pub async fn update_device_fields(
        &self,
        id: Uuid,
        name: Option<String>,
        room_id: Option<Option<Uuid>>,
    ) -> StoreResult<()> {
        self.db
            .call(move |conn| queries::update_device_fields(conn, id, name.as_deref(), room_id))
            .await
    }

    pub async fn merge_device_state(&self, id: Uuid, partial: StateMap) -> StoreResult<Device> {
        self.db.call(move |conn| queries::merge_device_state(conn, id, &partial)).await
    }

    pub async fn update_device_health(&self, id: Uuid, health: DeviceHealth) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_device_health(conn, id, health)).await
    }

    pub async fn delete_device(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_device(conn, id)).await
    }

    // -- group-address bindings --

    pub async fn insert_binding(&self, binding: GroupAddressBinding) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_binding(conn, &binding)).await
    }

    pub async fn list_all_bindings(&self) -> StoreResult<Vec<GroupAddressBinding>> {
        self.db.call(queries::list_all_bindings).await
    }

    pub async fn list_bindings_by_device(&self, device_id: Uuid) -> StoreResult<Vec<GroupAddressBinding>> {
        self.db.call(move |conn| queries::list_bindings_by_device(conn, device_id)).await
    }

    /// Replace every binding owned by `device_id` in one call.
    pub async fn replace_bindings_for_device(
        &self,
        device_id: Uuid,
        bindings: Vec<GroupAddressBinding>,
    ) -> StoreResult<()> {
        self.db
            .call(move |conn| {
                queries::delete_bindings_by_device(conn, device_id)?;
                for binding in &bindings {
                    queries::insert_binding(conn, binding)?;
                }
                Ok(())
            })
            .await
    }

    // -- scene --

    pub async fn get_scene(&self, id: Uuid) -> StoreResult<Option<Scene>> {
        self.db.call(move |conn| queries::get_scene(conn, id)).await
    }

    pub async fn get_scene_by_slug(&self, slug: String) -> StoreResult<Option<Scene>> {
        self.db.call(move |conn| queries::get_scene_by_slug(conn, &slug)).await
    }

    pub async fn list_scenes(&self) -> StoreResult<Vec<Scene>> {
        self.db.call(queries::list_scenes).await
    }

    pub async fn insert_scene(&self, scene: Scene) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_scene(conn, &scene)).await
    }

    pub async fn replace_scene(&self, scene: Scene) -> StoreResult<()> {
        self.db.call(move |conn| queries::replace_scene(conn, &scene)).await
    }

    pub async fn delete_scene(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_scene(conn, id)).await
    }

    // -- scene execution --

    pub async fn insert_execution(&self, exec: SceneExecution) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_execution(conn, &exec)).await
    }

    pub async fn update_execution(&self, exec: SceneExecution) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_execution(conn, &exec)).await
    }

    pub async fn list_executions_by_scene(&self, scene_id: Uuid) -> StoreResult<Vec<SceneExecution>> {
        self.db.call(move |conn| queries::list_executions_by_scene(conn, scene_id)).await
    }

    // -- users / sessions / panels --

    pub async fn insert_user(&self, user: User) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_user(conn, &user)).await
    }

    pub async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.db.call(move |conn| queries::get_user(conn, id)).await
    }

    pub async fn get_user_by_username(&self, username: String) -> StoreResult<Option<User>> {
        self.db.call(move |conn| queries::get_user_by_username(conn, &username)).await
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.db.call(queries::list_users).await
    }

    pub async fn update_user(&self, user: User) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_user(conn, &user)).await
    }

    pub async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_user(conn, id)).await
    }

    pub async fn insert_session(&self, session: Session) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_session(conn, &session)).await
    }

    pub async fn get_session_by_token_hash(&self, token_hash: String) -> StoreResult<Option<Session>> {
        self.db.call(move |conn| queries::get_session_by_token_hash(conn, &token_hash)).await
    }

    pub async fn revoke_session(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::revoke_session(conn, id)).await
    }

    pub async fn insert_panel(&self, panel: Panel) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_panel(conn, &panel)).await
    }

    pub async fn list_panels(&self) -> StoreResult<Vec<Panel>> {
        self.db.call(queries::list_panels).await
    }

    pub async fn get_panel_by_token_hash(&self, token_hash: String) -> StoreResult<Option<Panel>> {
        self.db.call(move |conn| queries::get_panel_by_token_hash(conn, &token_hash)).await
    }

    pub async fn get_panel(&self, id: Uuid) -> StoreResult<Option<Panel>> {
        self.db.call(move |conn| queries::get_panel(conn, id)).await
    }

    pub async fn update_panel(&self, panel: Panel) -> StoreResult<()> {
        self.db.call(move |conn| queries::update_panel(conn, &panel)).await
    }

    pub async fn delete_panel(&self, id: Uuid) -> StoreResult<()> {
        self.db.call(move |conn| queries::delete_panel(conn, id)).await
    }

    // -- audit --

    pub async fn insert_audit_entry(&self, entry: AuditEntry) -> StoreResult<()> {
        self.db.call(move |conn| queries::insert_audit_entry(conn, &entry)).await
    }

    pub async fn list_audit_entries(&self, limit: u32) -> StoreResult<Vec<AuditEntry>> {
        self.db.call(move |conn| queries::list_audit_entries(conn, limit)).await
    }

    // -- discovery --

    pub async fn touch_discovery(&self, address: String) -> StoreResult<()> {
        let now = Utc::now();
        self.db.call(move |conn| queries::touch_discovery(conn, &address, now)).await
    }

    pub async fn list_discovery_records(&self) -> StoreResult<Vec<DiscoveryRecord>> {
        self.db.call(queries::list_discovery_records).await
    }

    pub async fn close(self) -> StoreResult<()> {
        self.db.close().await
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
