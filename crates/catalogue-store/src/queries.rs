// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standalone query functions over a plain `&rusqlite::Connection`. Every
//! function here runs inside [`crate::executor::AsyncDb::call`] on the
//! dedicated SQLite thread: no crypto, no other locks, no network calls.

use chrono::{DateTime, Utc};
use graylogic_core::model::*;
use graylogic_core::value::{Capability, StateMap};
use graylogic_core::Slug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

fn parse_dt(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}

fn parse_uuid(raw: String) -> StoreResult<Uuid> {
    Uuid::parse_str(&raw).map_err(|e| StoreError::InvalidData(format!("bad uuid {raw:?}: {e}")))
}

fn parse_slug(raw: String) -> StoreResult<Slug> {
    Slug::new(raw).map_err(|e| StoreError::InvalidData(e.to_string()))
}

// ==========================================
// Site
// ==========================================

fn row_to_site(row: &Row) -> rusqlite::Result<(String, String, String, Option<f64>, Option<f64>, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

pub fn get_site(conn: &Connection) -> StoreResult<Option<Site>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, timezone, latitude, longitude, mode, allowed_modes FROM site LIMIT 1",
    )?;
    let row = stmt.query_row([], row_to_site).optional()?;
    let Some((id, name, timezone, latitude, longitude, mode, allowed_modes)) = row else {
        return Ok(None);
    };
    Ok(Some(Site {
        id: parse_uuid(id)?,
        name,
        timezone,
        latitude,
        longitude,
        mode,
        allowed_modes: serde_json::from_str(&allowed_modes)?,
    }))
}

pub fn upsert_site(conn: &Connection, site: &Site) -> StoreResult<()> {
    conn.execute("DELETE FROM site", [])?;
    conn.execute(
        "INSERT INTO site (id, name, timezone, latitude, longitude, mode, allowed_modes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            site.id.to_string(),
            site.name,
            site.timezone,
            site.latitude,
            site.longitude,
            site.mode,
            serde_json::to_string(&site.allowed_modes)?,
        ],
    )?;
    Ok(())
}

// ==========================================
// Area
// ==========================================

fn row_to_area(row: &Row) -> StoreResult<Area> {
    Ok(Area {
        id: parse_uuid(row.get(0)?)?,
        slug: parse_slug(row.get(1)?)?,
        name: row.get(2)?,
        area_type: row.get(3)?,
        icon: row.get(4)?,
        sort_order: row.get(5)?,
    })
}

const AREA_COLUMNS: &str = "id, slug, name, area_type, icon, sort_order";

pub fn insert_area(conn: &Connection, area: &Area) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO area ({AREA_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
        params![
            area.id.to_string(),
            area.slug.as_str(),
            area.name,
            area.area_type,
            area.icon,
            area.sort_order
        ],
    )
    .map_err(map_unique_violation("area"))?;
    Ok(())
}

pub fn get_area(conn: &Connection, id: Uuid) -> StoreResult<Option<Area>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {AREA_COLUMNS} FROM area WHERE id = ?1"))?;
    stmt.query_row(params![id.to_string()], |r| Ok(row_to_area(r))).optional()?.transpose()
}

pub fn list_areas(conn: &Connection) -> StoreResult<Vec<Area>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {AREA_COLUMNS} FROM area ORDER BY sort_order, name"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_area(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn update_area(conn: &Connection, area: &Area) -> StoreResult<()> {
    let n = conn.execute(
        "UPDATE area SET name = ?2, area_type = ?3, icon = ?4, sort_order = ?5 WHERE id = ?1",
        params![area.id.to_string(), area.name, area.area_type, area.icon, area.sort_order],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("area {}", area.id)));
    }
    Ok(())
}

pub fn delete_area(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let rooms: i64 = conn.query_row(
        "SELECT COUNT(*) FROM room WHERE area_id = ?1",
        params![id.to_string()],
        |r| r.get(0),
    )?;
    if rooms > 0 {
        return Err(StoreError::HasDependents(format!("area {id} still has {rooms} room(s)")));
    }
    let n = conn.execute("DELETE FROM area WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("area {id}")));
    }
    Ok(())
}

// ==========================================
// Room
// ==========================================

fn row_to_room(row: &Row) -> StoreResult<Room> {
    Ok(Room {
        id: parse_uuid(row.get(0)?)?,
        area_id: parse_uuid(row.get(1)?)?,
        slug: parse_slug(row.get(2)?)?,
        name: row.get(3)?,
        room_type: row.get(4)?,
        capacity_hint: row.get(5)?,
        sort_order: row.get(6)?,
    })
}

const ROOM_COLUMNS: &str = "id, area_id, slug, name, room_type, capacity_hint, sort_order";

pub fn insert_room(conn: &Connection, room: &Room) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO room ({ROOM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            room.id.to_string(),
            room.area_id.to_string(),
            room.slug.as_str(),
            room.name,
            room.room_type,
            room.capacity_hint,
            room.sort_order
        ],
    )
    .map_err(map_unique_violation("room"))?;
    Ok(())
}

pub fn get_room(conn: &Connection, id: Uuid) -> StoreResult<Option<Room>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {ROOM_COLUMNS} FROM room WHERE id = ?1"))?;
    stmt.query_row(params![id.to_string()], |r| Ok(row_to_room(r))).optional()?.transpose()
}

pub fn list_rooms(conn: &Connection) -> StoreResult<Vec<Room>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {ROOM_COLUMNS} FROM room ORDER BY sort_order, name"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_room(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn update_room(conn: &Connection, room: &Room) -> StoreResult<()> {
    let n = conn.execute(
        "UPDATE room SET area_id = ?2, name = ?3, room_type = ?4, capacity_hint = ?5, sort_order = ?6
         WHERE id = ?1",
        params![
            room.id.to_string(),
            room.area_id.to_string(),
            room.name,
            room.room_type,
            room.capacity_hint,
            room.sort_order
        ],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("room {}", room.id)));
    }
    Ok(())
}

/// Deletes the room; devices in it become unassigned rather than cascaded
/// (§3 Device: "when its room is deleted it becomes unassigned").
pub fn delete_room(conn: &Connection, id: Uuid) -> StoreResult<()> {
    conn.execute("UPDATE device SET room_id = NULL WHERE room_id = ?1", params![id.to_string()])?;
    conn.execute("UPDATE scene SET room_id = NULL WHERE room_id = ?1", params![id.to_string()])?;
    let n = conn.execute("DELETE FROM room WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("room {id}")));
    }
    Ok(())
}

// ==========================================
// Device
// ==========================================

const DEVICE_COLUMNS: &str = "id, slug, name, domain, device_type, room_id, protocol, address, \
     capabilities, state, health, config, version, created_at, updated_at";

fn row_to_device(row: &Row) -> StoreResult<Device> {
    let address_json: String = row.get(7)?;
    let capabilities_json: String = row.get(8)?;
    let state_json: String = row.get(9)?;
    let health_str: String = row.get(10)?;
    let config_json: String = row.get(11)?;
    let room_id: Option<String> = row.get(5)?;
    let domain_str: String = row.get(3)?;
    let protocol_str: String = row.get(6)?;

    Ok(Device {
        id: parse_uuid(row.get(0)?)?,
        slug: parse_slug(row.get(1)?)?,
        name: row.get(2)?,
        domain: parse_domain(&domain_str)?,
        device_type: row.get(4)?,
        room_id: room_id.map(parse_uuid).transpose()?,
        protocol: parse_protocol(&protocol_str)?,
        address: serde_json::from_str(&address_json)?,
        capabilities: serde_json::from_str(&capabilities_json)?,
        state: serde_json::from_str(&state_json)?,
        health: parse_health(&health_str)?,
        config: serde_json::from_str(&config_json)?,
        version: row.get(12)?,
        created_at: parse_dt(row.get(13)?),
        updated_at: parse_dt(row.get(14)?),
    })
}

fn parse_domain(s: &str) -> StoreResult<DeviceDomain> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown device domain {s:?}")))
}

fn parse_protocol(s: &str) -> StoreResult<Protocol> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown protocol {s:?}")))
}

fn parse_health(s: &str) -> StoreResult<DeviceHealth> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown device health {s:?}")))
}

fn to_json_str<T: serde::Serialize>(v: &T) -> StoreResult<String> {
    Ok(serde_json::to_string(v)?)
}

pub fn insert_device(conn: &Connection, device: &Device) -> StoreResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO device ({DEVICE_COLUMNS}) VALUES \
             (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)"
        ),
        params![
            device.id.to_string(),
            device.slug.as_str(),
            device.name,
            to_json_str(&device.domain)?.trim_matches('"'),
            device.device_type,
            device.room_id.map(|id| id.to_string()),
            to_json_str(&device.protocol)?.trim_matches('"'),
            to_json_str(&device.address)?,
            to_json_str(&device.capabilities)?,
            to_json_str(&device.state)?,
            to_json_str(&device.health)?.trim_matches('"'),
            device.config.to_string(),
            device.version,
            device.created_at.to_rfc3339(),
            device.updated_at.to_rfc3339(),
        ],
    )
    .map_err(map_unique_violation("device"))?;
    Ok(())
}

pub fn get_device(conn: &Connection, id: Uuid) -> StoreResult<Option<Device>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {DEVICE_COLUMNS} FROM device WHERE id = ?1"))?;
    stmt.query_row(params![id.to_string()], |r| Ok(row_to_device(r))).optional()?.transpose()
}

pub fn get_device_by_slug(conn: &Connection, slug: &str) -> StoreResult<Option<Device>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {DEVICE_COLUMNS} FROM device WHERE slug = ?1"))?;
    stmt.query_row(params![slug], |r| Ok(row_to_device(r))).optional()?.transpose()
}

pub fn list_devices(conn: &Connection) -> StoreResult<Vec<Device>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {DEVICE_COLUMNS} FROM device ORDER BY name"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_device(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn list_devices_by_room(conn: &Connection, room_id: Uuid) -> StoreResult<Vec<Device>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEVICE_COLUMNS} FROM device WHERE room_id = ?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![room_id.to_string()], |r| Ok(row_to_device(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

/// Full replace of name/room fields (PATCH), bumping `version`.
pub fn update_device_fields(
    conn: &Connection,
    id: Uuid,
    name: Option<&str>,
    room_id: Option<Option<Uuid>>,
) -> StoreResult<()> {
    let existing = get_device(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("device {id}")))?;
    let new_name = name.unwrap_or(&existing.name);
    let new_room = room_id.unwrap_or(existing.room_id);
    conn.execute(
        "UPDATE device SET name = ?2, room_id = ?3, version = version + 1, updated_at = ?4 WHERE id = ?1",
        params![
            id.to_string(),
            new_name,
            new_room.map(|r| r.to_string()),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Atomic merge of `partial` into the device's state map (device-registry's
/// `UpdateState`, §4.5). Does not bump `version` (state is bridge-driven,
/// not a catalogue edit).
pub fn merge_device_state(conn: &Connection, id: Uuid, partial: &StateMap) -> StoreResult<Device> {
    let mut device =
        get_device(conn, id)?.ok_or_else(|| StoreError::NotFound(format!("device {id}")))?;
    for (k, v) in partial {
        device.state.insert(k.clone(), v.clone());
    }
    device.updated_at = Utc::now();
    conn.execute(
        "UPDATE device SET state = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), to_json_str(&device.state)?, device.updated_at.to_rfc3339()],
    )?;
    Ok(device)
}

pub fn update_device_health(conn: &Connection, id: Uuid, health: DeviceHealth) -> StoreResult<()> {
    let n = conn.execute(
        "UPDATE device SET health = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), to_json_str(&health)?.trim_matches('"'), Utc::now().to_rfc3339()],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("device {id}")));
    }
    Ok(())
}

pub fn delete_device(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let actions: i64 = conn.query_row(
        "SELECT COUNT(*) FROM scene_action WHERE device_id = ?1",
        params![id.to_string()],
        |r| r.get(0),
    )?;
    if actions > 0 {
        return Err(StoreError::HasDependents(format!(
            "device {id} is referenced by {actions} scene action(s)"
        )));
    }
    let n = conn.execute("DELETE FROM device WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("device {id}")));
    }
    Ok(())
}

// ==========================================
// Group-address binding
// ==========================================

fn row_to_binding(row: &Row) -> StoreResult<GroupAddressBinding> {
    let direction_str: String = row.get(4)?;
    Ok(GroupAddressBinding {
        id: parse_uuid(row.get(0)?)?,
        device_id: parse_uuid(row.get(1)?)?,
        capability: serde_json::from_value(serde_json::Value::String(row.get::<_, String>(2)?))
            .map_err(|_| StoreError::InvalidData("bad capability".to_owned()))?,
        group_address: row.get(3)?,
        datapoint_type: row.get(5)?,
        direction: parse_direction(&direction_str)?,
    })
}

fn parse_direction(s: &str) -> StoreResult<BindingDirection> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown binding direction {s:?}")))
}

const BINDING_COLUMNS: &str = "id, device_id, capability, group_address, direction, datapoint_type";

pub fn insert_binding(conn: &Connection, binding: &GroupAddressBinding) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO group_address_binding ({BINDING_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6)"),
        params![
            binding.id.to_string(),
            binding.device_id.to_string(),
            to_json_str(&binding.capability)?.trim_matches('"'),
            binding.group_address,
            to_json_str(&binding.direction)?.trim_matches('"'),
            binding.datapoint_type,
        ],
    )?;
    Ok(())
}

/// All bindings for every device still in the catalogue — the projection
/// the bridge's binding table must equal after any catalogue mutation (§8
/// binding integrity property).
pub fn list_all_bindings(conn: &Connection) -> StoreResult<Vec<GroupAddressBinding>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {BINDING_COLUMNS} FROM group_address_binding"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_binding(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn list_bindings_by_device(conn: &Connection, device_id: Uuid) -> StoreResult<Vec<GroupAddressBinding>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {BINDING_COLUMNS} FROM group_address_binding WHERE device_id = ?1"
    ))?;
    let rows = stmt.query_map(params![device_id.to_string()], |r| Ok(row_to_binding(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn delete_bindings_by_device(conn: &Connection, device_id: Uuid) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM group_address_binding WHERE device_id = ?1",
        params![device_id.to_string()],
    )?;
    Ok(())
}

// ==========================================
// Scene + scene action
// ==========================================

fn row_to_scene_header(row: &Row) -> StoreResult<Scene> {
    let room_id: Option<String> = row.get(3)?;
    Ok(Scene {
        id: parse_uuid(row.get(0)?)?,
        slug: parse_slug(row.get(1)?)?,
        name: row.get(2)?,
        room_id: room_id.map(parse_uuid).transpose()?,
        category: row.get(4)?,
        priority: row.get::<_, i64>(5)? as u8,
        enabled: row.get(6)?,
        actions: Vec::new(),
        version: row.get(7)?,
        created_at: parse_dt(row.get(8)?),
        updated_at: parse_dt(row.get(9)?),
    })
}

const SCENE_COLUMNS: &str =
    "id, slug, name, room_id, category, priority, enabled, version, created_at, updated_at";

fn row_to_action(row: &Row) -> StoreResult<SceneAction> {
    let command_str: String = row.get(3)?;
    let parameters: String = row.get(4)?;
    Ok(SceneAction {
        id: parse_uuid(row.get(0)?)?,
        scene_id: parse_uuid(row.get(1)?)?,
        device_id: parse_uuid(row.get(2)?)?,
        command: parse_command(&command_str)?,
        parameters: serde_json::from_str(&parameters)?,
        delay_ms: row.get(5)?,
        fade_ms: row.get(6)?,
        parallel: row.get(7)?,
        continue_on_error: row.get(8)?,
        sort_order: row.get(9)?,
    })
}

fn parse_command(s: &str) -> StoreResult<SceneCommandKind> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown scene command {s:?}")))
}

const ACTION_COLUMNS: &str = "id, scene_id, device_id, command, parameters, delay_ms, fade_ms, \
     parallel, continue_on_error, sort_order";

pub fn get_scene(conn: &Connection, id: Uuid) -> StoreResult<Option<Scene>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {SCENE_COLUMNS} FROM scene WHERE id = ?1"))?;
    let Some(mut scene) =
        stmt.query_row(params![id.to_string()], |r| Ok(row_to_scene_header(r))).optional()?.transpose()?
    else {
        return Ok(None);
    };
    scene.actions = list_actions_by_scene(conn, id)?;
    Ok(Some(scene))
}

pub fn get_scene_by_slug(conn: &Connection, slug: &str) -> StoreResult<Option<Scene>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {SCENE_COLUMNS} FROM scene WHERE slug = ?1"))?;
    let Some(header) =
        stmt.query_row(params![slug], |r| Ok(row_to_scene_header(r))).optional()?.transpose()?
    else {
        return Ok(None);
    };
    get_scene(conn, header.id)
}

pub fn list_scenes(conn: &Connection) -> StoreResult<Vec<Scene>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {SCENE_COLUMNS} FROM scene ORDER BY name"))?;
    let headers: Vec<Scene> =
        stmt.query_map([], |r| Ok(row_to_scene_header(r)))?.collect::<Result<Vec<_>, _>>()?.into_iter().collect::<StoreResult<Vec<_>>>()?;
    let mut out = Vec::with_capacity(headers.len());
    for mut scene in headers {
        scene.actions = list_actions_by_scene(conn, scene.id)?;
        out.push(scene);
    }
    Ok(out)
}

fn list_actions_by_scene(conn: &Connection, scene_id: Uuid) -> StoreResult<Vec<SceneAction>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ACTION_COLUMNS} FROM scene_action WHERE scene_id = ?1 ORDER BY sort_order"
    ))?;
    let rows = stmt.query_map(params![scene_id.to_string()], |r| Ok(row_to_action(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

/// Insert a scene and its ordered actions inside one transaction.
pub fn insert_scene(conn: &mut Connection, scene: &Scene) -> StoreResult<()> {
    let tx = conn.transaction()?;
    tx.execute(
        &format!(
            "INSERT INTO scene ({SCENE_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"
        ),
        params![
            scene.id.to_string(),
            scene.slug.as_str(),
            scene.name,
            scene.room_id.map(|r| r.to_string()),
            scene.category,
            scene.priority as i64,
            scene.enabled,
            scene.version,
            scene.created_at.to_rfc3339(),
            scene.updated_at.to_rfc3339(),
        ],
    )
    .map_err(map_unique_violation("scene"))?;
    for action in &scene.actions {
        insert_action_tx(&tx, scene.id, action)?;
    }
    tx.commit()?;
    Ok(())
}

fn insert_action_tx(tx: &rusqlite::Transaction, scene_id: Uuid, action: &SceneAction) -> StoreResult<()> {
    tx.execute(
        &format!("INSERT INTO scene_action ({ACTION_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"),
        params![
            action.id.to_string(),
            scene_id.to_string(),
            action.device_id.to_string(),
            to_json_str(&action.command)?.trim_matches('"'),
            action.parameters.to_string(),
            action.delay_ms,
            action.fade_ms,
            action.parallel,
            action.continue_on_error,
            action.sort_order,
        ],
    )?;
    Ok(())
}

/// Replace a scene's header fields and its whole action list (PATCH),
/// bumping `version`.
pub fn replace_scene(conn: &mut Connection, scene: &Scene) -> StoreResult<()> {
    let tx = conn.transaction()?;
    let n = tx.execute(
        "UPDATE scene SET name = ?2, room_id = ?3, category = ?4, priority = ?5, enabled = ?6, \
         version = version + 1, updated_at = ?7 WHERE id = ?1",
        params![
            scene.id.to_string(),
            scene.name,
            scene.room_id.map(|r| r.to_string()),
            scene.category,
            scene.priority as i64,
            scene.enabled,
            Utc::now().to_rfc3339(),
        ],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("scene {}", scene.id)));
    }
    tx.execute("DELETE FROM scene_action WHERE scene_id = ?1", params![scene.id.to_string()])?;
    for action in &scene.actions {
        insert_action_tx(&tx, scene.id, action)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn delete_scene(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let n = conn.execute("DELETE FROM scene WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("scene {id}")));
    }
    Ok(())
}

// ==========================================
// Scene execution
// ==========================================

fn row_to_execution(row: &Row) -> StoreResult<SceneExecution> {
    let finished_at: Option<String> = row.get(3)?;
    let trigger_kind_str: String = row.get(4)?;
    let status_str: String = row.get(9)?;
    let duration_ms: Option<i64> = row.get(10)?;
    Ok(SceneExecution {
        id: parse_uuid(row.get(0)?)?,
        scene_id: parse_uuid(row.get(1)?)?,
        started_at: parse_dt(row.get(2)?),
        finished_at: finished_at.map(parse_dt),
        trigger_kind: parse_trigger_kind(&trigger_kind_str)?,
        trigger_source: row.get(5)?,
        action_count: row.get::<_, i64>(6)? as u32,
        success_count: row.get::<_, i64>(7)? as u32,
        failure_count: row.get::<_, i64>(8)? as u32,
        skipped_count: row.get::<_, i64>(11)? as u32,
        status: parse_execution_status(&status_str)?,
        duration_ms: duration_ms.map(|d| d as u64),
    })
}

fn parse_trigger_kind(s: &str) -> StoreResult<TriggerKind> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown trigger kind {s:?}")))
}

fn parse_execution_status(s: &str) -> StoreResult<ExecutionStatus> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown execution status {s:?}")))
}

const EXECUTION_COLUMNS: &str = "id, scene_id, started_at, finished_at, trigger_kind, \
     trigger_source, action_count, success_count, failure_count, status, duration_ms, skipped_count";

pub fn insert_execution(conn: &Connection, exec: &SceneExecution) -> StoreResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO scene_execution (id, scene_id, started_at, finished_at, trigger_kind, \
             trigger_source, action_count, success_count, failure_count, status, duration_ms, \
             skipped_count) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)"
        ),
        params![
            exec.id.to_string(),
            exec.scene_id.to_string(),
            exec.started_at.to_rfc3339(),
            exec.finished_at.map(|t| t.to_rfc3339()),
            to_json_str(&exec.trigger_kind)?.trim_matches('"'),
            exec.trigger_source,
            exec.action_count,
            exec.success_count,
            exec.failure_count,
            to_json_str(&exec.status)?.trim_matches('"'),
            exec.duration_ms.map(|d| d as i64),
            exec.skipped_count,
        ],
    )?;
    Ok(())
}

pub fn update_execution(conn: &Connection, exec: &SceneExecution) -> StoreResult<()> {
    let n = conn.execute(
        "UPDATE scene_execution SET finished_at = ?2, action_count = ?3, success_count = ?4, \
         failure_count = ?5, status = ?6, duration_ms = ?7, skipped_count = ?8 WHERE id = ?1",
        params![
            exec.id.to_string(),
            exec.finished_at.map(|t| t.to_rfc3339()),
            exec.action_count,
            exec.success_count,
            exec.failure_count,
            to_json_str(&exec.status)?.trim_matches('"'),
            exec.duration_ms.map(|d| d as i64),
            exec.skipped_count,
        ],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("scene execution {}", exec.id)));
    }
    Ok(())
}

pub fn list_executions_by_scene(conn: &Connection, scene_id: Uuid) -> StoreResult<Vec<SceneExecution>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {EXECUTION_COLUMNS} FROM scene_execution WHERE scene_id = ?1 ORDER BY started_at DESC"
    ))?;
    let rows = stmt.query_map(params![scene_id.to_string()], |r| Ok(row_to_execution(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

// ==========================================
// Users / sessions / panels
// ==========================================

fn row_to_user(row: &Row) -> StoreResult<User> {
    let role_str: String = row.get(3)?;
    let room_access_json: String = row.get(5)?;
    Ok(User {
        id: parse_uuid(row.get(0)?)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: parse_role(&role_str)?,
        active: row.get(4)?,
        room_access: serde_json::from_str::<Vec<String>>(&room_access_json)?
            .into_iter()
            .map(parse_uuid)
            .collect::<StoreResult<Vec<_>>>()?,
        created_at: parse_dt(row.get(6)?),
    })
}

fn parse_role(s: &str) -> StoreResult<Role> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown role {s:?}")))
}

const USER_COLUMNS: &str = "id, username, password_hash, role, active, room_access, created_at";

pub fn insert_user(conn: &Connection, user: &User) -> StoreResult<()> {
    let room_access: Vec<String> = user.room_access.iter().map(|id| id.to_string()).collect();
    conn.execute(
        &format!("INSERT INTO app_user ({USER_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7)"),
        params![
            user.id.to_string(),
            user.username,
            user.password_hash,
            to_json_str(&user.role)?.trim_matches('"'),
            user.active,
            serde_json::to_string(&room_access)?,
            user.created_at.to_rfc3339(),
        ],
    )
    .map_err(map_unique_violation("user"))?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: Uuid) -> StoreResult<Option<User>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = ?1"))?;
    stmt.query_row(params![id.to_string()], |r| Ok(row_to_user(r))).optional()?.transpose()
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> StoreResult<Option<User>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE username = ?1"))?;
    stmt.query_row(params![username], |r| Ok(row_to_user(r))).optional()?.transpose()
}

pub fn list_users(conn: &Connection) -> StoreResult<Vec<User>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {USER_COLUMNS} FROM app_user ORDER BY username"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_user(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn update_user(conn: &Connection, user: &User) -> StoreResult<()> {
    let room_access: Vec<String> = user.room_access.iter().map(|id| id.to_string()).collect();
    let n = conn.execute(
        "UPDATE app_user SET role = ?2, active = ?3, room_access = ?4 WHERE id = ?1",
        params![
            user.id.to_string(),
            to_json_str(&user.role)?.trim_matches('"'),
            user.active,
            serde_json::to_string(&room_access)?,
        ],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("user {}", user.id)));
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let n = conn.execute("DELETE FROM app_user WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("user {id}")));
    }
    Ok(())
}

fn row_to_session(row: &Row) -> StoreResult<Session> {
    Ok(Session {
        id: parse_uuid(row.get(0)?)?,
        user_id: parse_uuid(row.get(1)?)?,
        token_hash: row.get(2)?,
        expires_at: parse_dt(row.get(3)?),
        revoked: row.get(4)?,
        device_info: row.get(5)?,
        created_at: parse_dt(row.get(6)?),
    })
}

const SESSION_COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked, device_info, created_at";

pub fn insert_session(conn: &Connection, session: &Session) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO session ({SESSION_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7)"),
        params![
            session.id.to_string(),
            session.user_id.to_string(),
            session.token_hash,
            session.expires_at.to_rfc3339(),
            session.revoked,
            session.device_info,
            session.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_session_by_token_hash(conn: &Connection, token_hash: &str) -> StoreResult<Option<Session>> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {SESSION_COLUMNS} FROM session WHERE token_hash = ?1"))?;
    stmt.query_row(params![token_hash], |r| Ok(row_to_session(r))).optional()?.transpose()
}

pub fn revoke_session(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let n = conn.execute("UPDATE session SET revoked = 1 WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("session {id}")));
    }
    Ok(())
}

fn row_to_panel(row: &Row) -> StoreResult<Panel> {
    let room_access_json: String = row.get(4)?;
    Ok(Panel {
        id: parse_uuid(row.get(0)?)?,
        slug: parse_slug(row.get(1)?)?,
        name: row.get(2)?,
        token_hash: row.get(3)?,
        room_access: serde_json::from_str::<Vec<String>>(&room_access_json)?
            .into_iter()
            .map(parse_uuid)
            .collect::<StoreResult<Vec<_>>>()?,
        active: row.get(5)?,
        created_at: parse_dt(row.get(6)?),
    })
}

const PANEL_COLUMNS: &str = "id, slug, name, token_hash, room_access, active, created_at";

pub fn insert_panel(conn: &Connection, panel: &Panel) -> StoreResult<()> {
    let room_access: Vec<String> = panel.room_access.iter().map(|id| id.to_string()).collect();
    conn.execute(
        &format!("INSERT INTO panel ({PANEL_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7)"),
        params![
            panel.id.to_string(),
            panel.slug.as_str(),
            panel.name,
            panel.token_hash,
            serde_json::to_string(&room_access)?,
            panel.active,
            panel.created_at.to_rfc3339(),
        ],
    )
    .map_err(map_unique_violation("panel"))?;
    Ok(())
}

pub fn list_panels(conn: &Connection) -> StoreResult<Vec<Panel>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {PANEL_COLUMNS} FROM panel ORDER BY name"))?;
    let rows = stmt.query_map([], |r| Ok(row_to_panel(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

pub fn get_panel_by_token_hash(conn: &Connection, token_hash: &str) -> StoreResult<Option<Panel>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {PANEL_COLUMNS} FROM panel WHERE token_hash = ?1"))?;
    stmt.query_row(params![token_hash], |r| Ok(row_to_panel(r))).optional()?.transpose()
}

pub fn get_panel(conn: &Connection, id: Uuid) -> StoreResult<Option<Panel>> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {PANEL_COLUMNS} FROM panel WHERE id = ?1"))?;
    stmt.query_row(params![id.to_string()], |r| Ok(row_to_panel(r))).optional()?.transpose()
}

pub fn update_panel(conn: &Connection, panel: &Panel) -> StoreResult<()> {
    let room_access: Vec<String> = panel.room_access.iter().map(|id| id.to_string()).collect();
    let n = conn.execute(
        "UPDATE panel SET name = ?2, room_access = ?3, active = ?4 WHERE id = ?1",
        params![
            panel.id.to_string(),
            panel.name,
            serde_json::to_string(&room_access)?,
            panel.active,
        ],
    )?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("panel {}", panel.id)));
    }
    Ok(())
}

pub fn delete_panel(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let n = conn.execute("DELETE FROM panel WHERE id = ?1", params![id.to_string()])?;
    if n == 0 {
        return Err(StoreError::NotFound(format!("panel {id}")));
    }
    Ok(())
}

// ==========================================
// Audit log (append-only, I5)
// ==========================================

fn row_to_audit(row: &Row) -> StoreResult<AuditEntry> {
    let actor_id: Option<String> = row.get(2)?;
    let action_str: String = row.get(4)?;
    let details_json: String = row.get(7)?;
    Ok(AuditEntry {
        id: parse_uuid(row.get(0)?)?,
        created_at: parse_dt(row.get(1)?),
        actor_id: actor_id.map(parse_uuid).transpose()?,
        actor_tag: row.get(3)?,
        action: parse_audit_action(&action_str)?,
        entity_type: row.get(5)?,
        entity_id: row.get(6)?,
        details: serde_json::from_str(&details_json)?,
    })
}

fn parse_audit_action(s: &str) -> StoreResult<AuditAction> {
    serde_json::from_value(serde_json::Value::String(s.to_owned()))
        .map_err(|_| StoreError::InvalidData(format!("unknown audit action {s:?}")))
}

const AUDIT_COLUMNS: &str =
    "id, created_at, actor_id, actor_tag, action, entity_type, entity_id, details";

/// Append one entry. No update or delete path is exposed (I5).
pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> StoreResult<()> {
    conn.execute(
        &format!("INSERT INTO audit_entry ({AUDIT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)"),
        params![
            entry.id.to_string(),
            entry.created_at.to_rfc3339(),
            entry.actor_id.map(|id| id.to_string()),
            entry.actor_tag,
            to_json_str(&entry.action)?.trim_matches('"'),
            entry.entity_type,
            entry.entity_id,
            entry.details.to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_audit_entries(conn: &Connection, limit: u32) -> StoreResult<Vec<AuditEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {AUDIT_COLUMNS} FROM audit_entry ORDER BY created_at DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], |r| Ok(row_to_audit(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

// ==========================================
// Discovery records
// ==========================================

fn row_to_discovery(row: &Row) -> StoreResult<DiscoveryRecord> {
    Ok(DiscoveryRecord {
        address: row.get(0)?,
        count: row.get::<_, i64>(1)? as u64,
        last_seen: parse_dt(row.get(2)?),
    })
}

/// Insert-or-bump a discovery record (§4.4, §8 unknown-address scenario).
pub fn touch_discovery(conn: &Connection, address: &str, now: DateTime<Utc>) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO discovery_record (address, count, last_seen) VALUES (?1, 1, ?2)
         ON CONFLICT(address) DO UPDATE SET count = count + 1, last_seen = excluded.last_seen",
        params![address, now.to_rfc3339()],
    )?;
    Ok(())
}

pub fn list_discovery_records(conn: &Connection) -> StoreResult<Vec<DiscoveryRecord>> {
    let mut stmt = conn
        .prepare_cached("SELECT address, count, last_seen FROM discovery_record ORDER BY last_seen DESC")?;
    let rows = stmt.query_map([], |r| Ok(row_to_discovery(r)))?;
    rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
}

// ==========================================
// Helpers
// ==========================================

fn map_unique_violation(entity: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |e| match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::AlreadyExists(format!("{entity} already exists"))
        }
        _ => StoreError::Sqlite(e),
    }
}
