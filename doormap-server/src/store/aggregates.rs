//! Aggregate store queries
//!
//! A building and its doors form one consistency unit: they are created
//! together, replaced together on update, and removed together on delete.
//! Every multi-row mutation runs inside a single transaction so readers
//! never observe a building with a partial door set.
//!
//! There is no optimistic concurrency token. Two concurrent updates to the
//! same aggregate race and the later commit wins; expected usage is a
//! single operator per record.

use chrono::Utc;
use doormap_common::api::AggregateRecord;
use doormap_common::config::Location;
use doormap_common::db::models::{Building, ClassificationEntry, Door};
use doormap_common::{classify, info_codec, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Input for creating a new aggregate
#[derive(Debug, Clone)]
pub struct NewAggregate {
    pub lat: f64,
    pub long: f64,
    pub address: Option<String>,
    pub territory_id: Option<String>,
    pub congregation_id: i64,
    pub language: String,
    pub number_of_doors: i64,
    pub door_labels: Vec<String>,
}

/// Input for replacing an existing aggregate's contents
///
/// Territory assignment is not editable through an update.
#[derive(Debug, Clone)]
pub struct AggregateUpdate {
    pub lat: f64,
    pub long: f64,
    pub address: Option<String>,
    pub congregation_id: i64,
    pub language: String,
    pub number_of_doors: i64,
    pub door_labels: Vec<String>,
}

/// Create a building together with its initial door set
///
/// The stored door count is max(declared count, supplied labels), so labels
/// are never silently dropped; declared slots beyond the supplied labels
/// get an empty label. Building and doors commit atomically.
pub async fn create_aggregate(pool: &SqlitePool, agg: &NewAggregate) -> Result<Uuid> {
    if !Location::new(agg.lat, agg.long).is_valid() {
        return Err(Error::InvalidCoordinate {
            lat: agg.lat,
            long: agg.long,
        });
    }

    let building_id = Uuid::new_v4();
    let now = Utc::now().timestamp();
    let classification_id =
        catalog_entry(pool, agg.congregation_id, &agg.language).await?.map(|c| c.id);

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO buildings (id, lat, long, address, territory_id, last_modified)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(building_id.to_string())
    .bind(agg.lat)
    .bind(agg.long)
    .bind(&agg.address)
    .bind(&agg.territory_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_doors(
        &mut tx,
        &building_id,
        agg.congregation_id,
        &agg.language,
        agg.number_of_doors,
        &agg.door_labels,
        classification_id.as_deref(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(building_id = %building_id, "Created aggregate");
    Ok(building_id)
}

/// Fetch a building and its doors in position order
pub async fn get_aggregate(pool: &SqlitePool, id: &Uuid) -> Result<(Building, Vec<Door>)> {
    let row = sqlx::query(
        "SELECT id, lat, long, address, territory_id, last_modified FROM buildings WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("building {}", id)))?;

    let building = Building {
        id: row.get("id"),
        lat: row.get("lat"),
        long: row.get("long"),
        address: row.get("address"),
        territory_id: row.get("territory_id"),
        last_modified: row.get("last_modified"),
    };

    let doors = fetch_doors(pool, id).await?;

    Ok((building, doors))
}

/// Fetch one aggregate in its wire form (joined labels, resolved pin)
pub async fn get_aggregate_record(pool: &SqlitePool, id: &Uuid) -> Result<AggregateRecord> {
    let (building, doors) = get_aggregate(pool, id).await?;
    build_record(pool, building, &doors).await
}

/// List aggregates modified within the last `window_hours` hours
///
/// Most recently modified first. Each entry carries the derived door count,
/// the ordered labels joined with ", ", and the resolved pin color/image.
pub async fn list_recent_aggregates(
    pool: &SqlitePool,
    window_hours: i64,
) -> Result<Vec<AggregateRecord>> {
    let cutoff = Utc::now().timestamp() - window_hours * 3600;

    let rows = sqlx::query(
        r#"
        SELECT id, lat, long, address, territory_id, last_modified
        FROM buildings
        WHERE last_modified >= ?
        ORDER BY last_modified DESC
        "#,
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let building = Building {
            id: row.get("id"),
            lat: row.get("lat"),
            long: row.get("long"),
            address: row.get("address"),
            territory_id: row.get("territory_id"),
            last_modified: row.get("last_modified"),
        };
        let building_id = Uuid::parse_str(&building.id)
            .map_err(|e| Error::Internal(format!("corrupt building id: {}", e)))?;
        let doors = fetch_doors(pool, &building_id).await?;
        records.push(build_record(pool, building, &doors).await?);
    }

    Ok(records)
}

/// Replace an aggregate's scalars and its entire door set
///
/// The old door set is discarded and recreated under the same rules as
/// create. Runs in one transaction so no reader observes the building with
/// zero doors between the delete and the reinsert.
pub async fn update_aggregate(pool: &SqlitePool, id: &Uuid, upd: &AggregateUpdate) -> Result<()> {
    if !Location::new(upd.lat, upd.long).is_valid() {
        return Err(Error::InvalidCoordinate {
            lat: upd.lat,
            long: upd.long,
        });
    }

    let now = Utc::now().timestamp();
    let classification_id =
        catalog_entry(pool, upd.congregation_id, &upd.language).await?.map(|c| c.id);

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE buildings
        SET lat = ?, long = ?, address = ?, last_modified = ?
        WHERE id = ?
        "#,
    )
    .bind(upd.lat)
    .bind(upd.long)
    .bind(&upd.address)
    .bind(now)
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("building {}", id)));
    }

    sqlx::query("DELETE FROM doors WHERE building_id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    insert_doors(
        &mut tx,
        id,
        upd.congregation_id,
        &upd.language,
        upd.number_of_doors,
        &upd.door_labels,
        classification_id.as_deref(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(building_id = %id, "Updated aggregate");
    Ok(())
}

/// Delete an aggregate: all doors, then the building
///
/// Hard delete with no recovery path.
pub async fn delete_aggregate(pool: &SqlitePool, id: &Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM doors WHERE building_id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM buildings WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("building {}", id)));
    }

    tx.commit().await?;

    tracing::info!(building_id = %id, "Deleted aggregate");
    Ok(())
}

/// Look up an explicit classification catalog entry, if one exists
pub async fn catalog_entry(
    pool: &SqlitePool,
    congregation_id: i64,
    language: &str,
) -> Result<Option<ClassificationEntry>> {
    let row = sqlx::query(
        r#"
        SELECT id, congregation_id, language_name, color, image_path
        FROM classifications
        WHERE congregation_id = ? AND language_name = ? COLLATE NOCASE
        "#,
    )
    .bind(congregation_id)
    .bind(language)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| ClassificationEntry {
        id: row.get("id"),
        congregation_id: row.get("congregation_id"),
        language_name: row.get("language_name"),
        color: row.get::<Option<i64>, _>("color").map(|c| c as u32),
        image_path: row.get("image_path"),
    }))
}

async fn fetch_doors(pool: &SqlitePool, building_id: &Uuid) -> Result<Vec<Door>> {
    let rows = sqlx::query(
        r#"
        SELECT id, building_id, position, language_name, info_text, congregation_id, classification_id
        FROM doors
        WHERE building_id = ?
        ORDER BY position
        "#,
    )
    .bind(building_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Door {
            id: row.get("id"),
            building_id: row.get("building_id"),
            position: row.get("position"),
            language_name: row.get("language_name"),
            info_text: row.get("info_text"),
            congregation_id: row.get("congregation_id"),
            classification_id: row.get("classification_id"),
        })
        .collect())
}

/// Insert the door set for a building, pairing labels by index
///
/// Inserts max(declared, supplied) doors; indices past the supplied labels
/// get an empty label.
async fn insert_doors(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    building_id: &Uuid,
    congregation_id: i64,
    language: &str,
    number_of_doors: i64,
    labels: &[String],
    classification_id: Option<&str>,
) -> Result<()> {
    let door_count = (number_of_doors.max(0) as usize).max(labels.len());

    for position in 0..door_count {
        let label = labels.get(position).map(String::as_str).unwrap_or("");
        sqlx::query(
            r#"
            INSERT INTO doors (id, building_id, position, language_name, info_text, congregation_id, classification_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(building_id.to_string())
        .bind(position as i64)
        .bind(language)
        .bind(label)
        .bind(congregation_id)
        .bind(classification_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Assemble the wire record for a building and its doors
async fn build_record(
    pool: &SqlitePool,
    building: Building,
    doors: &[Door],
) -> Result<AggregateRecord> {
    // Language and congregation are uniform across a building's doors
    let (language, congregation_id) = doors
        .first()
        .map(|d| (d.language_name.clone(), d.congregation_id))
        .unwrap_or_else(|| ("english".to_string(), 1));

    let labels: Vec<String> = doors.iter().map(|d| d.info_text.clone()).collect();
    let info = info_codec::encode(&labels);

    let catalog = catalog_entry(pool, congregation_id, &language).await?;
    let (pin_color, pin_image) = classify::resolve_pin(
        catalog.as_ref().and_then(|c| c.color),
        catalog.as_ref().and_then(|c| c.image_path.as_deref()),
        congregation_id,
        &language,
    );

    Ok(AggregateRecord {
        id: building.id,
        lat: building.lat,
        long: building.long,
        address: building.address,
        last_modified: building.last_modified,
        number_of_doors: doors.len() as i64,
        info,
        language,
        congregation_id,
        pin_color,
        pin_image,
    })
}
