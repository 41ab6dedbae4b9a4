//! Aggregate store tests
//!
//! Covers the create/get/update/delete lifecycle against an in-memory
//! database: coordinate validation, the door-count pairing rules, whole-set
//! door replacement, and pin resolution through the classification catalog.

use doormap_common::db::init::init_memory_database;
use doormap_common::Error;
use doormap_server::store::{self, AggregateUpdate, NewAggregate};
use uuid::Uuid;

fn sample_aggregate() -> NewAggregate {
    NewAggregate {
        lat: 11.0168,
        long: 76.9558,
        address: Some("12 Mettupalayam Rd".to_string()),
        territory_id: Some("T-4".to_string()),
        congregation_id: 1,
        language: "Tamil".to_string(),
        number_of_doors: 2,
        door_labels: vec!["1/F".to_string(), "2/F".to_string()],
    }
}

#[tokio::test]
async fn test_create_then_get_returns_exact_coordinates() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    let (building, doors) = store::get_aggregate(&pool, &id).await.unwrap();

    assert_eq!(building.lat, 11.0168);
    assert_eq!(building.long, 76.9558);
    assert_eq!(building.address.as_deref(), Some("12 Mettupalayam Rd"));
    assert_eq!(building.territory_id.as_deref(), Some("T-4"));
    assert_eq!(doors.len(), 2);
    assert_eq!(doors[0].info_text, "1/F");
    assert_eq!(doors[1].info_text, "2/F");
}

#[tokio::test]
async fn test_create_uses_max_of_count_and_labels() {
    let pool = init_memory_database().await.unwrap();

    // Declared 4 doors but only 2 labels: 4 doors, trailing labels empty
    let mut agg = sample_aggregate();
    agg.number_of_doors = 4;
    let id = store::create_aggregate(&pool, &agg).await.unwrap();

    let (_, doors) = store::get_aggregate(&pool, &id).await.unwrap();
    assert_eq!(doors.len(), 4);
    assert_eq!(doors[0].info_text, "1/F");
    assert_eq!(doors[1].info_text, "2/F");
    assert_eq!(doors[2].info_text, "");
    assert_eq!(doors[3].info_text, "");

    // 3 labels but declared 0: labels win, nothing dropped
    let mut agg = sample_aggregate();
    agg.number_of_doors = 0;
    agg.door_labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let id = store::create_aggregate(&pool, &agg).await.unwrap();

    let (_, doors) = store::get_aggregate(&pool, &id).await.unwrap();
    assert_eq!(doors.len(), 3);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_coordinates() {
    let pool = init_memory_database().await.unwrap();

    let mut agg = sample_aggregate();
    agg.lat = 91.0;
    let err = store::create_aggregate(&pool, &agg).await.unwrap_err();
    assert!(matches!(err, Error::InvalidCoordinate { .. }));

    let mut agg = sample_aggregate();
    agg.long = -180.5;
    let err = store::create_aggregate(&pool, &agg).await.unwrap_err();
    assert!(matches!(err, Error::InvalidCoordinate { .. }));

    // Nothing was written
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buildings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_every_door_references_its_building() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    let (_, doors) = store::get_aggregate(&pool, &id).await.unwrap();

    for door in doors {
        assert_eq!(door.building_id, id.to_string());
    }
}

#[tokio::test]
async fn test_update_replaces_door_set_without_residue() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();

    let upd = AggregateUpdate {
        lat: 11.02,
        long: 76.96,
        address: Some("14 Mettupalayam Rd".to_string()),
        congregation_id: 1,
        language: "Tamil".to_string(),
        number_of_doors: 3,
        door_labels: vec!["G/F".to_string(), "1/F".to_string(), "2/F".to_string()],
    };
    store::update_aggregate(&pool, &id, &upd).await.unwrap();

    let (building, doors) = store::get_aggregate(&pool, &id).await.unwrap();
    assert_eq!(building.lat, 11.02);
    assert_eq!(building.address.as_deref(), Some("14 Mettupalayam Rd"));
    assert_eq!(doors.len(), 3);
    let labels: Vec<&str> = doors.iter().map(|d| d.info_text.as_str()).collect();
    assert_eq!(labels, vec!["G/F", "1/F", "2/F"]);

    // No orphaned doors from the old set anywhere in the table
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doors")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn test_update_refreshes_last_modified() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    let (before, _) = store::get_aggregate(&pool, &id).await.unwrap();

    let upd = AggregateUpdate {
        lat: 11.0168,
        long: 76.9558,
        address: None,
        congregation_id: 1,
        language: "Tamil".to_string(),
        number_of_doors: 1,
        door_labels: vec!["G/F".to_string()],
    };
    store::update_aggregate(&pool, &id, &upd).await.unwrap();

    let (after, _) = store::get_aggregate(&pool, &id).await.unwrap();
    assert!(after.last_modified >= before.last_modified);
}

#[tokio::test]
async fn test_update_unknown_id_fails_not_found() {
    let pool = init_memory_database().await.unwrap();

    let upd = AggregateUpdate {
        lat: 0.0,
        long: 0.0,
        address: None,
        congregation_id: 1,
        language: "english".to_string(),
        number_of_doors: 1,
        door_labels: vec![],
    };
    let err = store::update_aggregate(&pool, &Uuid::new_v4(), &upd)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_removes_building_and_doors() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    store::delete_aggregate(&pool, &id).await.unwrap();

    let err = store::get_aggregate(&pool, &id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doors WHERE building_id = ?")
        .bind(id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_delete_unknown_id_fails_not_found() {
    let pool = init_memory_database().await.unwrap();

    let err = store::delete_aggregate(&pool, &Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_list_recent_includes_fresh_aggregate_with_resolved_pin() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();

    let records = store::list_recent_aggregates(&pool, 24).await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, id.to_string());
    assert_eq!(record.number_of_doors, 2);
    assert_eq!(record.info, "1/F, 2/F");
    assert_eq!(record.language, "Tamil");
    assert_eq!(record.congregation_id, 1);
    assert_eq!(record.pin_color, 2);
    assert_eq!(record.pin_image, "/pins/pin2.png");
}

#[tokio::test]
async fn test_list_recent_excludes_stale_aggregates() {
    let pool = init_memory_database().await.unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();

    // Age the record past the window
    sqlx::query("UPDATE buildings SET last_modified = last_modified - 90000 WHERE id = ?")
        .bind(id.to_string())
        .execute(&pool)
        .await
        .unwrap();

    let records = store::list_recent_aggregates(&pool, 24).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_catalog_entry_overrides_computed_pin() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO classifications (id, congregation_id, language_name, color, image_path)
         VALUES (?, 1, 'Tamil', 9, NULL)",
    )
    .bind(Uuid::new_v4().to_string())
    .execute(&pool)
    .await
    .unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    let record = store::get_aggregate_record(&pool, &id).await.unwrap();

    assert_eq!(record.pin_color, 9);
    assert_eq!(record.pin_image, "/pins/pin9.png");
}

#[tokio::test]
async fn test_catalog_image_beats_stored_color() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO classifications (id, congregation_id, language_name, color, image_path)
         VALUES (?, 1, 'Tamil', 9, '/pins/custom.png')",
    )
    .bind(Uuid::new_v4().to_string())
    .execute(&pool)
    .await
    .unwrap();

    let id = store::create_aggregate(&pool, &sample_aggregate()).await.unwrap();
    let record = store::get_aggregate_record(&pool, &id).await.unwrap();

    assert_eq!(record.pin_color, 9);
    assert_eq!(record.pin_image, "/pins/custom.png");
}
