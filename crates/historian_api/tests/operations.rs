use historian_api::{
    configure_db_path, ingest_point, list_source_points, list_sources, register_source, ApiError,
    RegisterSourceRequest,
};
use serde_json::json;

// The database path is process-wide, so the full operation flow runs in one
// test body against a single temporary file.
#[test]
fn operations_cover_register_list_ingest_and_query() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("historian.sqlite3");
    configure_db_path(&db_path).unwrap();

    // Re-configuring with the same path is idempotent; switching is refused.
    configure_db_path(&db_path).unwrap();
    let conflict = configure_db_path(dir.path().join("other.sqlite3")).unwrap_err();
    assert!(conflict.contains("refusing to switch"));

    let created = register_source(RegisterSourceRequest {
        name: "S1".to_string(),
        source_type: "temperature".to_string(),
        config: Some(json!({"unit": "C"})),
    })
    .unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.config, json!({"unit": "C"}));

    let duplicate = register_source(RegisterSourceRequest {
        name: "S1".to_string(),
        source_type: "humidity".to_string(),
        config: None,
    })
    .unwrap_err();
    assert_eq!(duplicate, ApiError::DuplicateName("S1".to_string()));

    let second = register_source(RegisterSourceRequest {
        name: "S2".to_string(),
        source_type: "humidity".to_string(),
        config: None,
    })
    .unwrap();
    assert_eq!(second.config, json!({}));

    // Boundary defaults: offset 0, limit 100.
    let all = list_sources(None, None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, created.id);
    assert_eq!(all[1].id, second.id);

    let page = list_sources(Some(1), Some(1)).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second.id);

    let missing = ingest_point(999, 21.5).unwrap_err();
    assert_eq!(missing, ApiError::SourceNotFound(999));

    let first_point = ingest_point(second.id, 10.0).unwrap();
    let second_point = ingest_point(second.id, 12.0).unwrap();
    assert!(first_point.timestamp <= second_point.timestamp);

    let points = list_source_points(second.id).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0], first_point);
    assert_eq!(points[1], second_point);

    assert!(list_source_points(created.id).unwrap().is_empty());
    assert!(list_source_points(999).unwrap().is_empty());

    let invalid = ingest_point(second.id, f64::NAN).unwrap_err();
    assert!(matches!(invalid, ApiError::InvalidRequest(_)));
}
