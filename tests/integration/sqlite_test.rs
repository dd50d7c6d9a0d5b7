//! Row materialization against SQLite.

use super::common::{connect, sqlite_database};
use sqlmail::db::Cell;
use sqlmail::error::ExportError;
use sqlmail::export::render_result_set;

#[tokio::test]
async fn test_dynamic_types_stay_aligned() {
    let db = sqlite_database(&[
        "CREATE TABLE things (id INTEGER PRIMARY KEY, v)",
        "INSERT INTO things (id, v) VALUES (1, 42), (2, 'text'), (3, 2.5), (4, NULL), (5, x'DEADBEEF')",
    ])
    .await;
    let client = connect(&db.url).await;

    let result = client
        .materialize("SELECT id, v FROM things ORDER BY id")
        .await
        .unwrap();

    assert_eq!(result.columns().iter().collect::<Vec<_>>(), ["id", "v"]);
    assert_eq!(result.row_count(), 5);
    assert!(result.rows().iter().all(|row| row.len() == 2));

    let values: Vec<&Cell> = result.rows().iter().map(|row| &row[1]).collect();
    assert_eq!(values[0], &Cell::Int(42));
    assert_eq!(values[1], &Cell::Text("text".to_string()));
    assert_eq!(values[2], &Cell::Float(2.5));
    assert_eq!(values[3], &Cell::Null);
    assert_eq!(values[4], &Cell::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_null_renders_as_empty_string() {
    let db = sqlite_database(&[
        "CREATE TABLE customers (id INTEGER, name TEXT)",
        "INSERT INTO customers VALUES (1, 'Alice'), (2, NULL)",
    ])
    .await;
    let client = connect(&db.url).await;

    let result = client
        .materialize("SELECT id, name FROM customers ORDER BY id")
        .await
        .unwrap();
    let grid = render_result_set(&result);

    assert_eq!(
        grid.into_rows(),
        vec![
            vec!["id".to_string(), "name".to_string()],
            vec!["1".to_string(), "Alice".to_string()],
            vec!["2".to_string(), String::new()],
        ]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_result_keeps_column_names() {
    let db = sqlite_database(&["CREATE TABLE orders (id INTEGER, total REAL)"]).await;
    let client = connect(&db.url).await;

    let result = client
        .materialize("SELECT id, total FROM orders")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.columns().len(), 2);

    let grid = render_result_set(&result);
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.header(), ["id", "total"]);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_column_order_follows_query() {
    let db = sqlite_database(&[]).await;
    let client = connect(&db.url).await;

    let result = client
        .materialize("SELECT 'x' AS zeta, 1 AS alpha, NULL AS mid")
        .await
        .unwrap();

    assert_eq!(
        result.columns().iter().collect::<Vec<_>>(),
        ["zeta", "alpha", "mid"]
    );
    assert_eq!(
        result.rows()[0],
        vec![Cell::Text("x".to_string()), Cell::Int(1), Cell::Null]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_missing_table_is_query_error() {
    let db = sqlite_database(&[]).await;
    let client = connect(&db.url).await;

    let err = client
        .materialize("SELECT * FROM missing")
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Query(_)));
    assert!(err.to_string().contains("missing"));

    client.close().await.unwrap();
}
