//! Row materialization against PostgreSQL.
//!
//! Set DATABASE_URL to run these tests.

use super::common::connect;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlmail::db::{Cell, DatabaseClient};
use sqlmail::error::ExportError;
use std::str::FromStr;

async fn get_test_client() -> Option<Box<dyn DatabaseClient>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(connect(&url).await)
}

#[tokio::test]
async fn test_postgres_types() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .materialize(
            "SELECT 1::int4 AS a, 'hi'::text AS b, NULL::int8 AS c, 1.50::numeric AS d, \
             DATE '2024-01-02' AS e, true AS f, '\\xdead'::bytea AS g",
        )
        .await
        .unwrap();

    assert_eq!(
        result.columns().iter().collect::<Vec<_>>(),
        ["a", "b", "c", "d", "e", "f", "g"]
    );
    let row = &result.rows()[0];
    assert_eq!(row[0], Cell::Int(1));
    assert_eq!(row[1], Cell::Text("hi".to_string()));
    assert_eq!(row[2], Cell::Null);
    assert_eq!(row[3], Cell::Decimal(Decimal::from_str("1.50").unwrap()));
    assert_eq!(row[3].to_display_string(), "1.50");
    assert_eq!(row[4], Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    assert_eq!(row[5], Cell::Bool(true));
    assert_eq!(row[6], Cell::Bytes(vec![0xDE, 0xAD]));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_postgres_empty_result_has_columns() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .materialize("SELECT 1 AS id, 'x' AS name WHERE false")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.columns().iter().collect::<Vec<_>>(), ["id", "name"]);

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_postgres_dates_outside_chrono_range_are_text() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .materialize(
            "SELECT 1 AS id, 'infinity'::timestamp AS valid_until, \
             '-infinity'::timestamptz AS valid_from, DATE '0044-03-15 BC' AS ides, \
             'infinity'::date AS open_end",
        )
        .await
        .unwrap();

    let row = &result.rows()[0];
    assert_eq!(row[0], Cell::Int(1));
    assert_eq!(row[1], Cell::Text("infinity".to_string()));
    assert_eq!(row[2], Cell::Text("-infinity".to_string()));
    assert_eq!(row[3], Cell::Text("0044-03-15 BC".to_string()));
    assert_eq!(row[4], Cell::Text("infinity".to_string()));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_postgres_syntax_error() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = client.materialize("SELEC 1").await.unwrap_err();
    assert!(matches!(err, ExportError::Query(_)));

    client.close().await.unwrap();
}
