//! Row materialization against MySQL.
//!
//! Set MYSQL_URL to run these tests.

use super::common::connect;
use sqlmail::db::{Cell, DatabaseClient};
use sqlmail::error::ExportError;

async fn get_test_client() -> Option<Box<dyn DatabaseClient>> {
    let url = std::env::var("MYSQL_URL").ok()?;
    Some(connect(&url).await)
}

#[tokio::test]
async fn test_mysql_types() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: MYSQL_URL not set");
        return;
    };

    let result = client
        .materialize(
            "SELECT CAST(1 AS SIGNED) AS a, 'hi' AS b, NULL AS c, \
             CAST(18446744073709551615 AS UNSIGNED) AS d",
        )
        .await
        .unwrap();

    assert_eq!(result.columns().iter().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
    let row = &result.rows()[0];
    assert_eq!(row[0], Cell::Int(1));
    assert_eq!(row[1], Cell::Text("hi".to_string()));
    assert_eq!(row[2], Cell::Null);
    assert_eq!(row[3], Cell::UInt(u64::MAX));

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_mysql_zero_date_is_not_an_error() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: MYSQL_URL not set");
        return;
    };

    let result = client
        .materialize("SELECT 1 AS id, CAST('0000-00-00' AS DATE) AS d")
        .await
        .unwrap();

    let row = &result.rows()[0];
    assert_eq!(row[0], Cell::Int(1));
    // Strict sql_mode turns the zero date into NULL; otherwise it is kept verbatim
    assert!(
        matches!(&row[1], Cell::Null) || row[1] == Cell::Text("0000-00-00".to_string()),
        "unexpected cell {:?}",
        row[1]
    );

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_mysql_unknown_table() {
    let Some(client) = get_test_client().await else {
        eprintln!("Skipping test: MYSQL_URL not set");
        return;
    };

    let err = client
        .materialize("SELECT * FROM sqlmail_missing_table")
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::Query(_)));

    client.close().await.unwrap();
}
