//! `#[derive(FromRow, Columns)]` against the recording driver.

use sqlctx::testing::RecordingDriver;
use sqlctx::{Columns, Db, FromRow, Value, params};
use std::time::Duration;

#[derive(Debug, PartialEq, FromRow, Columns)]
struct User {
    #[orm(column = "id")]
    id: i64,
    #[orm(column = "user_name")]
    name: String,
    #[orm(column = "email")]
    email: Option<String>,
    #[orm(skip)]
    cached: bool,
}

#[derive(Debug, FromRow, Columns)]
struct NameOnly {
    user_name: String,
}

#[derive(Debug, PartialEq, FromRow, Columns)]
struct Plain {
    id: i64,
    #[orm(column = "nick")]
    name: String,
    note: Option<String>,
}

#[test]
fn columns_follow_attributes() {
    assert_eq!(User::columns(), &["id", "user_name", "email"]);
    assert!(NameOnly::columns().is_empty());
    assert_eq!(Plain::columns(), &["nick"]);
}

#[tokio::test]
async fn undeclared_columns_select_star() {
    let driver = RecordingDriver::new();
    driver.push_rows(RecordingDriver::rows(
        &["user_name"],
        vec![vec![Value::from("allen")]],
    ));
    let db = Db::new(driver.clone(), Duration::from_secs(5));

    let row: NameOnly = db.acquire().name("users").find_one().await.unwrap();

    assert_eq!(row.user_name, "allen");
    assert_eq!(driver.last().unwrap().sql, "select * from users");
}

#[tokio::test]
async fn undeclared_fields_stay_out_of_projection_but_are_read() {
    let driver = RecordingDriver::new();
    driver.push_rows(RecordingDriver::rows(
        &["id", "nick", "note"],
        vec![vec![Value::Int(4), Value::from("al"), Value::Null]],
    ));
    let db = Db::new(driver.clone(), Duration::from_secs(5));

    let row: Plain = db
        .acquire()
        .name("users")
        .what(["id", "nick", "note"])
        .find_one()
        .await
        .unwrap();
    assert_eq!(
        row,
        Plain {
            id: 4,
            name: "al".into(),
            note: None,
        }
    );

    db.acquire().name("users").find_many::<Plain>().await.unwrap();
    assert_eq!(driver.last().unwrap().sql, "select nick from users");
}

#[tokio::test]
async fn find_many_infers_projection_and_maps_rows() {
    let driver = RecordingDriver::new();
    driver.push_rows(RecordingDriver::rows(
        &["id", "user_name", "email"],
        vec![
            vec![Value::Int(1), Value::from("allen"), Value::from("a@x.io")],
            vec![Value::Int(2), Value::from("bob"), Value::Null],
        ],
    ));
    let db = Db::new(driver.clone(), Duration::from_secs(5));

    let users: Vec<User> = db
        .acquire()
        .name("users")
        .where_("id > ?", params![0])
        .order("id")
        .find_many()
        .await
        .unwrap();

    assert_eq!(
        driver.last().unwrap().sql,
        "select id, user_name, email from users where id > ? order by id"
    );
    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "allen".into(),
                email: Some("a@x.io".into()),
                cached: false,
            },
            User {
                id: 2,
                name: "bob".into(),
                email: None,
                cached: false,
            },
        ]
    );
}

#[tokio::test]
async fn explicit_projection_overrides_columns() {
    let driver = RecordingDriver::new();
    driver.push_rows(RecordingDriver::rows(
        &["user_name"],
        vec![vec![Value::from("allen")]],
    ));
    let db = Db::new(driver.clone(), Duration::from_secs(5));

    let row: NameOnly = db
        .acquire()
        .name("users")
        .what(["upper(name) as user_name"])
        .limit(1)
        .find_one()
        .await
        .unwrap();

    assert_eq!(row.user_name, "allen");
    assert_eq!(
        driver.last().unwrap().sql,
        "select upper(name) as user_name from users limit 0, 1"
    );
}

#[tokio::test]
async fn missing_column_is_a_decode_error() {
    let driver = RecordingDriver::new();
    driver.push_rows(RecordingDriver::rows(&["id"], vec![vec![Value::Int(1)]]));
    let db = Db::new(driver, Duration::from_secs(5));

    let err = db.acquire().name("users").find_one::<User>().await.unwrap_err();
    assert!(matches!(err, sqlctx::DbError::Decode { ref column, .. } if column == "user_name"));
}
