//! Shared fixtures for the pipeline integration tests.
#![allow(dead_code)]

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection, SqliteConnection};
use uuid::Uuid;

pub const GENRES: i64 = 3;
pub const PEOPLE: i64 = 2;
pub const FILM_WORKS: i64 = 5;
pub const GENRE_FILM_WORKS: i64 = 7;
pub const PERSON_FILM_WORKS: i64 = 6;

const SOURCE_SCHEMA: &str = include_str!("../fixtures/source_schema.sql");

const FILM_WORK_NS: u128 = 1;
const GENRE_NS: u128 = 2;
const PERSON_NS: u128 = 3;
const GENRE_FILM_WORK_NS: u128 = 4;
const PERSON_FILM_WORK_NS: u128 = 5;

fn id(namespace: u128, n: u128) -> Uuid {
    Uuid::from_u128((namespace << 64) | n)
}

pub fn film_work_id(n: u128) -> Uuid {
    id(FILM_WORK_NS, n)
}

pub fn genre_id(n: u128) -> Uuid {
    id(GENRE_NS, n)
}

pub fn person_id(n: u128) -> Uuid {
    id(PERSON_NS, n)
}

/// Opens an in-memory source database with the content tables and no rows.
pub async fn empty_source() -> SqliteConnection {
    let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
    sqlx::raw_sql(SOURCE_SCHEMA).execute(&mut conn).await.unwrap();
    conn
}

/// Opens an in-memory source database holding the reference dataset.
pub async fn seeded_source() -> SqliteConnection {
    let mut conn = empty_source().await;

    for (n, title, rating, kind) in [
        (1, "Star Wars: Episode IV - A New Hope", Some(8.6), "movie"),
        (2, "The Empire Strikes Back", Some(8.7), "movie"),
        (3, "Return of the Jedi", Some(8.3), "movie"),
        (4, "The Mandalorian", Some(8.7), "tv_show"),
        (5, "Andor", None, "tv_show"),
    ] {
        sqlx::query(
            "INSERT INTO film_work (id, title, description, creation_date, file_path, rating, type, created_at, updated_at)
             VALUES (?, ?, ?, ?, NULL, ?, ?, '2021-06-16 20:14:09.221838+00', '2021-06-16 20:14:09.221855+00')",
        )
        .bind(film_work_id(n).to_string())
        .bind(title)
        .bind(if n % 2 == 0 { None } else { Some(format!("{title}, described")) })
        .bind(if n == 1 { Some("1977-05-25") } else { None })
        .bind(rating)
        .bind(kind)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    for (n, name) in [(1, "Action"), (2, "Adventure"), (3, "Sci-Fi")] {
        sqlx::query(
            "INSERT INTO genre (id, name, description, created_at, updated_at)
             VALUES (?, ?, NULL, '2021-06-16 20:14:09.222016+00', '2021-06-16 20:14:09.222016+00')",
        )
        .bind(genre_id(n).to_string())
        .bind(name)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    // Inserted in reverse so ordering by created_at differs from ordering by id.
    for (n, full_name, created) in [
        (2, "Harrison Ford", "2021-06-16 20:14:09.309735+00"),
        (1, "Mark Hamill", "2021-06-16 20:14:09.310201+00"),
    ] {
        sqlx::query("INSERT INTO person (id, full_name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(person_id(n).to_string())
            .bind(full_name)
            .bind(created)
            .bind(created)
            .execute(&mut conn)
            .await
            .unwrap();
    }

    let genre_links = [(1, 1), (1, 3), (2, 1), (3, 1), (4, 2), (4, 3), (5, 3)];
    for (n, (film, genre)) in genre_links.into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO genre_film_work (id, film_work_id, genre_id, created_at)
             VALUES (?, ?, ?, '2021-06-16 20:14:09.610541+00')",
        )
        .bind(id(GENRE_FILM_WORK_NS, n as u128 + 1).to_string())
        .bind(film_work_id(film).to_string())
        .bind(genre_id(genre).to_string())
        .execute(&mut conn)
        .await
        .unwrap();
    }

    let person_links = [
        (1, 1, "actor"),
        (1, 2, "actor"),
        (2, 1, "actor"),
        (2, 2, "actor"),
        (3, 1, "actor"),
        (3, 2, "writer"),
    ];
    for (n, (film, person, role)) in person_links.into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO person_film_work (id, film_work_id, person_id, role, created_at)
             VALUES (?, ?, ?, ?, '2021-06-16 20:14:09.832537+00')",
        )
        .bind(id(PERSON_FILM_WORK_NS, n as u128 + 1).to_string())
        .bind(film_work_id(film).to_string())
        .bind(person_id(person).to_string())
        .bind(role)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    conn
}

/// Connects to the test database with the content schema on the search path.
pub async fn destination(connect_opts: &PgConnectOptions) -> PgConnection {
    let options = connect_opts
        .clone()
        .options([("search_path", "content")]);
    PgConnection::connect_with(&options).await.unwrap()
}

pub async fn count(conn: &mut PgConnection, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(conn)
        .await
        .unwrap()
}

/// Row counts of every content table, in load order.
pub async fn counts(conn: &mut PgConnection) -> [i64; 5] {
    [
        count(conn, "film_work").await,
        count(conn, "genre").await,
        count(conn, "person").await,
        count(conn, "genre_film_work").await,
        count(conn, "person_film_work").await,
    ]
}

pub const SEEDED_COUNTS: [i64; 5] = [
    FILM_WORKS,
    GENRES,
    PEOPLE,
    GENRE_FILM_WORKS,
    PERSON_FILM_WORKS,
];
