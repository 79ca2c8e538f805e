//! Integration tests for the full transfer against PostgreSQL.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test --test pipeline`

mod common;

use common::{SEEDED_COUNTS, counts, destination, empty_source, genre_id, seeded_source};
use movies_etl_pipeline::errors::{LoadError, PipelineError, TransformError, VerifyError};
use movies_etl_pipeline::{
    Extractor, Loader, Orchestrator, PipelineConfig, TimestampPolicy, Transformer,
};
use movies_etl_shared::{GenreFilmWork, Table, ValidationError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

// ============================================================================
// Full Run Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_end_to_end_transfer(_pool_opts: PgPoolOptions, connect_opts: PgConnectOptions) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let orchestrator = Orchestrator::new(PipelineConfig::default());
    let report = orchestrator
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();

    assert_eq!(counts(&mut dest).await, SEEDED_COUNTS);
    assert_eq!(report.rows_inserted(), 23);
    assert_eq!(report.verified.len(), Table::ALL.len());
    assert_eq!(
        report
            .verified
            .iter()
            .map(|v| v.rows as i64)
            .collect::<Vec<_>>(),
        SEEDED_COUNTS.to_vec()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rerun_changes_nothing(_pool_opts: PgPoolOptions, connect_opts: PgConnectOptions) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let orchestrator = Orchestrator::new(PipelineConfig::new(2).unwrap());
    orchestrator
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();

    let report = orchestrator
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();

    assert_eq!(report.rows_inserted(), 0);
    assert_eq!(report.loaded(Table::GenreFilmWork).unwrap().batches, 4);
    assert_eq!(report.loaded(Table::GenreFilmWork).unwrap().skipped(), 7);
    assert_eq!(counts(&mut dest).await, SEEDED_COUNTS);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_preserved_timestamps_round_trip(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let config = PipelineConfig::default().with_timestamps(TimestampPolicy::Preserve);
    let report = Orchestrator::new(config)
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();
    assert_eq!(report.verified.len(), Table::ALL.len());

    let created: String = sqlx::query_scalar(
        "SELECT to_char(created AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI:SS.US') FROM genre WHERE id = $1",
    )
    .bind(genre_id(1))
    .fetch_one(&mut dest)
    .await
    .unwrap();
    assert_eq!(created, "2021-06-16 20:14:09.222016");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_null_source_timestamps_use_destination_clock(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    sqlx::raw_sql(
        "UPDATE film_work SET created_at = NULL;
         UPDATE person SET updated_at = NULL;
         UPDATE genre_film_work SET created_at = NULL;",
    )
    .execute(&mut source)
    .await
    .unwrap();

    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let report = Orchestrator::new(PipelineConfig::default())
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();

    assert_eq!(counts(&mut dest).await, SEEDED_COUNTS);
    assert_eq!(report.verified.len(), Table::ALL.len());

    let stamped: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM film_work WHERE created > now() - interval '1 hour'",
    )
    .fetch_one(&mut dest)
    .await
    .unwrap();
    assert_eq!(stamped, SEEDED_COUNTS[0]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_null_source_timestamp_fails_when_preserving(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    sqlx::query("UPDATE film_work SET created_at = NULL")
        .execute(&mut source)
        .await
        .unwrap();

    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let config = PipelineConfig::default().with_timestamps(TimestampPolicy::Preserve);
    let result = Orchestrator::new(config)
        .run(&mut source, &mut dest, &mut verify_conn)
        .await;

    match result {
        Err(PipelineError::Load(LoadError::Transform(TransformError::Validation {
            table,
            batch,
            row,
            source,
        }))) => {
            assert_eq!(table, Table::FilmWork);
            assert_eq!((batch, row), (1, 0));
            assert_eq!(
                source,
                ValidationError::UnexpectedNull {
                    field: "created_at"
                }
            );
        }
        other => panic!("Expected validation failure, got {other:?}"),
    }

    assert_eq!(counts(&mut dest).await, [0; 5]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_source_transfers_nothing(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = empty_source().await;
    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let report = Orchestrator::new(PipelineConfig::default())
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();

    assert_eq!(counts(&mut dest).await, [0; 5]);
    assert!(report.loaded.iter().all(|summary| summary.batches == 0));
    assert!(report.verified.iter().all(|v| v.rows == 0));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_junction_before_entities_is_rejected(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;

    let rows = Extractor::default().extract(&mut source, Table::GenreFilmWork, None);
    let records = Transformer::new().transform::<GenreFilmWork>(rows);
    let result = Loader::default().load(&mut dest, records).await;

    assert!(matches!(
        result,
        Err(LoadError::Database {
            table: Table::GenreFilmWork,
            batch: 1,
            ..
        })
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_malformed_row_rolls_back_whole_load(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    sqlx::query(
        "INSERT INTO person_film_work (id, film_work_id, person_id, role, created_at)
         VALUES ('not-a-uuid', ?, ?, 'director', '2021-06-16 20:14:09+00')",
    )
    .bind(common::film_work_id(4).to_string())
    .bind(common::person_id(1).to_string())
    .execute(&mut source)
    .await
    .unwrap();

    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let result = Orchestrator::new(PipelineConfig::default())
        .run(&mut source, &mut dest, &mut verify_conn)
        .await;

    match result {
        Err(PipelineError::Load(LoadError::Transform(TransformError::Validation {
            table,
            source,
            ..
        }))) => {
            assert_eq!(table, Table::PersonFilmWork);
            assert_eq!(source.field(), "id");
        }
        other => panic!("Expected validation failure, got {other:?}"),
    }

    assert_eq!(counts(&mut dest).await, [0; 5]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verification_detects_changed_row(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;
    let mut verify_conn = destination(&connect_opts).await;

    let orchestrator = Orchestrator::new(PipelineConfig::default().with_verify(false));
    let report = orchestrator
        .run(&mut source, &mut dest, &mut verify_conn)
        .await
        .unwrap();
    assert!(report.verified.is_empty());

    sqlx::query("UPDATE genre SET name = 'Drama' WHERE id = $1")
        .bind(genre_id(2))
        .execute(&mut dest)
        .await
        .unwrap();

    let result = orchestrator.verify_all(&mut source, &mut verify_conn).await;
    match result {
        Err(VerifyError::RecordMismatch { table, batch, id }) => {
            assert_eq!(table, Table::Genre);
            assert_eq!(batch, 1);
            assert_eq!(id, genre_id(2));
        }
        other => panic!("Expected record mismatch, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_verification_detects_missing_row(
    _pool_opts: PgPoolOptions,
    connect_opts: PgConnectOptions,
) {
    let mut source = seeded_source().await;
    let mut dest = destination(&connect_opts).await;

    let orchestrator = Orchestrator::new(PipelineConfig::default().with_verify(false));
    orchestrator.load_all(&mut source, &mut dest).await.unwrap();

    sqlx::query("DELETE FROM person_film_work WHERE role = 'writer'")
        .execute(&mut dest)
        .await
        .unwrap();

    let result = orchestrator.verify_all(&mut source, &mut dest).await;
    assert!(matches!(
        result,
        Err(VerifyError::CountMismatch {
            table: Table::PersonFilmWork,
            expected: 6,
            found: 5,
            ..
        })
    ));
}
