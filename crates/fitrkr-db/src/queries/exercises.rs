//! Database query functions for the `exercises` catalog table.
//!
//! The catalog is owned elsewhere; these exist for seeding and tests.

use anyhow::{Context, Result};
use sqlx::PgConnection;

use crate::models::Exercise;

/// Insert a catalog exercise.
pub async fn insert_exercise(conn: &mut PgConnection, name: &str) -> Result<Exercise> {
    let exercise =
        sqlx::query_as::<_, Exercise>("INSERT INTO exercises (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .context("failed to insert exercise")?;

    Ok(exercise)
}

/// Fetch a catalog exercise by its ID.
pub async fn get_exercise(conn: &mut PgConnection, id: i64) -> Result<Option<Exercise>> {
    let exercise = sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("failed to fetch exercise")?;

    Ok(exercise)
}

/// List the catalog by name.
pub async fn list_exercises(conn: &mut PgConnection) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(&mut *conn)
        .await
        .context("failed to list exercises")?;

    Ok(exercises)
}
