use crate::db::connection::DbPool;
use crate::db::models::{Poll, PollDetails, PollOption};
use sqlx::Error;
use std::collections::HashMap;

pub async fn create_poll(
    pool: &DbPool,
    question: &str,
    options: &[String],
) -> Result<PollDetails, Error> {
    let mut tx = pool.begin().await?;

    let poll = sqlx::query_as::<_, Poll>(
        "INSERT INTO polls (question) VALUES ($1) RETURNING id, question, created_at",
    )
    .bind(question)
    .fetch_one(&mut *tx)
    .await?;

    let mut created = Vec::with_capacity(options.len());
    for text in options {
        let option = sqlx::query_as::<_, PollOption>(
            "INSERT INTO poll_options (poll_id, text) VALUES ($1, $2) RETURNING id, poll_id, text, votes",
        )
        .bind(poll.id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        created.push(option);
    }

    tx.commit().await?;

    Ok(PollDetails {
        poll,
        options: created,
    })
}

pub async fn get_poll(pool: &DbPool, poll_id: i32) -> Result<Option<Poll>, Error> {
    let row = sqlx::query_as::<_, Poll>("SELECT id, question, created_at FROM polls WHERE id = $1")
        .bind(poll_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_all_polls(pool: &DbPool) -> Result<Vec<Poll>, Error> {
    let rows = sqlx::query_as::<_, Poll>("SELECT id, question, created_at FROM polls ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn get_poll_options(pool: &DbPool, poll_id: i32) -> Result<Vec<PollOption>, Error> {
    let rows = sqlx::query_as::<_, PollOption>(
        "SELECT id, poll_id, text, votes FROM poll_options WHERE poll_id = $1 ORDER BY id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Loads every poll with its options in two queries.
pub async fn get_all_poll_details(pool: &DbPool) -> Result<Vec<PollDetails>, Error> {
    let polls = get_all_polls(pool).await?;

    let options = sqlx::query_as::<_, PollOption>(
        "SELECT id, poll_id, text, votes FROM poll_options ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut by_poll: HashMap<i32, Vec<PollOption>> = HashMap::new();
    for option in options {
        by_poll.entry(option.poll_id).or_default().push(option);
    }

    Ok(polls
        .into_iter()
        .map(|poll| {
            let options = by_poll.remove(&poll.id).unwrap_or_default();
            PollDetails { poll, options }
        })
        .collect())
}
