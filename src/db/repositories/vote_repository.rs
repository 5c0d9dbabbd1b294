use crate::db::connection::DbPool;
use crate::db::models::VoteOutcome;
use sqlx::Error;

/// Records one vote for `option_id` on behalf of `voter_ip`.
///
/// The ownership check, the dedup insert and the counter increment share one
/// transaction. `UNIQUE(poll_id, voter_ip)` settles concurrent duplicates: the
/// loser's insert hits `ON CONFLICT DO NOTHING` and no counter moves.
pub async fn cast_vote(
    pool: &DbPool,
    poll_id: i32,
    option_id: i32,
    voter_ip: &str,
) -> Result<VoteOutcome, Error> {
    let mut tx = pool.begin().await?;

    let owner: Option<i32> = sqlx::query_scalar("SELECT poll_id FROM poll_options WHERE id = $1")
        .bind(option_id)
        .fetch_optional(&mut *tx)
        .await?;

    if owner != Some(poll_id) {
        tx.rollback().await?;
        return Ok(VoteOutcome::OptionNotFound);
    }

    let inserted: Option<i32> = sqlx::query_scalar(
        r#"
        INSERT INTO poll_votes (poll_id, voter_ip)
        VALUES ($1, $2)
        ON CONFLICT (poll_id, voter_ip) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(poll_id)
    .bind(voter_ip)
    .fetch_optional(&mut *tx)
    .await?;

    if inserted.is_none() {
        tx.rollback().await?;
        return Ok(VoteOutcome::AlreadyVoted);
    }

    let new_vote_count: i32 =
        sqlx::query_scalar("UPDATE poll_options SET votes = votes + 1 WHERE id = $1 RETURNING votes")
            .bind(option_id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;
    Ok(VoteOutcome::Recorded { new_vote_count })
}

pub async fn user_has_voted(pool: &DbPool, poll_id: i32, voter_ip: &str) -> Result<bool, Error> {
    let row: Option<i32> =
        sqlx::query_scalar("SELECT id FROM poll_votes WHERE poll_id = $1 AND voter_ip = $2")
            .bind(poll_id)
            .bind(voter_ip)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}
