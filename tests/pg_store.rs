//! Runs against a real Postgres. Start one and run with
//! `DATABASE_URL=postgres://... cargo test --test pg_store -- --ignored`.

use std::sync::Arc;

use poll_service::db::{PgStore, PollStore, VoteOutcome, init_db};

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = init_db(&url, 40).await.expect("connect and bootstrap schema");
    PgStore::new(pool)
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn created_poll_reads_back_with_zero_counts() {
    let store = store().await;
    let created = store
        .create_poll("Color?", &texts(&["Red", "Blue"]))
        .await
        .unwrap();

    let fetched = store.get_poll(created.poll.id).await.unwrap().unwrap();
    assert_eq!(fetched.poll.question, "Color?");
    assert_eq!(fetched.options, created.options);
    assert_eq!(
        fetched.options.iter().map(|o| o.text.as_str()).collect::<Vec<_>>(),
        vec!["Red", "Blue"]
    );
    assert!(fetched.options.iter().all(|o| o.votes == 0));

    let listed = store.list_polls().await.unwrap();
    let entry = listed
        .iter()
        .find(|p| p.poll.id == created.poll.id)
        .expect("new poll is listed");
    assert_eq!(entry.options.len(), 2);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn foreign_or_missing_targets_change_nothing() {
    let store = store().await;
    let first = store.create_poll("A?", &texts(&["a1", "a2"])).await.unwrap();
    let second = store.create_poll("B?", &texts(&["b1", "b2"])).await.unwrap();
    let voter = format!("foreign-{}", first.poll.id);

    let foreign = store
        .cast_vote(first.poll.id, second.options[0].id, &voter)
        .await
        .unwrap();
    assert_eq!(foreign, VoteOutcome::OptionNotFound);

    let missing_poll = store
        .cast_vote(i32::MAX, first.options[0].id, &voter)
        .await
        .unwrap();
    assert_eq!(missing_poll, VoteOutcome::OptionNotFound);

    let missing_option = store.cast_vote(first.poll.id, i32::MAX, &voter).await.unwrap();
    assert_eq!(missing_option, VoteOutcome::OptionNotFound);

    assert!(store.get_poll(i32::MAX).await.unwrap().is_none());
    assert!(!store.has_voted(first.poll.id, &voter).await.unwrap());
    for poll in [first.poll.id, second.poll.id] {
        assert_eq!(store.get_poll(poll).await.unwrap().unwrap().total_votes(), 0);
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn concurrent_duplicates_record_exactly_once() {
    let store = Arc::new(store().await);
    let created = store
        .create_poll("Color?", &texts(&["Red", "Blue"]))
        .await
        .unwrap();
    let (poll_id, red) = (created.poll.id, created.options[0].id);
    let voter = format!("dup-{poll_id}");

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let store = Arc::clone(&store);
            let voter = voter.clone();
            tokio::spawn(async move { store.cast_vote(poll_id, red, &voter).await })
        })
        .collect();

    let (mut recorded, mut duplicates) = (0, 0);
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            VoteOutcome::Recorded { new_vote_count } => {
                assert_eq!(new_vote_count, 1);
                recorded += 1;
            }
            VoteOutcome::AlreadyVoted => duplicates += 1,
            VoteOutcome::OptionNotFound => panic!("option vanished"),
        }
    }
    assert_eq!((recorded, duplicates), (1, 31));

    let poll = store.get_poll(poll_id).await.unwrap().unwrap();
    assert_eq!(
        poll.options.iter().map(|o| o.votes).collect::<Vec<_>>(),
        vec![1, 0]
    );
    assert!(store.has_voted(poll_id, &voter).await.unwrap());
}
