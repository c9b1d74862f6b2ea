//! Unit tests for per-conversation locking.

use std::sync::Arc;
use std::time::Duration;

use tenant_comms_governor::scheduler::locks::ConversationLocks;

#[tokio::test]
async fn same_conversation_is_serialized() {
    let locks = Arc::new(ConversationLocks::new());
    let guard = locks.acquire("c1").await;

    let contender = {
        let locks = Arc::clone(&locks);
        tokio::spawn(async move {
            let _guard = locks.acquire("c1").await;
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!contender.is_finished(), "second holder must wait");

    drop(guard);
    tokio::time::timeout(Duration::from_secs(2), contender)
        .await
        .expect("released")
        .expect("join");
}

#[tokio::test]
async fn distinct_conversations_do_not_block() {
    let locks = ConversationLocks::new();
    let _a = locks.acquire("a").await;
    let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("b")).await;
    assert!(b.is_ok());
    assert_eq!(locks.len(), 2);
}

#[tokio::test]
async fn release_idle_only_drops_unheld_entries() {
    let locks = ConversationLocks::new();
    let guard = locks.acquire("c1").await;
    assert!(!locks.release_idle("c1"));

    drop(guard);
    assert!(locks.release_idle("c1"));
    assert!(locks.is_empty());
    assert!(!locks.release_idle("c1"));
}
