mod common;

use std::time::Duration;

use chat_core::domain::message::errors::ChatError;
use chat_core::ChatEvent;
use chat_core::ConnectionId;
use chat_core::MessageId;
use chat_core::Reaction;
use chat_core::Username;
use common::recv_event;
use common::TestChat;
use futures::future::join_all;

#[tokio::test]
async fn test_send_persists_and_broadcasts() {
    let app = TestChat::build();

    let mut alice = app
        .chat
        .join(ConnectionId::new(), "alice")
        .await
        .expect("Failed to join");
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Presence {
            users: vec!["alice".to_string()]
        }
    );

    let stored = app
        .chat
        .send("alice", "hello everyone")
        .await
        .expect("Failed to send");

    // The broadcast carries the persisted form, stamped id and all
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Message(stored.clone())
    );

    // Once the broadcast is observable, history already holds the message
    let recent = app.chat.recent_messages().await.expect("Failed to read history");
    assert_eq!(recent.first().map(|entry| &entry.message), Some(&stored));
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let app = TestChat::build();

    app.chat.send("alice", "one").await.unwrap();
    app.chat.send("bob", "two").await.unwrap();
    app.chat.send("alice", "three").await.unwrap();

    let recent = app.chat.recent_messages().await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].message.content.as_str(), "three");
    assert_eq!(recent[1].message.content.as_str(), "two");
    assert_eq!(recent[2].message.content.as_str(), "one");
    assert!(recent[0].message.timestamp > recent[1].message.timestamp);
    assert!(recent[1].message.timestamp > recent[2].message.timestamp);
}

#[tokio::test]
async fn test_join_catches_up_through_history_not_replay() {
    let app = TestChat::build();

    // Sent before anyone subscribed; delivered to no one
    app.chat.send("alice", "earlier").await.unwrap();

    let mut bob = app
        .chat
        .join(ConnectionId::new(), "bob")
        .await
        .expect("Failed to join");

    // The subscription starts with the roster, not a replay of old messages
    assert_eq!(
        recv_event(&mut bob).await,
        ChatEvent::Presence {
            users: vec!["bob".to_string()]
        }
    );

    let stored = app.chat.send("alice", "later").await.unwrap();
    assert_eq!(recv_event(&mut bob).await, ChatEvent::Message(stored));

    // Earlier traffic is reachable through history
    let recent = app.chat.recent_messages().await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].message.content.as_str(), "earlier");
}

#[tokio::test]
async fn test_concurrent_sends_reach_all_subscribers_in_one_order() {
    let app = TestChat::build();

    // Subscribe at the hub to keep presence events out of the queues
    let mut alice = app
        .hub
        .subscribe(ConnectionId::new(), Username::new("alice".to_string()).unwrap())
        .await;
    let mut bob = app
        .hub
        .subscribe(ConnectionId::new(), Username::new("bob".to_string()).unwrap())
        .await;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let chat = app.chat.clone();
        tasks.push(tokio::spawn(async move {
            chat.send("alice", &format!("message {}", i))
                .await
                .expect("Failed to send")
        }));
    }
    for result in join_all(tasks).await {
        result.expect("Send task panicked");
    }

    let mut alice_seen = Vec::new();
    let mut bob_seen = Vec::new();
    for _ in 0..10 {
        match recv_event(&mut alice).await {
            ChatEvent::Message(message) => alice_seen.push(message),
            other => panic!("Unexpected event: {:?}", other),
        }
        match recv_event(&mut bob).await {
            ChatEvent::Message(message) => bob_seen.push(message),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    // Every subscriber observes the same total order
    assert_eq!(alice_seen, bob_seen);

    // History is that same order, newest first
    let recent = app.chat.recent_messages().await.unwrap();
    assert_eq!(recent.len(), 10);
    let mut replay: Vec<_> = recent.iter().map(|entry| entry.message.clone()).collect();
    replay.reverse();
    assert_eq!(replay, alice_seen);
    for pair in recent.windows(2) {
        assert!(pair[0].message.timestamp > pair[1].message.timestamp);
    }
}

#[tokio::test]
async fn test_slow_subscriber_keeps_newest_events() {
    let app = TestChat::with_queue_capacity(2);

    let mut carol = app
        .hub
        .subscribe(ConnectionId::new(), Username::new("carol".to_string()).unwrap())
        .await;

    app.chat.send("alice", "one").await.unwrap();
    app.chat.send("alice", "two").await.unwrap();
    app.chat.send("alice", "three").await.unwrap();

    // The oldest event was dropped to make room; senders never blocked
    match recv_event(&mut carol).await {
        ChatEvent::Message(message) => assert_eq!(message.content.as_str(), "two"),
        other => panic!("Unexpected event: {:?}", other),
    }
    match recv_event(&mut carol).await {
        ChatEvent::Message(message) => assert_eq!(message.content.as_str(), "three"),
        other => panic!("Unexpected event: {:?}", other),
    }
    assert_eq!(carol.dropped(), 1);
}

#[tokio::test]
async fn test_presence_follows_joins_and_leaves() {
    let app = TestChat::build();

    let alice_connection = ConnectionId::new();
    let bob_connection = ConnectionId::new();

    let mut alice = app.chat.join(alice_connection, "alice").await.unwrap();
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Presence {
            users: vec!["alice".to_string()]
        }
    );

    let mut bob = app.chat.join(bob_connection, "bob").await.unwrap();
    let roster = ChatEvent::Presence {
        users: vec!["alice".to_string(), "bob".to_string()],
    };
    assert_eq!(recv_event(&mut alice).await, roster);
    assert_eq!(recv_event(&mut bob).await, roster);

    app.chat.leave(bob_connection).await;
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Presence {
            users: vec!["alice".to_string()]
        }
    );

    // The departed subscription is closed, not left dangling
    let closed = tokio::time::timeout(Duration::from_secs(1), bob.recv())
        .await
        .expect("Timed out waiting for close");
    assert_eq!(closed, None);
}

#[tokio::test]
async fn test_leave_is_idempotent() {
    let app = TestChat::build();

    let connection = ConnectionId::new();
    let mut alice = app.chat.join(connection, "alice").await.unwrap();
    recv_event(&mut alice).await;

    app.chat.leave(connection).await;
    // A second leave for the same connection announces nothing
    app.chat.leave(connection).await;

    assert_eq!(app.hub.subscriber_count().await, 0);
}

#[tokio::test]
async fn test_typing_indicator_broadcasts_changes_only() {
    let app = TestChat::build();

    let mut alice = app.chat.join(ConnectionId::new(), "alice").await.unwrap();
    recv_event(&mut alice).await;

    app.chat.set_typing("alice", true).await.unwrap();
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Typing {
            users: vec!["alice".to_string()]
        }
    );

    // Repeating the same state publishes nothing; the next event is the
    // roster change from a second typist
    app.chat.set_typing("alice", true).await.unwrap();
    app.chat.set_typing("bob", true).await.unwrap();
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Typing {
            users: vec!["alice".to_string(), "bob".to_string()]
        }
    );

    app.chat.set_typing("alice", false).await.unwrap();
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Typing {
            users: vec!["bob".to_string()]
        }
    );
}

#[tokio::test]
async fn test_leave_clears_typing_state() {
    let app = TestChat::build();

    let alice_connection = ConnectionId::new();
    let mut alice = app.chat.join(alice_connection, "alice").await.unwrap();
    let mut bob = app.chat.join(ConnectionId::new(), "bob").await.unwrap();
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;
    recv_event(&mut bob).await;

    app.chat.set_typing("alice", true).await.unwrap();
    recv_event(&mut bob).await;

    app.chat.leave(alice_connection).await;

    // Bob sees the shrunk roster, then the typing set without alice
    assert_eq!(
        recv_event(&mut bob).await,
        ChatEvent::Presence {
            users: vec!["bob".to_string()]
        }
    );
    assert_eq!(
        recv_event(&mut bob).await,
        ChatEvent::Typing { users: Vec::new() }
    );
}

#[tokio::test]
async fn test_reactions_toggle_and_broadcast() {
    let app = TestChat::build();

    let mut alice = app.chat.join(ConnectionId::new(), "alice").await.unwrap();
    recv_event(&mut alice).await;

    let stored = app.chat.send("alice", "hello").await.unwrap();
    recv_event(&mut alice).await;

    let update = app.chat.react(stored.id, "👍", "bob").await.unwrap();
    assert_eq!(update.count, 1);
    assert_eq!(update.users, vec!["bob"]);
    assert_eq!(
        recv_event(&mut alice).await,
        ChatEvent::Reaction(update.clone())
    );

    // Toggling again withdraws the reaction
    let update = app.chat.react(stored.id, "👍", "bob").await.unwrap();
    assert_eq!(update.count, 0);
    assert!(update.users.is_empty());
    assert_eq!(recv_event(&mut alice).await, ChatEvent::Reaction(update));
}

#[tokio::test]
async fn test_history_carries_reaction_state() {
    let app = TestChat::build();

    let stored = app.chat.send("alice", "hello").await.unwrap();
    app.chat.react(stored.id, "👍", "bob").await.unwrap();

    // A client that never saw the reaction broadcast recovers it by
    // reloading history
    let recent = app.chat.recent_messages().await.unwrap();
    assert_eq!(recent[0].message.id, stored.id);
    assert_eq!(
        recent[0].reactions,
        vec![Reaction {
            emoji: "👍".to_string(),
            users: vec!["bob".to_string()],
        }]
    );

    // Withdrawing the reaction clears it from read-back as well
    app.chat.react(stored.id, "👍", "bob").await.unwrap();
    let recent = app.chat.recent_messages().await.unwrap();
    assert!(recent[0].reactions.is_empty());
}

#[tokio::test]
async fn test_react_validation_errors() {
    let app = TestChat::build();

    let stored = app.chat.send("alice", "hello").await.unwrap();

    let err = app.chat.react(MessageId::new(), "👍", "bob").await.unwrap_err();
    assert!(matches!(err, ChatError::MessageNotFound(_)));

    let err = app.chat.react(stored.id, "", "bob").await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyEmoji));

    let err = app.chat.react(stored.id, "👍", "").await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidUsername(_)));
}

#[tokio::test]
async fn test_send_validation_errors() {
    let app = TestChat::build();

    let err = app.chat.send("alice", "").await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidContent(_)));

    let err = app.chat.send("", "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidUsername(_)));

    assert!(app.chat.recent_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_reflect_live_state() {
    let app = TestChat::build();

    let stats = app.chat.stats().await.unwrap();
    assert_eq!(stats.subscribers, 0);
    assert_eq!(stats.online_users, 0);
    assert_eq!(stats.total_messages, 0);

    let mut alice = app.chat.join(ConnectionId::new(), "alice").await.unwrap();
    recv_event(&mut alice).await;
    app.chat.send("alice", "one").await.unwrap();
    app.chat.send("alice", "two").await.unwrap();
    recv_event(&mut alice).await;
    recv_event(&mut alice).await;

    let stats = app.chat.stats().await.unwrap();
    assert_eq!(stats.subscribers, 1);
    assert_eq!(stats.online_users, 1);
    assert_eq!(stats.total_messages, 2);
}
