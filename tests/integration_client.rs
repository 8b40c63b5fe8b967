#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::must_use_candidate, missing_debug_implementations, unreachable_pub)]
mod common;

use common::TestApp;
use proconnect_messaging::client::{ClientConfig, ClientError, MessageQueries, MessagingClient, QueryKey};
use proconnect_messaging::views::conversation_list::{EMPTY_LIST_TEXT, ListState};
use proconnect_messaging::views::thread::{Side, ThreadState};
use proconnect_messaging::views::{ConversationView, Counterpart, DEFAULT_AVATAR, MessageBox, MessagesPage, NotificationBadge};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

#[tokio::test]
async fn test_client_round_trip_with_session_cookie() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let client = app.client_for(&alice);

    let sent = client.send_message(bob.user_id, "hello from the client").await.unwrap();
    assert_eq!(sent.sender.id, alice.user_id);
    assert_eq!(sent.recipient.id, bob.user_id);
    assert!(!sent.read);

    let thread = client.list_thread(bob.user_id).await.unwrap();
    assert_eq!(thread, vec![sent.clone()]);

    let conversations = client.list_conversations().await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].user.id, bob.user_id);
    assert_eq!(conversations[0].last_message.id, sent.id);

    assert_eq!(app.client_for(&bob).unread_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_client_surfaces_api_errors() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");

    let err = app.client_for(&alice).send_message(bob.user_id, "  ").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Message content must not be empty");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let anonymous = MessagingClient::new(&app.client_config(), "not-a-token").unwrap();
    assert!(matches!(anonymous.list_conversations().await, Err(ClientError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_send_invalidates_cached_queries() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let queries = app.queries_for(&alice);

    assert!(queries.thread(bob.user_id).await.unwrap().is_empty());
    assert!(queries.conversations().await.unwrap().is_empty());
    assert!(queries.cache().get(QueryKey::Thread(bob.user_id)).is_some());

    queries.send(bob.user_id, "ping").await.unwrap();
    assert!(queries.cache().get(QueryKey::Thread(bob.user_id)).is_none());
    assert!(queries.cache().get(QueryKey::Conversations).is_none());

    assert_eq!(queries.thread(bob.user_id).await.unwrap().len(), 1);
    assert_eq!(queries.conversations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_send_keeps_cache() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let queries = app.queries_for(&alice);

    queries.refetch_thread(bob.user_id).await.unwrap();
    assert!(queries.send(Uuid::new_v4(), "to nobody").await.is_err());

    assert_eq!(queries.cached_thread(bob.user_id), Some(vec![]));
}

#[tokio::test]
async fn test_messages_page_lists_and_selects() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let carol = app.create_user("Carol");

    let mut page = MessagesPage::new(app.queries_for(&alice));
    let now = OffsetDateTime::now_utc();
    assert_eq!(page.list(now), ListState::Loading);

    page.load().await.unwrap();
    assert_eq!(page.list(now), ListState::Empty);
    assert!(!EMPTY_LIST_TEXT.is_empty());

    app.send_message(&bob, alice.user_id, "hi alice").await;
    app.send_message(&alice, carol.user_id, "hi carol").await;
    page.load().await.unwrap();

    let ListState::Ready(rows) = page.list(OffsetDateTime::now_utc()) else { panic!("expected rows") };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user_id, carol.user_id);
    assert_eq!(rows[0].unread_badge, None);
    assert_eq!(rows[1].user_id, bob.user_id);
    assert_eq!(rows[1].preview, "hi alice");
    assert_eq!(rows[1].unread_badge, Some(1));
    assert_eq!(rows[1].avatar_url, DEFAULT_AVATAR);
    assert_eq!(rows[1].time_label, "less than a minute ago");
    assert!(rows.iter().all(|r| !r.selected));

    assert!(!page.select(Uuid::new_v4()));
    assert!(page.select(bob.user_id));
    assert_eq!(page.selected().map(|c| c.id), Some(bob.user_id));

    let ListState::Ready(rows) = page.list(OffsetDateTime::now_utc()) else { panic!("expected rows") };
    assert!(rows[1].selected);

    let view = page.conversation_view();
    view.load().await.unwrap();
    let ThreadState::Ready(bubbles) = view.state(OffsetDateTime::now_utc()) else { panic!("expected bubbles") };
    assert_eq!(bubbles.len(), 1);
    assert_eq!(bubbles[0].side, Side::Left);
}

#[tokio::test]
async fn test_conversation_view_submit() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let queries = app.queries_for(&alice);

    let unselected = ConversationView::new(queries.clone(), None);
    assert_eq!(unselected.state(OffsetDateTime::now_utc()), ThreadState::NoSelection);
    assert!(!unselected.can_submit());

    let counterpart = Counterpart { id: bob.user_id, name: bob.summary.name.clone(), profile_picture: None };
    assert_eq!(counterpart.avatar_url(), DEFAULT_AVATAR);
    let mut view = ConversationView::new(queries, Some(counterpart));
    assert_eq!(view.state(OffsetDateTime::now_utc()), ThreadState::Loading);
    view.load().await.unwrap();
    assert_eq!(view.state(OffsetDateTime::now_utc()), ThreadState::Empty);

    view.set_draft("   ");
    assert!(!view.can_submit());
    assert!(view.submit().await.unwrap().is_none());
    assert_eq!(app.store.message_count().await, 0);

    view.set_draft("Hello Bob");
    assert!(view.can_submit());
    let sent = view.submit().await.unwrap().unwrap();
    assert_eq!(sent.content, "Hello Bob");
    assert_eq!(view.draft(), "");

    let ThreadState::Ready(bubbles) = view.state(OffsetDateTime::now_utc()) else { panic!("expected bubbles") };
    assert_eq!(bubbles.len(), 1);
    assert_eq!(bubbles[0].side, Side::Right);
}

fn unresponsive_queries(base_url: String, request_timeout: Duration) -> MessageQueries {
    let config = ClientConfig { base_url, request_timeout, thread_poll_interval: Duration::from_millis(50), ..ClientConfig::default() };
    MessageQueries::new(MessagingClient::new(&config, "token").unwrap(), config.stale_after)
}

#[tokio::test]
async fn test_cancelled_submit_allows_retry() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let counterpart = Counterpart { id: bob.user_id, name: "Bob".into(), profile_picture: None };

    let stalled = unresponsive_queries(common::unresponsive_api().await, Duration::from_secs(30));
    let mut view = ConversationView::new(stalled, Some(counterpart.clone()));
    view.set_draft("Hello Bob");
    assert!(tokio::time::timeout(Duration::from_millis(100), view.submit()).await.is_err());

    assert_eq!(view.draft(), "Hello Bob");
    assert!(view.can_submit(), "a dropped submit must not block the next one");

    let mut view = ConversationView::new(app.queries_for(&alice), Some(counterpart));
    view.set_draft("Hello Bob");
    assert!(view.can_submit());
    assert_eq!(view.submit().await.unwrap().unwrap().content, "Hello Bob");
    assert_eq!(app.store.message_count().await, 1);
}

#[tokio::test]
async fn test_close_does_not_wait_for_in_flight_poll() {
    let queries = unresponsive_queries(common::unresponsive_api().await, Duration::from_secs(3));
    let recipient = Counterpart { id: Uuid::new_v4(), name: "Bob".into(), profile_picture: None };
    let mut message_box = MessageBox::new(queries, recipient, Duration::from_millis(50));

    message_box.open();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let begin = std::time::Instant::now();
    message_box.close();
    assert!(begin.elapsed() < Duration::from_millis(100));
    assert!(!message_box.is_open());
}

#[tokio::test]
async fn test_stale_poll_does_not_overwrite_refetch() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let queries = app.queries_for(&alice);
    let key = QueryKey::Thread(bob.user_id);

    let poll_started = queries.cache().generation(key);
    queries.send(bob.user_id, "fresh").await.unwrap();
    queries.refetch_thread(bob.user_id).await.unwrap();

    let stale = proconnect_messaging::client::cache::QueryData::Thread(vec![]);
    assert!(!queries.cache().put_fetched(key, poll_started, stale));
    assert_eq!(queries.cached_thread(bob.user_id).map(|t| t.len()), Some(1));
}

#[tokio::test]
async fn test_message_box_polls_while_open() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");
    let queries = app.queries_for(&alice);

    let recipient = Counterpart { id: bob.user_id, name: "Bob".into(), profile_picture: None };
    let mut message_box = MessageBox::new(queries.clone(), recipient, app.client_config().thread_poll_interval);
    assert_eq!(message_box.title(), "Bob");
    assert!(!message_box.is_open());

    message_box.open();
    assert!(message_box.is_open());

    app.send_message(&bob, alice.user_id, "are you there?").await;
    let seen = common::wait_until(Duration::from_secs(2), || {
        queries.cached_thread(bob.user_id).is_some_and(|thread| thread.len() == 1)
    })
    .await;
    assert!(seen, "open message box should pick up new messages by polling");

    let bubbles = message_box.messages(OffsetDateTime::now_utc());
    assert_eq!(bubbles[0].content, "are you there?");
    assert_eq!(bubbles[0].side, Side::Left);

    message_box.set_draft("yes");
    message_box.submit().await.unwrap();
    assert_eq!(message_box.messages(OffsetDateTime::now_utc()).len(), 2);

    message_box.close();
    assert!(!message_box.is_open());

    queries.cache().clear();
    app.send_message(&bob, alice.user_id, "hello?").await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(queries.cached_thread(bob.user_id).is_none(), "closed message box must not poll");
}

#[tokio::test]
async fn test_notification_badge() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("Alice");
    let bob = app.create_user("Bob");

    let mut badge = NotificationBadge::new(app.queries_for(&alice));
    assert_eq!(badge.count(), 0);
    assert_eq!(badge.label(), None);

    badge.mount(app.client_config().unread_poll_interval);
    assert!(badge.is_mounted());

    app.send_message(&bob, alice.user_id, "one").await;
    app.send_message(&bob, alice.user_id, "two").await;

    assert!(common::wait_until(Duration::from_secs(2), || badge.count() == 2).await);
    assert_eq!(badge.label().as_deref(), Some("2"));

    badge.unmount();
    assert!(!badge.is_mounted());
}
