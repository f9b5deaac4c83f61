//! Integration tests for the fan-out core.
//!
//! Exercises the registry/broadcaster/ingestion chain the way the
//! transport adapters drive it, without any sockets involved: register
//! subscribers, post through the application handler, drain queues.

use std::sync::Arc;

use proptest::prelude::*;

use pulse_chat::adapters::memory::InMemoryChatStore;
use pulse_chat::application::PostMessageHandler;
use pulse_chat::domain::chat::{ChannelName, ChatEvent, SenderDescriptor};
use pulse_chat::domain::foundation::{ChannelId, Timestamp};
use pulse_chat::ports::{ChatDirectory, IngestionError, MessageIngestion};
use pulse_chat::realtime::{Broadcaster, ChannelRegistry, QueueItem, SubscriberHandle};

async fn drain_until_shutdown(handle: &mut SubscriberHandle) -> Vec<String> {
    let mut contents = Vec::new();
    loop {
        match handle.next().await {
            QueueItem::Event(event) => contents.push(event.content),
            QueueItem::Shutdown => break,
        }
    }
    contents
}

struct TestChat {
    registry: Arc<ChannelRegistry>,
    store: Arc<InMemoryChatStore>,
    post_message: PostMessageHandler,
}

impl TestChat {
    fn new() -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let store = Arc::new(InMemoryChatStore::new());
        let ingestion: Arc<dyn MessageIngestion> = store.clone();
        let post_message =
            PostMessageHandler::new(ingestion, Broadcaster::new(Arc::clone(&registry)));
        Self {
            registry,
            store,
            post_message,
        }
    }

    async fn channel(&self, name: &str) -> ChannelId {
        self.store
            .create_channel(ChannelName::new(name).unwrap())
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn posted_message_reaches_every_live_subscriber_and_the_store() {
    let chat = TestChat::new();
    let channel = chat.channel("General").await;

    let mut a = chat.registry.register(channel).await;
    let mut b = chat.registry.register(channel).await;

    let sender = SenderDescriptor::Authenticated("alice".into());
    chat.post_message
        .handle(channel, &sender, "hello everyone")
        .await
        .unwrap();

    chat.registry.shutdown().await;
    assert_eq!(drain_until_shutdown(&mut a).await, vec!["hello everyone"]);
    assert_eq!(drain_until_shutdown(&mut b).await, vec!["hello everyone"]);

    // The read path serves the same message back.
    let history = chat.store.recent_messages(channel, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender, "alice");
    assert_eq!(history[0].content, "hello everyone");
}

#[tokio::test]
async fn subscriber_churn_scenario() {
    // A and B are subscribed; "hi" reaches both. C joins after, B leaves;
    // "bye" reaches A and C only.
    let chat = TestChat::new();
    let channel = chat.channel("General").await;
    let sender = SenderDescriptor::Authenticated("alice".into());

    let mut a = chat.registry.register(channel).await;
    let mut b = chat.registry.register(channel).await;

    chat.post_message.handle(channel, &sender, "hi").await.unwrap();

    let mut c = chat.registry.register(channel).await;
    chat.registry.deregister(channel, b.id()).await;

    chat.post_message.handle(channel, &sender, "bye").await.unwrap();

    chat.registry.shutdown().await;
    assert_eq!(drain_until_shutdown(&mut a).await, vec!["hi", "bye"]);
    assert_eq!(drain_until_shutdown(&mut b).await, vec!["hi"]);
    assert_eq!(drain_until_shutdown(&mut c).await, vec!["bye"]);
}

#[tokio::test]
async fn publish_to_subscriberless_channel_has_no_effect() {
    let chat = TestChat::new();
    let channel = chat.channel("Quiet").await;

    let sender = SenderDescriptor::Anonymous;
    chat.post_message
        .handle(channel, &sender, "echo?")
        .await
        .unwrap();

    // Persisted, not delivered anywhere, no registry state created.
    assert_eq!(chat.store.message_count(channel).await, 1);
    assert!(chat.registry.active_channels().await.is_empty());
}

#[tokio::test]
async fn failed_ingestion_never_fans_out() {
    let chat = TestChat::new();
    let channel = chat.channel("General").await;
    let sender = SenderDescriptor::Anonymous;

    let mut subscriber = chat.registry.register(channel).await;

    let unknown = ChannelId::new(999);
    let err = chat
        .post_message
        .handle(unknown, &sender, "to nowhere")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::ChannelNotFound(_)));

    let err = chat
        .post_message
        .handle(channel, &sender, "")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::ValidationFailed(_)));

    chat.registry.shutdown().await;
    assert!(drain_until_shutdown(&mut subscriber).await.is_empty());
    assert_eq!(chat.store.message_count(channel).await, 0);
}

#[tokio::test]
async fn shutdown_closes_every_queue_and_empties_the_registry() {
    let chat = TestChat::new();
    let one = chat.channel("one").await;
    let two = chat.channel("two").await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        handles.push(chat.registry.register(one).await);
    }
    for _ in 0..3 {
        handles.push(chat.registry.register(two).await);
    }
    assert_eq!(chat.registry.total_subscribers().await, 8);

    chat.registry.shutdown().await;

    for handle in handles.iter_mut() {
        assert!(drain_until_shutdown(handle).await.is_empty());
    }
    assert_eq!(chat.registry.total_subscribers().await, 0);
    assert!(chat.registry.active_channels().await.is_empty());
}

#[tokio::test]
async fn sequential_publishes_arrive_in_completion_order_for_all_subscribers() {
    let chat = TestChat::new();
    let channel = chat.channel("General").await;
    let sender = SenderDescriptor::Authenticated("alice".into());

    let mut a = chat.registry.register(channel).await;
    let mut b = chat.registry.register(channel).await;

    // Different broadcaster clones stand in for concurrent callers; the
    // first call completes before the second starts.
    let first = chat.post_message.clone();
    let second = chat.post_message.clone();
    first.handle(channel, &sender, "P1").await.unwrap();
    second.handle(channel, &sender, "P2").await.unwrap();

    chat.registry.shutdown().await;
    assert_eq!(drain_until_shutdown(&mut a).await, vec!["P1", "P2"]);
    assert_eq!(drain_until_shutdown(&mut b).await, vec!["P1", "P2"]);
}

#[tokio::test]
async fn concurrent_publishers_preserve_their_own_order() {
    const PUBLISHERS: usize = 3;
    const MESSAGES_EACH: usize = 50;

    let registry = Arc::new(ChannelRegistry::new());
    let broadcaster = Broadcaster::new(Arc::clone(&registry));
    let channel = ChannelId::new(1);

    let mut subscriber = registry.register(channel).await;

    let mut tasks = Vec::new();
    for publisher in 0..PUBLISHERS {
        let broadcaster = broadcaster.clone();
        tasks.push(tokio::spawn(async move {
            for seq in 0..MESSAGES_EACH {
                let event = ChatEvent::new(
                    format!("publisher-{publisher}"),
                    format!("{publisher}:{seq}"),
                    Timestamp::now(),
                );
                broadcaster.publish(channel, event).await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    registry.shutdown().await;

    let received = drain_until_shutdown(&mut subscriber).await;
    assert_eq!(received.len(), PUBLISHERS * MESSAGES_EACH);

    // Within each publisher the sequence numbers must be ascending.
    for publisher in 0..PUBLISHERS {
        let prefix = format!("{publisher}:");
        let sequence: Vec<usize> = received
            .iter()
            .filter_map(|content| content.strip_prefix(&prefix))
            .map(|seq| seq.parse().unwrap())
            .collect();
        assert_eq!(sequence, (0..MESSAGES_EACH).collect::<Vec<_>>());
    }
}

// ============================================
// Delivery property
// ============================================

#[derive(Debug, Clone)]
enum Op {
    Register,
    Deregister(usize),
    Publish,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Register),
        1 => (0usize..8).prop_map(Op::Deregister),
        3 => Just(Op::Publish),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every subscriber receives exactly the events published while it
    /// was registered, in publish order - no loss, no duplication, no
    /// delivery after removal.
    #[test]
    fn subscribers_see_exactly_their_registered_window(
        ops in proptest::collection::vec(op_strategy(), 1..40)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let registry = Arc::new(ChannelRegistry::new());
            let broadcaster = Broadcaster::new(Arc::clone(&registry));
            let channel = ChannelId::new(1);

            // Model: for each handle, the contents it must end up seeing.
            let mut live: Vec<(SubscriberHandle, Vec<String>)> = Vec::new();
            let mut retired: Vec<(SubscriberHandle, Vec<String>)> = Vec::new();
            let mut counter = 0u32;

            for op in ops {
                match op {
                    Op::Register => {
                        live.push((registry.register(channel).await, Vec::new()));
                    }
                    Op::Deregister(pick) => {
                        if !live.is_empty() {
                            let (handle, expected) = live.remove(pick % live.len());
                            registry.deregister(channel, handle.id()).await;
                            retired.push((handle, expected));
                        }
                    }
                    Op::Publish => {
                        counter += 1;
                        let content = format!("m{counter}");
                        broadcaster
                            .publish(
                                channel,
                                ChatEvent::new("prop", content.clone(), Timestamp::now()),
                            )
                            .await;
                        for (_, expected) in live.iter_mut() {
                            expected.push(content.clone());
                        }
                    }
                }
            }

            registry.shutdown().await;

            for (mut handle, expected) in live.into_iter().chain(retired) {
                let mut got = Vec::new();
                loop {
                    match handle.next().await {
                        QueueItem::Event(event) => got.push(event.content),
                        QueueItem::Shutdown => break,
                    }
                }
                prop_assert_eq!(got, expected);
            }
            Ok(())
        })?;
    }
}
