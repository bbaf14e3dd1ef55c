mod common;

use chatview::memory::ClientCall;
use chatview::{
    ButtonStyle, ClientOperation, Dispatch, ErrorCategory, InteractionEvent, Lifecycle,
    StopOptions, ViewError, ViewType, ViewTypeBuilder,
};
use common::{click, content, counter_view, edit_contents, setup, Counter, CHANNEL};

#[tokio::test]
async fn unknown_message_id_is_dropped_quietly() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let outcome = dispatcher
        .on_interaction(InteractionEvent::button("someone-else", "inc"))
        .await
        .expect("no error for foreign messages");
    assert_eq!(outcome, Dispatch::Unrouted);
    assert_eq!(handle.with_state(|state| state.clicks).await, 0);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn unknown_component_id_is_an_error() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let err = dispatcher
        .on_interaction(click(handle.message_id(), "nope"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ViewError::UnregisteredComponent { ref component_id, .. } if component_id == "nope"
    ));
    assert_eq!(err.category(), ErrorCategory::Dispatch);
    assert_eq!(client.calls().len(), 1);
    assert!(dispatcher.is_routed(handle.message_id()));
}

#[tokio::test]
async fn unchanged_callback_sends_nothing() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let outcome = dispatcher
        .on_interaction(click(handle.message_id(), "peek"))
        .await
        .expect("peek");
    assert_eq!(outcome, Dispatch::Unchanged);
    assert_eq!(handle.with_state(|state| state.peeks).await, 1);
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn changed_callback_edits_once_through_the_interaction() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let outcome = dispatcher
        .on_interaction(click(handle.message_id(), "inc"))
        .await
        .expect("inc");
    assert_eq!(outcome, Dispatch::Rerendered);

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    let ClientCall::Edit {
        message_id,
        via_interaction,
        message,
    } = &calls[1]
    else {
        panic!("expected an edit, got {:?}", calls[1]);
    };
    assert_eq!(message_id, handle.message_id());
    assert!(via_interaction);
    assert_eq!(content(message), "clicks: 1");
    assert!(dispatcher.is_routed(handle.message_id()));
}

#[tokio::test]
async fn predicates_see_the_interaction_only_while_it_is_handled() {
    let mut builder: ViewTypeBuilder<()> = ViewType::builder("echo");
    builder
        .define_button("ping", "Ping", ButtonStyle::Primary, None, |_: &mut (), _| true)
        .expect("ping");
    builder
        .define_view(|_, result| {
            result.set_content("idle");
            result.set_components(["ping"]);
        })
        .define_view_if(
            |_, event| event.is_some_and(|event| event.component_id == "ping"),
            |_, result| {
                result.set_content("pinged");
                result.set_components(["ping"]);
            },
        );

    let (client, dispatcher) = setup();
    let handle = builder
        .build()
        .start(&dispatcher, CHANNEL, ())
        .await
        .expect("start");

    dispatcher
        .on_interaction(click(handle.message_id(), "ping"))
        .await
        .expect("ping");
    handle.render().await.expect("host render");

    assert_eq!(edit_contents(&client), ["pinged", "idle"]);
    let calls = client.calls();
    assert!(matches!(&calls[2], ClientCall::Edit { via_interaction: false, .. }));
}

#[tokio::test]
async fn callback_can_stop_with_defaults() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let outcome = dispatcher
        .on_interaction(click(handle.message_id(), "done"))
        .await
        .expect("done");
    assert_eq!(outcome, Dispatch::Stopped);
    assert!(!dispatcher.is_routed(handle.message_id()));

    let edits = client.edits();
    assert_eq!(edits.len(), 1, "stop replaces the re-render");
    assert!(edits[0].components.iter().all(|c| c.is_disabled()));
    assert!(handle.is_stopped().await);
}

#[tokio::test]
async fn callback_can_stop_with_delete() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let outcome = dispatcher
        .on_interaction(click(handle.message_id(), "vanish"))
        .await
        .expect("vanish");
    assert_eq!(outcome, Dispatch::Stopped);
    assert!(client.message(handle.message_id()).is_none());
    assert_eq!(
        handle.lifecycle().await,
        Lifecycle::Stopped {
            disabled: false,
            deleted: true
        }
    );
}

#[tokio::test]
async fn stop_defaults_come_from_config() {
    let client = chatview::memory::MemoryClient::new();
    let mut config = chatview::config::Config::default();
    config.stop = StopOptions::delete();
    let dispatcher = chatview::Dispatcher::with_config(client.clone(), &config);

    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");
    dispatcher
        .on_interaction(click(handle.message_id(), "done"))
        .await
        .expect("done");

    assert!(client.edits().is_empty());
    assert_eq!(client.message_count(), 0);
}

#[tokio::test]
async fn failed_edit_leaves_message_unchanged() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");
    let before = client.message(handle.message_id()).expect("posted");

    client.fail_next(ClientOperation::Edit);
    let err = dispatcher
        .on_interaction(click(handle.message_id(), "inc"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ViewError::Client {
            operation: ClientOperation::Edit,
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Client);
    assert_eq!(client.message(handle.message_id()), Some(before.clone()));
    assert_eq!(handle.last_render().await, Some(before));

    // The view stays live and the next click goes through.
    dispatcher
        .on_interaction(click(handle.message_id(), "inc"))
        .await
        .expect("retry");
    assert_eq!(edit_contents(&client), ["clicks: 2"]);
}

#[tokio::test]
async fn concurrent_interactions_on_one_view_are_serialized() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            let event = click(handle.message_id(), "inc");
            tokio::spawn(async move { dispatcher.on_interaction(event).await })
        })
        .collect();
    for task in tasks {
        let outcome = task.await.expect("join").expect("inc");
        assert_eq!(outcome, Dispatch::Rerendered);
    }

    assert_eq!(handle.with_state(|state| state.clicks).await, 20);
    let mut seen = edit_contents(&client);
    seen.sort_by_key(|text| {
        text.trim_start_matches("clicks: ")
            .parse::<u32>()
            .expect("number")
    });
    let expected: Vec<_> = (1..=20).map(|n| format!("clicks: {}", n)).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn feed_runner_handles_events_in_order() {
    let (client, dispatcher) = setup();
    let handle = counter_view()
        .start(&dispatcher, CHANNEL, Counter::default())
        .await
        .expect("start");

    let (sender, feed) = dispatcher.event_feed();
    let runner = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.run(feed).await }
    });
    for component in ["inc", "peek", "nope", "inc", "done", "inc"] {
        sender
            .send(click(handle.message_id(), component))
            .await
            .expect("send");
    }
    drop(sender);
    runner.await.expect("runner");

    assert_eq!(
        handle.with_state(|state| (state.clicks, state.peeks)).await,
        (2, 1)
    );
    assert_eq!(
        edit_contents(&client),
        ["clicks: 1", "clicks: 2", "clicks: 2"]
    );
    assert!(handle.is_stopped().await);
}
