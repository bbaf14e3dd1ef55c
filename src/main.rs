//! `chatview` demo runner.
//!
//! Starts one of the bundled views against the in-memory client, feeds it
//! the clicks given on the command line and prints every client call as a
//! JSON line.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use chatview::config::Config;
use chatview::demos;
use chatview::logging::init_tracing;
use chatview::memory::MemoryClient;
use chatview::{ComponentKind, Dispatcher, InteractionEvent, MessageId, ViewType};

#[derive(Parser)]
#[command(name = "chatview")]
#[command(about = "Run an interactive message view against an in-memory chat", long_about = None)]
#[command(version)]
struct Cli {
    /// Demo view to start
    #[arg(value_enum)]
    demo: Demo,

    /// Component to interact with, in order. Select menus take
    /// `ID=VALUE[,VALUE...]`
    #[arg(short, long = "click", value_name = "ID[=VALUE]")]
    clicks: Vec<String>,

    /// Channel the view is posted to
    #[arg(long, default_value = "demo")]
    channel: String,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Leave the view live on exit instead of stopping it
    #[arg(long)]
    keep_live: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// Two pages switched with `<` / `>` buttons
    Menu,
    /// Four pages picked from a select menu
    Pager,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;
    init_tracing(&config.logging);

    let client = MemoryClient::new();
    let dispatcher = Dispatcher::with_config(client.clone(), &config);

    match cli.demo {
        Demo::Menu => drive(demos::menu()?, demos::MenuState::default(), &dispatcher, &cli).await?,
        Demo::Pager => {
            drive(demos::pager()?, demos::PagerState::default(), &dispatcher, &cli).await?
        }
    }

    if !cli.keep_live {
        dispatcher
            .shutdown(config.stop)
            .await
            .context("Failed to stop views")?;
    }

    for call in client.calls() {
        println!("{}", serde_json::to_string(&call)?);
    }
    Ok(())
}

async fn drive<S: Send + 'static>(
    view: ViewType<S>,
    state: S,
    dispatcher: &Dispatcher,
    cli: &Cli,
) -> Result<()> {
    let handle = view
        .start(dispatcher, cli.channel.as_str(), state)
        .await
        .with_context(|| format!("Failed to start view '{}'", view.name()))?;

    let events = cli
        .clicks
        .iter()
        .map(|click| parse_click(&view, handle.message_id(), click))
        .collect::<Result<Vec<_>>>()?;

    let (sender, feed) = dispatcher.event_feed();
    let runner = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.run(feed).await }
    });
    for event in events {
        sender.send(event).await?;
    }
    drop(sender);
    runner.await.context("Dispatcher task panicked")?;
    Ok(())
}

fn parse_click<S: Send + 'static>(
    view: &ViewType<S>,
    message_id: &MessageId,
    click: &str,
) -> Result<InteractionEvent> {
    let (id, values) = match click.split_once('=') {
        Some((id, values)) => (id, Some(values)),
        None => (click, None),
    };
    let Some(component) = view.component(id) else {
        bail!("View '{}' has no component '{}'", view.name(), id);
    };

    match (component.kind(), values) {
        (ComponentKind::Button(_), None) => Ok(InteractionEvent::button(message_id.clone(), id)),
        (ComponentKind::Button(_), Some(_)) => bail!("Button '{}' takes no value", id),
        (ComponentKind::SelectMenu(_), Some(values)) => Ok(InteractionEvent::select(
            message_id.clone(),
            id,
            values.split(','),
        )),
        (ComponentKind::SelectMenu(_), None) => {
            bail!("Select menu '{}' needs a value: --click {}=VALUE", id, id)
        }
    }
}
