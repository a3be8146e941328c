//! LiveTrack Viewer - terminal consumer for a live position share.
//!
//! Subscribes to a share identifier and renders the reconciled map state as
//! console output. The realtime backend client is out of scope here; fix
//! records arrive as newline-delimited JSON on stdin (a replay pipe or a
//! bridge process) and are published into the session's fix stream.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use livetrack_core::{ReconcilerConfig, ShareSession};
use livetrack_env::{subscription, FixPublisher, ShareId, TokioContext, ViewerContext};

use crate::console::ConsolePresenter;

mod console;

#[derive(Debug, Parser)]
#[command(name = "livetrack-viewer", about = "Follow a live position share in the terminal")]
struct Cli {
    /// Share URL (anything carrying an `id` query parameter) or a bare identifier
    target: Option<String>,

    /// Share identifier; takes precedence over the positional target
    #[arg(long)]
    id: Option<String>,

    /// Disable the trail overlay
    #[arg(long)]
    no_trail: bool,

    /// Zoom level for the one-shot autocenter
    #[arg(long, default_value_t = 16)]
    zoom: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let Some(share_id) = resolve_share_id(&cli)? else {
        // No identifier means no subscription - tell the user what to supply
        println!("No share identifier.");
        println!("Open with `livetrack-viewer '<url>?id=<shareId>'` or pass --id <shareId>.");
        return Ok(());
    };

    let (publisher, stream) = subscription(share_id, 64);
    let ctx = TokioContext::shared();
    ctx.spawn("stdin-pump", pump_stdin(publisher));

    let config = ReconcilerConfig {
        trail_enabled: !cli.no_trail,
        autocenter_zoom: cli.zoom,
        ..Default::default()
    };
    let presenter = ConsolePresenter::default();

    let mut session = ShareSession::new(ctx, stream, presenter, config);
    session.run().await;

    info!(session = %session.id(), "stream closed, session torn down");
    Ok(())
}

fn resolve_share_id(cli: &Cli) -> Result<Option<ShareId>> {
    if let Some(id) = &cli.id {
        return Ok(Some(ShareId::new(id.clone())?));
    }
    match &cli.target {
        Some(target) if target.contains('?') => Ok(Some(ShareId::from_share_url(target)?)),
        Some(target) => Ok(Some(ShareId::new(target.clone())?)),
        None => Ok(None),
    }
}

/// Publishes stdin lines into the subscription.
///
/// Each line is one delivery: a JSON object becomes a snapshot, a JSON
/// array becomes a points-history replay, and a literal `null` becomes an
/// empty snapshot (record not written yet). Unparseable lines are logged
/// and skipped. EOF drops the publisher, which closes the stream and ends
/// the session.
async fn pump_stdin(publisher: FixPublisher) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "stdin read failed, closing stream");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<Value>(&line) {
            Ok(Value::Null) => publisher.snapshot(None).await,
            Ok(Value::Array(points)) => publisher.history(points).await,
            Ok(value) => publisher.snapshot(Some(value)).await,
            Err(err) => {
                warn!(%err, "skipping unparseable input line");
                continue;
            }
        };

        if result.is_err() {
            // Session released the subscription; nothing left to feed
            break;
        }
    }
}
