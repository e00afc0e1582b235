//! `subscribe`: follow one event category until Ctrl-C

use crate::output::Outputter;
use anyhow::{bail, Result};
use are_rest_core::ClientConfig;
use are_rest_http::AreClient;
use clap::Args;
use serde::Serialize;
use uuid::Uuid;

#[derive(Args)]
pub struct SubscribeArgs {
    /// Event category: model_changed, model_state_changed,
    /// event_channel_transmission, data_channel_transmission, property_changed
    pub category: String,

    /// Channel id, required for data_channel_transmission
    #[arg(long)]
    pub channel: Option<String>,

    /// Exit after this many items instead of waiting for Ctrl-C
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Serialize)]
struct ItemOutput<'a> {
    session_id: Uuid,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

pub async fn execute(args: SubscribeArgs, config: ClientConfig, out: &Outputter) -> Result<()> {
    let client = AreClient::new(config)?;
    let mut subscription = client.subscribe_named(&args.category, args.channel.as_deref())?;
    let category = subscription.category();
    let session_id = subscription.session_id();
    tracing::info!(category = %category, session_id = %session_id, "Listening for events");

    let mut received = 0usize;
    let result = loop {
        if args.count.is_some_and(|limit| received >= limit) {
            break Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break Ok(());
            }
            item = subscription.next_item() => {
                received += 1;
                match item {
                    Some(Ok(event)) => out.emit(
                        &event.payload,
                        &ItemOutput {
                            session_id,
                            status: event.status,
                            payload: Some(&event.payload),
                            error: None,
                        },
                    )?,
                    Some(Err(err)) => out.emit(
                        &format!("error {} {}", err.status, err.reason()),
                        &ItemOutput {
                            session_id,
                            status: err.status,
                            payload: None,
                            error: Some(err.reason()),
                        },
                    )?,
                    None => break Err(()),
                }
            }
        }
    };

    client.unsubscribe(category);
    if result.is_err() {
        bail!("event stream for {} closed", category);
    }
    Ok(())
}
