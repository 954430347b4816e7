//! JSON-lines transport over stdin/stdout.
//!
//! Each stdin line is one [`Op`]. Every op is answered with one
//! [`OpResult`] line; tenant events are interleaved as
//! `{"type":"event","payload":<TenantEvent>}` lines. Malformed input is
//! answered with `{"type":"error","payload":{"message":...}}` and the loop
//! keeps going. The loop ends on `shutdown` or end of input.

use ah_core::AgentHost;
use ah_protocol::event_models::TenantEvent;
use ah_protocol::ipc::{Op, OpResult};
use color_eyre::eyre::{Result, WrapErr};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

pub async fn serve(host: AgentHost) -> Result<()> {
    let (lines, mut outgoing) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = outgoing.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let (stop, stopped) = oneshot::channel();
    let relay = tokio::spawn(relay_events(host.subscribe(), lines.clone(), stopped));

    info!("Serving operations on stdin");
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut shut_down = false;

    while let Some(line) = input.next_line().await.wrap_err("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let op: Op = match serde_json::from_str(&line) {
            Ok(op) => op,
            Err(e) => {
                warn!(error = %e, "Rejected malformed operation");
                send(&lines, json!({ "type": "error", "payload": { "message": e.to_string() } }));
                continue;
            }
        };

        let is_shutdown = matches!(op, Op::Shutdown);
        let result = host.handle(op).await;
        send_result(&lines, &result);

        if is_shutdown {
            shut_down = true;
            break;
        }
    }

    if !shut_down {
        debug!("End of input, shutting down agents");
        host.manager().shutdown_all_agents().await;
    }

    let _ = stop.send(());
    relay.await.wrap_err("Event relay task failed")?;
    drop(lines);
    writer
        .await
        .wrap_err("Output task failed")?
        .wrap_err("Failed to write stdout")?;

    info!("Transport closed");
    Ok(())
}

async fn relay_events(
    mut events: broadcast::Receiver<TenantEvent>,
    lines: mpsc::UnboundedSender<String>,
    mut stopped: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => send_event(&lines, &event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event relay lagged by {n} events");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
            _ = &mut stopped => break,
        }
    }

    // Flush whatever was published before the stop signal.
    while let Ok(event) = events.try_recv() {
        send_event(&lines, &event);
    }
}

fn send_result(lines: &mpsc::UnboundedSender<String>, result: &OpResult) {
    match serde_json::to_value(result) {
        Ok(value) => send(lines, value),
        Err(e) => warn!(error = %e, "Failed to serialize operation result"),
    }
}

fn send_event(lines: &mpsc::UnboundedSender<String>, event: &TenantEvent) {
    send(lines, json!({ "type": "event", "payload": event }));
}

fn send(lines: &mpsc::UnboundedSender<String>, value: serde_json::Value) {
    if lines.send(value.to_string()).is_err() {
        debug!("Output closed, dropping line");
    }
}
