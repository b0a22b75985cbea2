//! Native runner: drives a [`Dashboard`] from a [`WsClient`] on tokio.

use std::future::Future;

use tokio::sync::mpsc;

use super::Dashboard;
use crate::domain::asset::FlashTicket;
use crate::error::DashboardError;
use crate::ws::native::WsClient;
use crate::ws::WsEvent;

/// Connect `client` and feed its events into `dashboard` until `shutdown`
/// resolves or the event stream ends.
///
/// `on_render` is called once up front, after every event that changes what
/// is shown, and after every flash expiry that settled at least one record.
/// Flash tickets are expired from the same loop, so the dashboard is never
/// touched concurrently.
pub async fn run<F, S>(
    dashboard: &mut Dashboard,
    client: &mut WsClient,
    mut on_render: F,
    shutdown: S,
) -> Result<(), DashboardError>
where
    F: FnMut(&Dashboard),
    S: Future<Output = ()>,
{
    client.connect().await?;

    let flash_duration = dashboard.config().flash_duration;
    let (flash_tx, mut flash_rx) = mpsc::unbounded_channel::<FlashTicket>();
    tokio::pin!(shutdown);

    on_render(dashboard);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            }

            event = client.next_event() => {
                let Some(event) = event else {
                    tracing::info!("Event stream ended");
                    break;
                };
                let dropped = matches!(event, WsEvent::Error(_));

                if let Some(ticket) = dashboard.handle_event(event) {
                    let tx = flash_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(flash_duration).await;
                        let _ = tx.send(ticket);
                    });
                }
                if !dropped {
                    on_render(dashboard);
                }
            }

            Some(ticket) = flash_rx.recv() => {
                if dashboard.expire_flash(&ticket) > 0 {
                    on_render(dashboard);
                }
            }
        }
    }

    client.disconnect().await?;
    Ok(())
}
