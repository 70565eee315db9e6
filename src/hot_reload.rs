use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use notify_debouncer_full::{
    new_debouncer, DebouncedEvent,
    notify::{RecursiveMode, Watcher, Error as NotifyError},
};
use tracing::{debug, error, info};

use crate::layout::load_layout;
use crate::state::{AppState, RefreshBroadcaster};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(tx): State<RefreshBroadcaster>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, tx))
}

async fn handle_socket(mut socket: WebSocket, tx: RefreshBroadcaster) {
    let mut rx = tx.subscribe();

    // Wait for a reload signal
    if rx.recv().await.is_ok() {
        if socket.send(Message::Text("reload".to_string().into())).await.is_err() {
            debug!("Client disconnected before reload message could be sent");
        }
    }
}

/// Content is read per request, so only the cached layout needs refreshing.
pub async fn reload_layout(app_state: &AppState) {
    match load_layout(&app_state.config.content_dir).await {
        Ok(layout) => {
            *app_state.layout_html.write().await = layout;
            info!("Layout reloaded.");
        }
        Err(e) => {
            error!("Failed to reload layout: {}", e);
        }
    }
}

// Editor droppings (Emacs lock files, `~` backups) are not content changes.
fn is_temp_file(name: &str) -> bool {
    name.starts_with(".#") || name.ends_with('~') || name.ends_with(".swp")
}

fn is_relevant(event: &DebouncedEvent) -> bool {
    let is_relevant_kind = event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove();
    if !is_relevant_kind {
        return false;
    }
    !event.event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_temp_file)
    })
}

pub fn start_content_watcher(tx: RefreshBroadcaster, app_state: Arc<AppState>) {
    info!("Starting content watcher for hot-reload...");
    tokio::spawn(async move {
        let (watcher_tx, mut watcher_rx) = tokio::sync::mpsc::channel(1);

        let debouncer = new_debouncer(Duration::from_millis(200), None, move |res: Result<Vec<DebouncedEvent>, Vec<NotifyError>>| {
            match res {
                Ok(events) => {
                    let relevant: Vec<&DebouncedEvent> = events.iter().filter(|e| is_relevant(e)).collect();
                    if !relevant.is_empty() {
                        debug!("Relevant file change detected: {:?}", relevant.iter().flat_map(|e| &e.event.paths).map(|p| p.display()).collect::<Vec<_>>());
                        if let Err(e) = watcher_tx.blocking_send(()) {
                            error!("Failed to send watcher event: {}", e);
                        }
                    }
                }
                Err(errors) => {
                    for e in errors {
                        error!("Watcher error: {}", e);
                    }
                }
            }
        });

        let mut debouncer = match debouncer {
            Ok(debouncer) => debouncer,
            Err(e) => {
                error!("Failed to create debouncer: {}", e);
                return;
            }
        };

        let content_dir = app_state.config.content_dir.clone();
        if let Err(e) = debouncer.watcher().watch(&content_dir, RecursiveMode::Recursive) {
            error!(dir = %content_dir.display(), "Failed to start watching content directory: {}", e);
            return;
        }

        // Keep the debouncer alive and wait for events
        while watcher_rx.recv().await.is_some() {
            info!("Content change detected, sending reload signal...");

            reload_layout(&app_state).await;

            // A send error only means no browser is connected.
            if tx.send(()).is_err() {
                debug!("No clients listening for reload");
            }
        }
    });
}
