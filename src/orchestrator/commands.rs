//! Commands sent from the orchestrator to surface inboxes.

use crate::types::Destination;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Drop the conversation history and empty the input box
    Clear,
    /// Replace the input box contents
    Prefill(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    /// Re-derive markers from a new travel intent
    SetIntent(String),
    /// AI search results override the catalog-derived markers
    SetSearchResults(Vec<Destination>),
    /// Restore the viewport saved before the detail view opened
    ReturnFromDetail,
    /// Back to the welcome state: no intent, no results
    Reset,
}

/// Receiving ends handed to whoever drives the surfaces.
#[derive(Debug)]
pub struct SurfaceInboxes {
    pub chat: UnboundedReceiver<ChatCommand>,
    pub map: UnboundedReceiver<MapCommand>,
}

#[derive(Debug, Clone)]
pub(crate) struct SurfaceOutboxes {
    chat: UnboundedSender<ChatCommand>,
    map: UnboundedSender<MapCommand>,
}

impl SurfaceOutboxes {
    pub(crate) fn channel() -> (Self, SurfaceInboxes) {
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let (map_tx, map_rx) = mpsc::unbounded_channel();
        (
            Self {
                chat: chat_tx,
                map: map_tx,
            },
            SurfaceInboxes {
                chat: chat_rx,
                map: map_rx,
            },
        )
    }

    /// A dropped inbox only means nobody renders that surface.
    pub(crate) fn chat(&self, command: ChatCommand) {
        if self.chat.send(command).is_err() {
            tracing::debug!("Chat inbox closed; command dropped");
        }
    }

    pub(crate) fn map(&self, command: MapCommand) {
        if self.map.send(command).is_err() {
            tracing::debug!("Map inbox closed; command dropped");
        }
    }
}
