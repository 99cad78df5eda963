//! # Client Registry
//!
//! Registered clients keyed by id. Exactly one registration per id.

use crate::domain::{ChannelDescriptor, ClientId, ConnectionEvent, ConnectionKind};
use crate::ports::ClientHandler;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A registered client.
#[derive(Clone)]
pub(crate) struct ClientEntry {
    pub(crate) channels: BTreeSet<ChannelDescriptor>,
    pub(crate) data: Value,
    pub(crate) handler: Arc<dyn ClientHandler>,
}

impl ClientEntry {
    pub(crate) fn listens_on(&self, channel_id: &str) -> bool {
        self.channels.iter().any(|c| c.channel_id == channel_id)
    }
}

/// A connection event bound to the handler that should receive it.
pub(crate) type ConnectionNotice = (Arc<dyn ClientHandler>, ConnectionEvent);

#[derive(Default)]
pub(crate) struct ClientRegistry {
    clients: HashMap<ClientId, ClientEntry>,
}

impl ClientRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a registration, returning the previous one.
    pub(crate) fn insert(&mut self, client_id: ClientId, entry: ClientEntry) -> Option<ClientEntry> {
        self.clients.insert(client_id, entry)
    }

    pub(crate) fn remove(&mut self, client_id: &str) -> Option<ClientEntry> {
        self.clients.remove(client_id)
    }

    pub(crate) fn get(&self, client_id: &str) -> Option<&ClientEntry> {
        self.clients.get(client_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    /// Every client listening on a channel.
    pub(crate) fn subscribers_of(&self, channel_id: &str) -> Vec<(ClientId, Arc<dyn ClientHandler>)> {
        self.clients
            .iter()
            .filter(|(_, entry)| entry.listens_on(channel_id))
            .map(|(id, entry)| (id.clone(), entry.handler.clone()))
            .collect()
    }

    /// Clients other than `excluding` listening on a channel.
    fn peers_on<'a>(
        &'a self,
        channel_id: &'a str,
        excluding: &'a str,
    ) -> impl Iterator<Item = (&'a ClientId, &'a ClientEntry)> + 'a {
        self.clients
            .iter()
            .filter(move |(id, entry)| id.as_str() != excluding && entry.listens_on(channel_id))
    }

    /// Connection events caused by `client_id` moving from `old_channels` to
    /// `new_channels`.
    ///
    /// Peers on joined channels learn about the client and the client learns
    /// about those peers. Peers on left channels learn that the client is gone.
    pub(crate) fn connection_notices(
        &self,
        client_id: &str,
        handler: Option<&Arc<dyn ClientHandler>>,
        data: &Value,
        old_channels: &BTreeSet<ChannelDescriptor>,
        new_channels: &BTreeSet<ChannelDescriptor>,
    ) -> Vec<ConnectionNotice> {
        let mut notices = Vec::new();

        for channel in new_channels.difference(old_channels) {
            for (peer_id, peer) in self.peers_on(&channel.channel_id, client_id) {
                notices.push((
                    peer.handler.clone(),
                    ConnectionEvent {
                        kind: ConnectionKind::Connected,
                        client_id: client_id.to_string(),
                        channel_id: channel.channel_id.clone(),
                        data: data.clone(),
                    },
                ));
                if let Some(handler) = handler {
                    notices.push((
                        handler.clone(),
                        ConnectionEvent {
                            kind: ConnectionKind::Connected,
                            client_id: peer_id.clone(),
                            channel_id: channel.channel_id.clone(),
                            data: peer.data.clone(),
                        },
                    ));
                }
            }
        }

        for channel in old_channels.difference(new_channels) {
            for (_, peer) in self.peers_on(&channel.channel_id, client_id) {
                notices.push((
                    peer.handler.clone(),
                    ConnectionEvent {
                        kind: ConnectionKind::Disconnected,
                        client_id: client_id.to_string(),
                        channel_id: channel.channel_id.clone(),
                        data: data.clone(),
                    },
                ));
            }
        }

        notices
    }
}
