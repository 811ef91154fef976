//! Peer management
//!
//! [`PeerManager`] implements every panel operation on top of the roster
//! file and a [`WireGuardTool`]. Each operation loads the roster, scans it
//! by identifier, mutates and writes it back; a single async mutex keeps
//! concurrent requests from losing each other's writes.

mod views;

pub use views::{Bandwidth, ClientView, Stats};

use crate::config::Config;
use crate::error::{PanelError, Result};
use crate::roster::{
    expiry_from_days, next_address, validate_client_name, Client, RosterStore,
};
use crate::wireguard::{
    collect_telemetry, is_valid_key, render_client_config, TelemetryMap, WireGuardTool,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Parameters for a new client
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    /// Display name (required)
    pub name: String,
    /// Days until expiry; none or non-positive means never
    pub expiry_days: Option<i64>,
    /// Operator notes
    pub notes: Option<String>,
}

/// Changes to an existing client; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    /// Replace the notes
    pub notes: Option<String>,
    /// Reset the expiry: positive sets it that many days from now, anything
    /// else clears it
    pub expiry_days: Option<i64>,
}

/// A rendered client configuration ready for download
#[derive(Debug, Clone)]
pub struct ClientConfigFile {
    /// Client name, used as the file stem
    pub name: String,
    /// wg-quick configuration text
    pub contents: String,
}

impl ClientConfigFile {
    /// Download file name
    pub fn file_name(&self) -> String {
        format!("{}.conf", self.name)
    }
}

/// Manages client peers
pub struct PeerManager {
    config: Config,
    store: RosterStore,
    tool: Arc<dyn WireGuardTool>,
    lock: Mutex<()>,
}

impl PeerManager {
    /// Create a manager for the roster named in `config`
    pub fn new(config: Config, tool: Arc<dyn WireGuardTool>) -> Self {
        let store = RosterStore::new(config.clients_file());
        Self {
            config,
            store,
            tool,
            lock: Mutex::new(()),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying roster store
    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    /// Prepare the data directory and roster file
    pub async fn init(&self) -> Result<()> {
        self.store.init().await
    }

    /// All clients with telemetry
    ///
    /// Clients whose expiry has passed but are still enabled are disabled
    /// and removed from the interface as part of the read.
    pub async fn list(&self) -> Result<Vec<ClientView>> {
        let _guard = self.lock.lock().await;

        let mut clients = self.store.load().await?;
        let telemetry = collect_telemetry(self.tool.as_ref()).await;
        let now = Utc::now();

        let mut changed = false;
        for client in clients.iter_mut().filter(|c| c.enabled && c.is_expired(now)) {
            info!("Client {} ({}) expired, disabling", client.name, client.id);
            client.enabled = false;
            changed = true;

            if let Err(e) = self.tool.remove_peer(&client.public_key).await {
                warn!("Failed to remove expired peer {}: {}", client.name, e);
            }
        }

        if changed {
            self.store.save(&clients).await?;
        }

        Ok(into_views(clients, &telemetry, now))
    }

    /// All clients with telemetry, without expiry reconciliation
    ///
    /// Neither the roster nor the interface is touched, so this is safe to
    /// call from a metrics scrape.
    pub async fn snapshot(&self) -> Result<Vec<ClientView>> {
        let clients = self.store.load().await?;
        let telemetry = collect_telemetry(self.tool.as_ref()).await;
        Ok(into_views(clients, &telemetry, Utc::now()))
    }

    /// Create, persist and register a new client
    pub async fn create(&self, request: NewClient) -> Result<Client> {
        let name = validate_client_name(&request.name)?;
        let now = Utc::now();
        let expiry = match request.expiry_days {
            Some(days) => expiry_from_days(days, now)?,
            None => None,
        };
        let keys = self.tool.generate_keys().await?;

        let _guard = self.lock.lock().await;
        let mut clients = self.store.load().await?;
        let address = next_address(&self.config.wireguard.default_address, &clients)?;

        let client = Client::new(
            name,
            keys,
            address,
            expiry,
            request.notes.unwrap_or_default(),
            now,
        );

        clients.push(client.clone());
        self.store.save(&clients).await?;

        if let Err(e) = self.tool.add_peer(&client).await {
            error!("Failed to register client {}: {}", client.name, e);
            clients.retain(|c| c.id != client.id);
            if let Err(save_err) = self.store.save(&clients).await {
                error!("Failed to roll back client {}: {}", client.name, save_err);
            }
            return Err(e);
        }

        info!(
            "Created client {} ({}) at {}",
            client.name, client.id, client.address
        );
        Ok(client)
    }

    /// Change notes and/or expiry of a client
    pub async fn update(&self, id: &str, update: ClientUpdate) -> Result<Client> {
        let _guard = self.lock.lock().await;
        let mut clients = self.store.load().await?;
        let client = find_mut(&mut clients, id)?;

        if let Some(notes) = update.notes {
            client.notes = notes;
        }

        if let Some(days) = update.expiry_days {
            client.expiry_date = expiry_from_days(days, Utc::now())?;
        }

        let updated = client.clone();
        self.store.save(&clients).await?;

        debug!("Updated client {} ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// Remove a client from the interface and the roster
    ///
    /// For a disabled client the peer is already gone from the interface,
    /// so a failing removal is only logged.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut clients = self.store.load().await?;
        let index = clients
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| PanelError::NotFound(id.to_string()))?;

        let client = &clients[index];
        if let Err(e) = self.tool.remove_peer(&client.public_key).await {
            if client.enabled {
                return Err(e);
            }
            warn!("Ignoring peer removal failure for disabled client {}: {}", client.name, e);
        }

        let removed = clients.remove(index);
        self.store.save(&clients).await?;

        info!("Deleted client {} ({})", removed.name, removed.id);
        Ok(())
    }

    /// Flip a client between enabled and disabled; returns the new state
    ///
    /// Expired clients cannot be enabled. If the interface update fails the
    /// roster change is reverted.
    pub async fn toggle(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut clients = self.store.load().await?;
        let client = find_mut(&mut clients, id)?;

        if !client.enabled && client.is_expired(Utc::now()) {
            return Err(PanelError::InvalidState(
                "Cannot enable expired client".to_string(),
            ));
        }

        client.enabled = !client.enabled;
        let toggled = client.clone();
        self.store.save(&clients).await?;

        let applied = if toggled.enabled {
            self.tool.add_peer(&toggled).await
        } else {
            self.tool.remove_peer(&toggled.public_key).await
        };

        if let Err(e) = applied {
            error!("Failed to apply toggle for client {}: {}", toggled.name, e);
            if let Ok(client) = find_mut(&mut clients, id) {
                client.enabled = !toggled.enabled;
            }
            if let Err(save_err) = self.store.save(&clients).await {
                error!("Failed to revert client {}: {}", toggled.name, save_err);
            }
            return Err(e);
        }

        info!(
            "Client {} ({}) {}",
            toggled.name,
            toggled.id,
            if toggled.enabled { "enabled" } else { "disabled" }
        );
        Ok(toggled.enabled)
    }

    /// Render the wg-quick configuration for a client
    pub async fn client_config(&self, id: &str) -> Result<ClientConfigFile> {
        let clients = self.store.load().await?;
        let client = clients
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PanelError::NotFound(id.to_string()))?;

        let server_public_key = self.tool.server_public_key().await?;
        if !is_valid_key(&server_public_key) {
            warn!(
                "Interface {} reported no usable public key",
                self.config.wireguard.interface
            );
        }

        Ok(ClientConfigFile {
            name: client.name.clone(),
            contents: render_client_config(client, &server_public_key, &self.config.wireguard),
        })
    }

    /// Roster-wide totals
    pub async fn stats(&self) -> Result<Stats> {
        let clients = self.store.load().await?;
        let telemetry = collect_telemetry(self.tool.as_ref()).await;

        let (received, sent) = clients
            .iter()
            .filter_map(|c| telemetry.get(&c.public_key))
            .fold((0u64, 0u64), |(rx, tx), t| {
                (rx.saturating_add(t.received), tx.saturating_add(t.sent))
            });
        let active = clients.iter().filter(|c| c.enabled).count();

        Ok(Stats::new(clients.len(), active, received, sent))
    }
}

fn into_views(
    clients: Vec<Client>,
    telemetry: &TelemetryMap,
    now: DateTime<Utc>,
) -> Vec<ClientView> {
    clients
        .into_iter()
        .map(|client| {
            let peer = telemetry.get(&client.public_key).copied().unwrap_or_default();
            ClientView::new(client, peer, now)
        })
        .collect()
}

fn find_mut<'a>(clients: &'a mut [Client], id: &str) -> Result<&'a mut Client> {
    clients
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| PanelError::NotFound(id.to_string()))
}
