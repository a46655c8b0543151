//! The relay engine: owns the store, the transport and the operator dialog,
//! and routes every inbound event to its handler.

use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use murmur_shared::protocol::{Actor, InboundEvent, Keyboard, OutboundAction};
use murmur_shared::{RelayError, UserId};
use murmur_store::{Store, Tables};

use crate::admin::{OperatorDialog, OperatorGate};
use crate::config::RelayConfig;
use crate::replies;
use crate::session::SessionLocks;
use crate::transport::{dispatch_bounded, Transport};

/// Central relay state.
///
/// The store sits behind a single mutex that every state change goes
/// through; transport calls are made without holding it.
pub struct Relay<T> {
    pub(crate) store: Mutex<Store>,
    pub(crate) transport: T,
    pub(crate) gate: OperatorGate,
    /// Exactly one operator, so exactly one dialog.
    pub(crate) dialog: Mutex<OperatorDialog>,
    pub(crate) config: RelayConfig,
    sessions: SessionLocks,
}

impl<T: Transport> Relay<T> {
    pub fn new(store: Store, transport: T, config: RelayConfig) -> Self {
        Self {
            store: Mutex::new(store),
            transport,
            gate: OperatorGate::new(config.operator),
            dialog: Mutex::new(OperatorDialog::Idle),
            config,
            sessions: SessionLocks::default(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a read-only query against the current tables.
    pub async fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let store = self.store.lock().await;
        f(store.tables())
    }

    /// Run a mutation as one persisted transaction.
    pub(crate) async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, RelayError>,
    ) -> Result<R, RelayError> {
        let mut store = self.store.lock().await;
        store.transact(f)
    }

    /// Process one inbound event to completion.
    ///
    /// Only persistence failures are returned; every other outcome is
    /// reported to the actor through the transport.
    pub async fn handle(&self, event: InboundEvent) -> Result<(), RelayError> {
        let actor = event.actor.id;
        let _session = self.sessions.acquire(actor).await;

        let result = self.route(&event).await;
        if let Err(err) = &result {
            error!(user = %actor, error = %err, "event handling failed");
            self.reply(actor, replies::for_error(err), None).await;
        }
        result
    }

    async fn route(&self, event: &InboundEvent) -> Result<(), RelayError> {
        self.touch(&event.actor).await?;

        if let Some(command) = &event.command {
            let arg = command.args.first().map(String::as_str);
            return match command.name.as_str() {
                "start" => self.on_start(&event.actor, arg).await,
                "admin" => {
                    self.open_admin_panel(event.actor.id).await;
                    Ok(())
                }
                other => {
                    debug!(command = other, "ignoring unknown command");
                    Ok(())
                }
            };
        }

        if let Some(action) = event.callback {
            return self.on_callback(event, action).await;
        }

        self.on_message(event).await
    }

    /// Register the actor, or refresh its handle. Banned actors are left as
    /// they are.
    async fn touch(&self, actor: &Actor) -> Result<(), RelayError> {
        if self.read(|t| t.is_banned(actor.id)).await {
            return Ok(());
        }
        self.mutate(|t| {
            t.register(actor.id, actor.handle.clone(), actor.display_name.clone());
            Ok(())
        })
        .await
    }

    /// Send an action, bounded by the delivery timeout. Failures are logged.
    pub(crate) async fn send(&self, action: OutboundAction) {
        let to = action.recipient();
        if let Err(e) = dispatch_bounded(&self.transport, action, self.config.delivery_timeout).await
        {
            warn!(user = %to, error = %e, "failed to send reply");
        }
    }

    pub(crate) async fn reply(&self, to: UserId, text: impl Into<String>, keyboard: Option<Keyboard>) {
        self.send(OutboundAction::SendText {
            to,
            text: text.into(),
            keyboard,
        })
        .await;
    }
}
