//! Link redemption, composing and anonymous delivery.

use tracing::{error, info, warn};

use murmur_shared::constants::ANONYMOUS_BANNER;
use murmur_shared::link::RelayLink;
use murmur_shared::protocol::{Actor, InboundEvent, Keyboard, OutboundAction};
use murmur_shared::{MediaRef, RelayError, UserId};
use murmur_store::MessageRecord;

use crate::engine::Relay;
use crate::replies;
use crate::transport::{dispatch_bounded, Transport};

/// Content of an anonymous message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Media(MediaRef),
}

impl Body {
    /// Text wins over media; events with neither carry no body.
    pub fn from_event(event: &InboundEvent) -> Option<Self> {
        if let Some(text) = &event.text {
            return Some(Self::Text(text.clone()));
        }
        event.media.clone().map(Self::Media)
    }

    /// The action delivered to `target`: banner prepended, no sender.
    fn anonymized_for(&self, target: UserId) -> OutboundAction {
        match self {
            Self::Text(text) => OutboundAction::SendText {
                to: target,
                text: format!("{ANONYMOUS_BANNER}{text}"),
                keyboard: None,
            },
            Self::Media(media) => {
                let caption = media.caption.as_deref().unwrap_or_default();
                OutboundAction::SendMedia {
                    to: target,
                    media: MediaRef {
                        caption: None,
                        ..media.clone()
                    },
                    caption: Some(format!("{ANONYMOUS_BANNER}{caption}")),
                }
            }
        }
    }

    fn audit_record(&self, sender: UserId, recipient: UserId) -> MessageRecord {
        match self {
            Self::Text(text) => MessageRecord::text(sender, recipient, text.clone()),
            Self::Media(_) => MessageRecord::media(sender, recipient),
        }
    }
}

/// What redeeming a link led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The requester is now composing a message to this identity.
    Composing(UserId),
    /// No usable link: show the default greeting.
    Greeting,
}

impl<T: Transport> Relay<T> {
    pub(crate) async fn on_start(&self, actor: &Actor, arg: Option<&str>) -> Result<(), RelayError> {
        match self.start_relay(actor.id, arg).await {
            Ok(StartOutcome::Composing(target)) => {
                self.reply(
                    actor.id,
                    replies::compose_prompt(target),
                    Some(Keyboard::CancelCompose),
                )
                .await;
            }
            Ok(StartOutcome::Greeting) => {
                self.reply(
                    actor.id,
                    replies::greeting(&actor.display_name),
                    Some(Keyboard::Main),
                )
                .await;
            }
            Err(err @ RelayError::Persistence(_)) => return Err(err),
            Err(err) => self.reply(actor.id, replies::for_error(&err), None).await,
        }
        Ok(())
    }

    /// Redeem a personal link carrying `arg`.
    ///
    /// Malformed arguments and links pointing at the requester fall through
    /// to the greeting.
    pub async fn start_relay(
        &self,
        requester: UserId,
        arg: Option<&str>,
    ) -> Result<StartOutcome, RelayError> {
        if self.read(|t| t.is_banned(requester)).await {
            return Err(RelayError::SenderBanned);
        }

        let Some(link) = arg.and_then(RelayLink::from_start_arg) else {
            return Ok(StartOutcome::Greeting);
        };
        let target = link.target;

        if self.read(|t| t.is_banned(target)).await {
            return Err(RelayError::RecipientBanned);
        }
        if target == requester {
            return Ok(StartOutcome::Greeting);
        }

        self.mutate(|t| t.begin(requester, target)).await?;
        info!(requester = %requester, "relay link redeemed");
        Ok(StartOutcome::Composing(target))
    }

    /// Forward `body` to the target of `owner`'s pending conversation.
    ///
    /// On success the record is appended, both counters move and the
    /// conversation is cleared in one transaction. On transport failure
    /// nothing changes and the owner may retry. Internal failures after a
    /// successful forward are reported as `DeliveryFailed` too.
    pub async fn deliver(&self, owner: UserId, body: Body) -> Result<MessageRecord, RelayError> {
        let target = self
            .read(|t| -> Result<UserId, RelayError> {
                if t.is_banned(owner) {
                    return Err(RelayError::SenderBanned);
                }
                let target = t.conversation(owner).target().ok_or_else(|| {
                    RelayError::Validation("no message is being composed".to_string())
                })?;
                if t.is_banned(target) {
                    return Err(RelayError::RecipientBanned);
                }
                Ok(target)
            })
            .await?;

        let forward = body.anonymized_for(target);
        if let Err(e) =
            dispatch_bounded(&self.transport, forward, self.config.delivery_timeout).await
        {
            warn!(sender = %owner, error = %e, "relay delivery failed");
            return Err(RelayError::DeliveryFailed(e.to_string()));
        }

        let record = body.audit_record(owner, target);
        let committed = record.clone();
        self.mutate(move |t| {
            t.append(committed);
            t.increment_sent(owner);
            t.increment_received(target);
            t.clear(owner);
            Ok(())
        })
        .await
        .map_err(|e| {
            error!(sender = %owner, error = %e, "message relayed but not recorded");
            RelayError::DeliveryFailed(e.to_string())
        })?;

        info!(sender = %owner, "message relayed");
        Ok(record)
    }

    /// Abandon composing. Returns `true` if something was pending.
    pub async fn cancel(&self, owner: UserId) -> Result<bool, RelayError> {
        self.mutate(|t| Ok(t.cancel(owner))).await
    }

    pub(crate) async fn on_message(&self, event: &InboundEvent) -> Result<(), RelayError> {
        let actor = event.actor.id;
        let operator = self.gate.authorize(actor);

        if let Some(token) = operator {
            if self.operator_input(token, event.text.as_deref()).await? {
                return Ok(());
            }
        }

        let composing = self.read(|t| t.conversation(actor).target().is_some()).await;
        if !composing {
            if operator.is_none() {
                self.reply(actor, replies::CHOOSE_ACTION, Some(Keyboard::Main))
                    .await;
            }
            return Ok(());
        }

        let Some(body) = Body::from_event(event) else {
            let err = RelayError::Validation("this kind of message cannot be relayed".to_string());
            self.reply(actor, replies::for_error(&err), None).await;
            return Ok(());
        };

        match self.deliver(actor, body).await {
            Ok(_) => {
                self.reply(actor, replies::DELIVERED, Some(Keyboard::Main))
                    .await
            }
            Err(err) => self.reply(actor, replies::for_error(&err), None).await,
        }
        Ok(())
    }
}
