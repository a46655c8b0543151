//! Button presses available to every user.

use tracing::debug;

use murmur_shared::link::RelayLink;
use murmur_shared::protocol::{CallbackAction, InboundEvent, Keyboard, OutboundAction};
use murmur_shared::RelayError;

use crate::engine::Relay;
use crate::replies;
use crate::transport::Transport;

impl<T: Transport> Relay<T> {
    pub(crate) async fn on_callback(
        &self,
        event: &InboundEvent,
        action: CallbackAction,
    ) -> Result<(), RelayError> {
        let actor = event.actor.id;
        match action {
            CallbackAction::GetLink => {
                let url = RelayLink::new(actor).to_url(&self.config.bot_username);
                self.reply(actor, replies::personal_link(&url), None).await;
            }
            CallbackAction::GetStats => {
                let text = self.read(|t| replies::personal_stats(t.user(actor))).await;
                self.reply(actor, text, None).await;
            }
            CallbackAction::CancelAnon => {
                self.cancel(actor).await?;
                self.send(OutboundAction::EditLastMessage {
                    to: actor,
                    text: replies::CANCELLED.to_string(),
                    keyboard: Some(Keyboard::Main),
                })
                .await;
            }
            CallbackAction::Unknown => debug!(user = %actor, "ignoring unknown callback"),
            admin => {
                if let Some(token) = self.gate.authorize(actor) {
                    self.on_admin_callback(token, admin, event.message_id).await;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_shared::UserId;
    use murmur_store::ConversationState;

    use crate::testing::{actor, relay};

    #[tokio::test]
    async fn get_link_renders_personal_link() {
        let (relay, _dir) = relay(None);
        relay
            .handle(InboundEvent::callback(actor(100), CallbackAction::GetLink))
            .await
            .unwrap();

        let sent = relay.transport().sent_to(UserId(100));
        assert_eq!(
            sent,
            vec![OutboundAction::SendText {
                to: UserId(100),
                text: "🔗 Your link: https://t.me/murmur_bot?start=100".to_string(),
                keyboard: None,
            }]
        );
    }

    #[tokio::test]
    async fn get_stats_reports_own_counters() {
        let (relay, _dir) = relay(None);
        relay
            .handle(InboundEvent::command(actor(100), "start", &["200"]))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::text(actor(100), "hi"))
            .await
            .unwrap();
        relay.transport().clear();

        relay
            .handle(InboundEvent::callback(actor(100), CallbackAction::GetStats))
            .await
            .unwrap();
        match relay.transport().sent_to(UserId(100)).as_slice() {
            [OutboundAction::SendText { text, .. }] => {
                assert!(text.contains("Sent: 1"));
                assert!(text.contains("Received: 0"));
            }
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_edits_prompt_and_clears_state() {
        let (relay, _dir) = relay(None);
        relay
            .handle(InboundEvent::command(actor(100), "start", &["200"]))
            .await
            .unwrap();
        relay.transport().clear();

        relay
            .handle(InboundEvent::callback(actor(100), CallbackAction::CancelAnon))
            .await
            .unwrap();

        let state = relay.read(|t| t.conversation(UserId(100))).await;
        assert_eq!(state, ConversationState::Idle);
        assert_eq!(
            relay.transport().sent(),
            vec![OutboundAction::EditLastMessage {
                to: UserId(100),
                text: replies::CANCELLED.to_string(),
                keyboard: Some(Keyboard::Main),
            }]
        );
    }

    #[tokio::test]
    async fn admin_callbacks_from_users_are_silent() {
        let (relay, _dir) = relay(Some(1));
        relay
            .handle(InboundEvent::callback(actor(100), CallbackAction::AdmAllUsers))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::callback(actor(100), CallbackAction::AdmFindUser))
            .await
            .unwrap();
        assert!(relay.transport().sent().is_empty());
    }
}
