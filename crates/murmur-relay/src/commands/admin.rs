//! Operator panel, moderation queries and the operator's input dialog.
//!
//! Everything here requires an [`OperatorToken`]; callers without one never
//! reach these handlers and receive no response.

use tracing::{debug, info};

use murmur_shared::protocol::{CallbackAction, Keyboard, OutboundAction};
use murmur_shared::{RelayError, UserId};

use crate::admin::{format_records, parse_pair, OperatorDialog, OperatorToken};
use crate::engine::Relay;
use crate::replies;
use crate::transport::Transport;

impl<T: Transport> Relay<T> {
    pub(crate) async fn open_admin_panel(&self, actor: UserId) {
        if let Some(token) = self.gate.authorize(actor) {
            self.reply(token.operator(), replies::ADMIN_PANEL, Some(Keyboard::Admin))
                .await;
        }
    }

    pub(crate) async fn on_admin_callback(
        &self,
        token: OperatorToken,
        action: CallbackAction,
        message_id: Option<i64>,
    ) {
        let to = token.operator();
        let edit = |text: String, keyboard: Keyboard| OutboundAction::EditLastMessage {
            to,
            text,
            keyboard: Some(keyboard),
        };

        let outbound = match action {
            CallbackAction::AdmBackToMain => {
                self.set_dialog(OperatorDialog::Idle).await;
                edit(replies::ADMIN_PANEL.to_string(), Keyboard::Admin)
            }
            CallbackAction::AdmClose => OutboundAction::DeleteMessage { to, message_id },
            CallbackAction::AdmAllUsers => {
                let text = self
                    .read(|t| {
                        let lines: Vec<String> = token
                            .list_users(t)
                            .iter()
                            .map(|u| format!("• {u}"))
                            .collect();
                        format!("👥 All users:\n\n{}", lines.join("\n"))
                    })
                    .await;
                edit(text, Keyboard::BackToAdmin)
            }
            CallbackAction::AdmLogsMain => {
                let text = self
                    .read(|t| format_records(t, &token.recent_logs(t), "Latest messages"))
                    .await;
                edit(text, Keyboard::BackToAdmin)
            }
            CallbackAction::AdmFindUser => {
                self.set_dialog(OperatorDialog::AwaitingUserId).await;
                edit(replies::ASK_USER_ID.to_string(), Keyboard::BackToAdmin)
            }
            CallbackAction::AdmFindPair => {
                self.set_dialog(OperatorDialog::AwaitingPairIds).await;
                edit(replies::ASK_PAIR_IDS.to_string(), Keyboard::BackToAdmin)
            }
            CallbackAction::AdmBanPanel => {
                self.set_dialog(OperatorDialog::AwaitingBanId).await;
                edit(replies::ASK_BAN_ID.to_string(), Keyboard::BackToAdmin)
            }
            CallbackAction::AdmGlobalStats => {
                let text = self
                    .read(|t| replies::global_stats(&token.global_stats(t)))
                    .await;
                edit(text, Keyboard::Admin)
            }
            CallbackAction::GetLink
            | CallbackAction::GetStats
            | CallbackAction::CancelAnon
            | CallbackAction::Unknown => return,
        };
        self.send(outbound).await;
    }

    async fn set_dialog(&self, step: OperatorDialog) {
        *self.dialog.lock().await = step;
    }

    /// Feed the operator's text into a pending dialog step.
    ///
    /// Non-text events leave the step pending. Any text consumes it, even
    /// when it does not parse. Returns `false` when there was no step or the
    /// input did not parse, in which case the message is handled like any
    /// other.
    pub(crate) async fn operator_input(
        &self,
        token: OperatorToken,
        text: Option<&str>,
    ) -> Result<bool, RelayError> {
        let Some(text) = text else {
            return Ok(false);
        };
        let step = std::mem::take(&mut *self.dialog.lock().await);

        let reply = match step {
            OperatorDialog::Idle => return Ok(false),
            OperatorDialog::AwaitingBanId => {
                let Ok(id) = text.parse::<UserId>() else {
                    debug!("ignoring malformed ban input");
                    return Ok(false);
                };
                let state = self.mutate(|t| Ok(token.toggle_ban(t, id))).await?;
                info!(user = %id, ?state, "operator toggled ban");
                replies::ban_transition(id, state)
            }
            OperatorDialog::AwaitingUserId => {
                let Ok(id) = text.parse::<UserId>() else {
                    debug!("ignoring malformed user lookup");
                    return Ok(false);
                };
                self.read(|t| {
                    format_records(t, &token.logs_for_identity(t, id), &format!("Logs {id}"))
                })
                .await
            }
            OperatorDialog::AwaitingPairIds => {
                let Some((a, b)) = parse_pair(text) else {
                    debug!("ignoring malformed pair lookup");
                    return Ok(false);
                };
                self.read(|t| {
                    format_records(t, &token.logs_for_pair(t, a, b), &format!("Dialog {a}-{b}"))
                })
                .await
            }
        };

        self.reply(token.operator(), reply, Some(Keyboard::BackToAdmin))
            .await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_shared::protocol::InboundEvent;
    use murmur_shared::{MediaKind, MediaRef};

    use crate::testing::{actor, relay, RecordingTransport};

    const OPERATOR: i64 = 1;

    fn last_text(transport: &RecordingTransport, to: i64) -> String {
        match transport.sent_to(UserId(to)).last() {
            Some(OutboundAction::SendText { text, .. })
            | Some(OutboundAction::EditLastMessage { text, .. }) => text.clone(),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    async fn dialog_of(relay: &Relay<RecordingTransport>) -> OperatorDialog {
        *relay.dialog.lock().await
    }

    #[tokio::test]
    async fn admin_command_is_operator_only() {
        let (relay, _dir) = relay(Some(OPERATOR));
        relay
            .handle(InboundEvent::command(actor(100), "admin", &[]))
            .await
            .unwrap();
        assert!(relay.transport().sent().is_empty());

        relay
            .handle(InboundEvent::command(actor(OPERATOR), "admin", &[]))
            .await
            .unwrap();
        assert_eq!(
            relay.transport().sent(),
            vec![OutboundAction::SendText {
                to: UserId(OPERATOR),
                text: replies::ADMIN_PANEL.to_string(),
                keyboard: Some(Keyboard::Admin),
            }]
        );
    }

    #[tokio::test]
    async fn ban_dialog_toggles_and_resets() {
        let (relay, _dir) = relay(Some(OPERATOR));
        let op = actor(OPERATOR);

        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmBanPanel))
            .await
            .unwrap();
        assert_eq!(dialog_of(&relay).await, OperatorDialog::AwaitingBanId);

        relay
            .handle(InboundEvent::text(op.clone(), "200"))
            .await
            .unwrap();
        assert!(relay.read(|t| t.is_banned(UserId(200))).await);
        assert_eq!(last_text(relay.transport(), OPERATOR), "🚫 200 banned.");
        assert_eq!(dialog_of(&relay).await, OperatorDialog::Idle);

        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmBanPanel))
            .await
            .unwrap();
        relay.handle(InboundEvent::text(op, "200")).await.unwrap();
        assert!(!relay.read(|t| t.is_banned(UserId(200))).await);
        assert_eq!(last_text(relay.transport(), OPERATOR), "✅ 200 unbanned.");
    }

    #[tokio::test]
    async fn malformed_dialog_input_is_dropped() {
        let (relay, _dir) = relay(Some(OPERATOR));
        let op = actor(OPERATOR);

        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmFindPair))
            .await
            .unwrap();
        relay.transport().clear();

        relay
            .handle(InboundEvent::text(op.clone(), "only-one"))
            .await
            .unwrap();
        assert_eq!(dialog_of(&relay).await, OperatorDialog::Idle);
        assert!(relay.transport().sent().is_empty());

        // The next input is no longer treated as a lookup.
        relay.handle(InboundEvent::text(op, "100 200")).await.unwrap();
        assert!(relay.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn media_does_not_consume_pending_step() {
        let (relay, _dir) = relay(Some(OPERATOR));
        let op = actor(OPERATOR);

        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmBanPanel))
            .await
            .unwrap();
        let photo = MediaRef {
            kind: MediaKind::Photo,
            file_id: "file-1".to_string(),
            caption: None,
        };
        relay
            .handle(InboundEvent::media(op.clone(), photo))
            .await
            .unwrap();
        assert_eq!(dialog_of(&relay).await, OperatorDialog::AwaitingBanId);

        relay.handle(InboundEvent::text(op, "200")).await.unwrap();
        assert!(relay.read(|t| t.is_banned(UserId(200))).await);
        assert_eq!(dialog_of(&relay).await, OperatorDialog::Idle);
    }

    #[tokio::test]
    async fn pair_lookup_is_direction_agnostic() {
        let (relay, _dir) = relay(Some(OPERATOR));
        relay
            .handle(InboundEvent::command(actor(100), "start", &["200"]))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::text(actor(100), "ping"))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::command(actor(200), "start", &["100"]))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::text(actor(200), "pong"))
            .await
            .unwrap();

        let op = actor(OPERATOR);
        let mut views = Vec::new();
        for input in ["100 200", "200 100"] {
            relay
                .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmFindPair))
                .await
                .unwrap();
            relay
                .handle(InboundEvent::text(op.clone(), input))
                .await
                .unwrap();
            views.push(last_text(relay.transport(), OPERATOR));
        }

        for view in &views {
            let ping = view.find("ping").expect("ping listed");
            let pong = view.find("pong").expect("pong listed");
            assert!(ping < pong);
        }
    }

    #[tokio::test]
    async fn back_to_main_resets_dialog() {
        let (relay, _dir) = relay(Some(OPERATOR));
        let op = actor(OPERATOR);
        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmFindUser))
            .await
            .unwrap();
        relay
            .handle(InboundEvent::callback(op, CallbackAction::AdmBackToMain))
            .await
            .unwrap();
        assert_eq!(dialog_of(&relay).await, OperatorDialog::Idle);
        assert_eq!(last_text(relay.transport(), OPERATOR), replies::ADMIN_PANEL);
    }

    #[tokio::test]
    async fn close_deletes_panel_message() {
        let (relay, _dir) = relay(Some(OPERATOR));
        let mut event = InboundEvent::callback(actor(OPERATOR), CallbackAction::AdmClose);
        event.message_id = Some(77);
        relay.handle(event).await.unwrap();
        assert_eq!(
            relay.transport().sent(),
            vec![OutboundAction::DeleteMessage {
                to: UserId(OPERATOR),
                message_id: Some(77),
            }]
        );
    }

    #[tokio::test]
    async fn user_list_and_stats() {
        let (relay, _dir) = relay(Some(OPERATOR));
        relay
            .handle(InboundEvent::command(actor(100), "start", &[]))
            .await
            .unwrap();

        let op = actor(OPERATOR);
        relay
            .handle(InboundEvent::callback(op.clone(), CallbackAction::AdmAllUsers))
            .await
            .unwrap();
        let list = last_text(relay.transport(), OPERATOR);
        assert!(list.contains("• 1 (@user1)"));
        assert!(list.contains("• 100 (@user100)"));

        relay
            .handle(InboundEvent::callback(op, CallbackAction::AdmGlobalStats))
            .await
            .unwrap();
        let stats = last_text(relay.transport(), OPERATOR);
        assert!(stats.contains("Users: 2"));
        assert!(stats.contains("Messages: 0"));
    }
}
