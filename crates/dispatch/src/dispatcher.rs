//! The per-delivery dispatcher.
//!
//! A delivery moves through `Received → Verified → Decoded`, then each
//! contained action independently through `Enriching → Formatting →
//! Delivered`, then `Completed`. Only verification and decoding can fail the
//! delivery as a whole. Per-action failures are logged, counted in the
//! [`DispatchReport`], and never stop sibling actions.
//!
//! Nothing is retained between deliveries. A redelivered webhook is posted
//! again.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pipeline::{
    classify_action, decode, render_push, signature, Action, ChatClient, ChatDirectory,
    DeliveryError, DeliveryId, IngestError, NotificationMessage, ProviderConfig, ProviderHint,
    PushEvent, Reference, SignaturePolicy, StructuredEvent, TrackerDirectory, TrackerEvent,
    WebhookEnvelope,
};
use secrecy::ExposeSecret;
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

use crate::EnrichmentClient;

/// What happened to one action (or to a push, which is a single action).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A notification was accepted by the chat API.
    Delivered,
    /// The action does not produce a notification.
    Suppressed,
    /// Enrichment or delivery failed; the failure was logged.
    Failed,
}

/// Per-delivery summary returned to the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivery_id: DeliveryId,
    pub delivered: usize,
    pub suppressed: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn new(delivery_id: DeliveryId) -> Self {
        Self {
            delivery_id,
            delivered: 0,
            suppressed: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: ActionOutcome) {
        match outcome {
            ActionOutcome::Delivered => self.delivered += 1,
            ActionOutcome::Suppressed => self.suppressed += 1,
            ActionOutcome::Failed => self.failed += 1,
        }
    }
}

/// Checks the delivery's signature against the provider's secret and policy.
pub fn authenticate(
    provider: &ProviderConfig,
    envelope: &WebhookEnvelope,
) -> Result<(), IngestError> {
    let claimed = envelope.signature.as_deref().filter(|value| !value.is_empty());
    if claimed.is_none() && provider.signature_policy == SignaturePolicy::Required {
        return Err(IngestError::MissingSignature {
            header: provider.signature_header.to_string(),
        });
    }

    let secret = provider.secret.expose_secret().as_bytes();
    if signature::verify(secret, &envelope.body, claimed, provider.signature_format) {
        Ok(())
    } else {
        Err(IngestError::Unauthorized)
    }
}

/// Verifies, decodes, enriches, renders, and delivers webhook deliveries.
///
/// Holds only read-only collaborators; one instance serves all requests
/// concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    enrichment: EnrichmentClient,
    chat: Arc<dyn ChatClient>,
    timeout: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher. `timeout` bounds every lookup and every send.
    pub fn new(
        tracker: Arc<dyn TrackerDirectory>,
        directory: Arc<dyn ChatDirectory>,
        chat: Arc<dyn ChatClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            enrichment: EnrichmentClient::new(tracker, directory, timeout),
            chat,
            timeout,
        }
    }

    /// Processes one delivery for `provider`.
    ///
    /// Returns an error only when the delivery is rejected outright; per-action
    /// failures are reflected in the report.
    pub async fn dispatch(
        &self,
        provider: &ProviderConfig,
        envelope: &WebhookEnvelope,
    ) -> Result<DispatchReport, IngestError> {
        let delivery_id = DeliveryId::new_random();
        let span = info_span!("dispatch", %delivery_id, provider = %provider.kind);
        self.run(delivery_id, provider, envelope).instrument(span).await
    }

    async fn run(
        &self,
        delivery_id: DeliveryId,
        provider: &ProviderConfig,
        envelope: &WebhookEnvelope,
    ) -> Result<DispatchReport, IngestError> {
        authenticate(provider, envelope).inspect_err(|error| warn!(%error, "Rejected delivery"))?;
        debug!(stage = "verified", bytes = envelope.body.len(), "Signature accepted");

        let hint = ProviderHint {
            kind: provider.kind,
            event_type: envelope.event_type.as_deref(),
        };
        let event = decode(&envelope.body, hint).map_err(|error| {
            warn!(%error, "Rejected undecodable delivery");
            IngestError::from(error)
        })?;
        debug!(stage = "decoded", "Payload decoded");

        let mut report = DispatchReport::new(delivery_id);
        match event {
            StructuredEvent::Push(push) => report.record(self.dispatch_push(provider, &push).await),
            StructuredEvent::Tracker(event) => {
                for outcome in self.dispatch_tracker(provider, &event).await {
                    report.record(outcome);
                }
            }
            StructuredEvent::Ignored { .. } => {}
        }

        info!(
            stage = "completed",
            delivered = report.delivered,
            suppressed = report.suppressed,
            failed = report.failed,
            "Delivery processed"
        );
        Ok(report)
    }

    async fn dispatch_push(&self, provider: &ProviderConfig, push: &PushEvent) -> ActionOutcome {
        let Some(head) = push.head().filter(|_| !push.commits.is_empty()) else {
            debug!(git_ref = %push.git_ref, "Push without commits produces no notification");
            return ActionOutcome::Suppressed;
        };

        let actor = self
            .enrichment
            .resolve_actor(head.author_display_name().to_string(), provider.guild.as_ref())
            .await;

        // The bullet list is rendered in one pass so commits keep push order.
        match render_push(actor.as_user(), push) {
            Some(content) => self.deliver(provider, content).await,
            None => ActionOutcome::Suppressed,
        }
    }

    /// Processes all actions concurrently. Outcomes are returned in action
    /// order; the order in which messages reach the channel is unspecified.
    async fn dispatch_tracker(
        &self,
        provider: &ProviderConfig,
        event: &TrackerEvent,
    ) -> Vec<ActionOutcome> {
        let actions = event
            .actions
            .iter()
            .map(|action| self.process_action(provider, action, &event.references));
        join_all(actions).await
    }

    async fn process_action(
        &self,
        provider: &ProviderConfig,
        action: &Action,
        references: &[Reference],
    ) -> ActionOutcome {
        let action_id = action.id.as_ref().map(ToString::to_string).unwrap_or_default();
        let span = debug_span!(
            "action",
            action_id = %action_id,
            entity_type = %action.entity_type,
            kind = %action.kind
        );

        async {
            let Some(notice) = classify_action(action, references) else {
                debug!("Action produces no notification");
                return ActionOutcome::Suppressed;
            };

            let display_name = match self.enrichment.resolve_author_name(&action.author_id).await {
                Ok(name) => name,
                Err(error) => {
                    warn!(
                        %error,
                        author_id = %action.author_id,
                        "Author lookup failed; skipping action"
                    );
                    return ActionOutcome::Failed;
                }
            };

            let title = if notice.needs_item_title() {
                match self.enrichment.resolve_item_title(notice.app_url()).await {
                    Ok(title) => title,
                    Err(error) => {
                        warn!(
                            %error,
                            app_url = %notice.app_url(),
                            "Item lookup failed; skipping action"
                        );
                        return ActionOutcome::Failed;
                    }
                }
            } else {
                String::new()
            };

            let actor = self.enrichment.resolve_actor(display_name, provider.guild.as_ref()).await;
            self.deliver(provider, notice.render(actor.as_user(), &title)).await
        }
        .instrument(span)
        .await
    }

    async fn deliver(&self, provider: &ProviderConfig, content: String) -> ActionOutcome {
        let message = NotificationMessage {
            channel: provider.channel.clone(),
            content,
        };
        let send = self.chat.send_message(&message.channel, &message.content);
        let result = tokio::time::timeout(self.timeout, send)
            .await
            .unwrap_or(Err(DeliveryError::Timeout {
                after: self.timeout,
            }));

        match result {
            Ok(()) => {
                info!(channel = %message.channel, "Notification delivered");
                ActionOutcome::Delivered
            }
            Err(error) => {
                warn!(channel = %message.channel, %error, "Notification delivery failed");
                ActionOutcome::Failed
            }
        }
    }
}
