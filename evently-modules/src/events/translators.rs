use super::domain::TicketTypePriceChanged;
use super::integration_events::TicketTypePriceChangedIntegrationEvent;
use async_trait::async_trait;
use evently_application::context::AppContext;
use evently_application::error::AppError;
use evently_application::eventing::IntegrationEventTranslator;

pub struct TicketTypePriceChangedTranslator;

#[async_trait]
impl IntegrationEventTranslator<TicketTypePriceChanged> for TicketTypePriceChangedTranslator {
    type Output = TicketTypePriceChangedIntegrationEvent;

    fn translator_name(&self) -> &'static str {
        "events.ticket_type_price_changed_translator"
    }

    async fn translate(
        &self,
        _ctx: &AppContext,
        event: &TicketTypePriceChanged,
    ) -> Result<Option<Self::Output>, AppError> {
        Ok(Some(TicketTypePriceChangedIntegrationEvent::new(
            event.id,
            event.occurred_on_utc,
            event.ticket_type_id.into(),
            event.price.amount_minor(),
            event.price.currency().to_string(),
        )))
    }
}
