use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tera::Tera;
use tracing::warn;

use crate::config::TelegramConfig;
use crate::types::Listing;

const MESSAGE_TEMPLATE: &str = "message";

/// Delivery seam for new-listing notifications. Delivery is best-effort:
/// callers log failures and never roll back tracker state over them.
#[async_trait(?Send)]
pub trait Notifier {
    async fn notify(&self, listing: &Listing) -> Result<()>;
}

/// Renders the configured message template and posts it to a Telegram chat.
pub struct TelegramNotifier {
    http: reqwest::Client,
    token: String,
    chat_id: String,
    templates: Tera,
}

impl TelegramNotifier {
    /// A malformed template is a configuration error, so it fails here at
    /// startup rather than on the first notification.
    pub fn new(message_template: &str, telegram: &TelegramConfig) -> Result<Self> {
        let mut templates = Tera::default();
        templates
            .add_raw_template(MESSAGE_TEMPLATE, message_template)
            .context("could not parse message template")?;

        Ok(Self {
            http: reqwest::Client::new(),
            token: telegram.token.clone(),
            chat_id: telegram.chat_id.clone(),
            templates,
        })
    }

    /// Render the message for a listing, falling back to the bare URL when
    /// the template fails against this listing's fields.
    fn render(&self, listing: &Listing) -> String {
        let rendered = tera::Context::from_serialize(listing)
            .and_then(|ctx| self.templates.render(MESSAGE_TEMPLATE, &ctx));
        match rendered {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, url = %listing.url, "could not render message template, sending bare url");
                listing.url.clone()
            }
        }
    }
}

#[async_trait(?Send)]
impl Notifier for TelegramNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        let text = self.render(listing);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let resp = self
            .http
            .post(format!(
                "https://api.telegram.org/bot{}/sendMessage",
                self.token
            ))
            .json(&body)
            .send()
            .await
            .context("could not reach telegram")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("telegram responded with status {status}: {body}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleFormat;

    fn telegram() -> TelegramConfig {
        TelegramConfig {
            token: "123:abc".into(),
            chat_id: "42".into(),
        }
    }

    fn listing() -> Listing {
        Listing {
            url: "https://www.ebay.co.uk/itm/1".into(),
            image_url: "https://i.ebayimg.com/1.jpg".into(),
            ebay_item_number: "1".into(),
            seller_name: "shop".into(),
            seller_stars: 10,
            seller_feedback_percentage: Some(99.1),
            format: SaleFormat::BuyItNow,
            location: "Berlin".into(),
            title: "Walkman".into(),
            condition: "Used".into(),
            price: 12.5,
            currency: "EUR".into(),
            postage: "".into(),
            can_make_offer: false,
            returns: "".into(),
        }
    }

    #[test]
    fn renders_listing_fields() {
        let notifier =
            TelegramNotifier::new("{{ title }} for {{ price }} {{ currency }}\n{{ url }}", &telegram())
                .unwrap();
        assert_eq!(
            notifier.render(&listing()),
            "Walkman for 12.5 EUR\nhttps://www.ebay.co.uk/itm/1"
        );
    }

    #[test]
    fn render_failure_falls_back_to_url() {
        // valid template, but the variable does not exist on Listing
        let notifier = TelegramNotifier::new("{{ nonexistent_field }}", &telegram()).unwrap();
        assert_eq!(notifier.render(&listing()), "https://www.ebay.co.uk/itm/1");
    }

    #[test]
    fn malformed_template_fails_construction() {
        assert!(TelegramNotifier::new("{{ title", &telegram()).is_err());
    }
}
