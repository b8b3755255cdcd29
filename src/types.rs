use serde::{Deserialize, Serialize};

/// Whether a listing is an auction or a fixed-price sale.
///
/// Derived from the presence of the bid control on the item page; anything
/// without one is treated as buy-it-now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaleFormat {
    Auction,
    BuyItNow,
}

/// Structured snapshot of one item page.
///
/// Built once per successful item fetch, handed straight to the notifier
/// and/or the drain buffer, never mutated or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub url: String,
    pub image_url: String,
    pub ebay_item_number: String,

    pub seller_name: String,
    pub seller_stars: u32,
    /// `None` when the page does not show a feedback percentage.
    pub seller_feedback_percentage: Option<f32>,

    pub format: SaleFormat,
    pub location: String,
    pub title: String,
    pub condition: String,
    pub price: f32,
    pub currency: String,
    pub postage: String,
    pub can_make_offer: bool,
    pub returns: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_format_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SaleFormat::BuyItNow).unwrap(),
            "\"buy-it-now\""
        );
        assert_eq!(
            serde_json::to_string(&SaleFormat::Auction).unwrap(),
            "\"auction\""
        );
    }

    #[test]
    fn listing_json_uses_camel_case_and_null_feedback() {
        let listing = Listing {
            url: "https://www.ebay.co.uk/itm/1".into(),
            image_url: "https://i.ebayimg.com/1.jpg".into(),
            ebay_item_number: "123".into(),
            seller_name: "shop".into(),
            seller_stars: 42,
            seller_feedback_percentage: None,
            format: SaleFormat::BuyItNow,
            location: "London".into(),
            title: "Widget".into(),
            condition: "Used".into(),
            price: 9.99,
            currency: "GBP".into(),
            postage: "Free".into(),
            can_make_offer: false,
            returns: "30 days".into(),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["imageUrl"], "https://i.ebayimg.com/1.jpg");
        assert_eq!(json["ebayItemNumber"], "123");
        assert_eq!(json["sellerFeedbackPercentage"], serde_json::Value::Null);
        assert_eq!(json["canMakeOffer"], false);
    }
}
