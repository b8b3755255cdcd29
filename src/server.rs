//! Optional HTTP endpoint that exposes and drains the buffer of recently
//! discovered listings.

use std::sync::Arc;

use actix_web::{get, middleware, web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::types::Listing;

/// Listings buffer shared between the poll loop (writer) and the drain
/// endpoint (reader). Guarded by a lock; the drain swaps the whole vector
/// out so concurrently appended items are never lost.
pub type SharedListings = Arc<Mutex<Vec<Listing>>>;

/// Atomically take the buffer's current contents, leaving it empty.
pub async fn drain(buffer: &SharedListings) -> Vec<Listing> {
    let mut listings = buffer.lock().await;
    std::mem::take(&mut *listings)
}

#[get("/health")]
async fn health() -> impl Responder {
    web::Json(serde_json::json!({ "status": "ok" }))
}

#[get("/pull_listings")]
async fn pull_listings(buffer: web::Data<SharedListings>) -> impl Responder {
    let drained = drain(&buffer).await;
    HttpResponse::Ok().json(drained)
}

/// Bind the drain server and run it on the current runtime, alongside the
/// poll loop.
pub fn spawn(addr: &str, buffer: SharedListings) -> Result<()> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(buffer.clone()))
            .wrap(middleware::Logger::default())
            .service(health)
            .service(pull_listings)
    })
    .workers(1)
    .bind(addr)
    .with_context(|| format!("could not bind listings server on {addr}"))?
    .run();

    info!(addr, "listings server started");
    actix_web::rt::spawn(server);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleFormat;

    fn listing(url: &str) -> Listing {
        Listing {
            url: url.into(),
            image_url: "https://i.ebayimg.com/1.jpg".into(),
            ebay_item_number: "1".into(),
            seller_name: "shop".into(),
            seller_stars: 1,
            seller_feedback_percentage: None,
            format: SaleFormat::BuyItNow,
            location: "".into(),
            title: "Widget".into(),
            condition: "".into(),
            price: 1.0,
            currency: "GBP".into(),
            postage: "".into(),
            can_make_offer: false,
            returns: "".into(),
        }
    }

    #[tokio::test]
    async fn drain_returns_buffered_listings_exactly_once() {
        let buffer = SharedListings::default();
        buffer.lock().await.push(listing("https://www.ebay.co.uk/itm/1"));
        buffer.lock().await.push(listing("https://www.ebay.co.uk/itm/2"));

        let first = drain(&buffer).await;
        assert_eq!(first.len(), 2);

        let second = drain(&buffer).await;
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn items_pushed_after_a_drain_survive_for_the_next_one() {
        let buffer = SharedListings::default();
        buffer.lock().await.push(listing("https://www.ebay.co.uk/itm/1"));
        drain(&buffer).await;

        buffer.lock().await.push(listing("https://www.ebay.co.uk/itm/2"));
        let next = drain(&buffer).await;
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].url, "https://www.ebay.co.uk/itm/2");
    }
}
