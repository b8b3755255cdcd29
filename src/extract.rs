//! Turns a fetched item page into a [`Listing`].
//!
//! The image, price and seller stars only disappear when the page did not
//! render the item layout at all, so their absence is an error; feedback
//! percentage, postage and returns are optional per listing and fall back
//! to empty values.

use scraper::{ElementRef, Html, Selector};

use crate::error::MonitorError;
use crate::types::{Listing, SaleFormat};

/// Parse a scraped price string into its numeric value.
///
/// Handles both decimal conventions: when the string contains a comma and a
/// dot, whichever comes last is the decimal separator and the other is
/// stripped as a thousands separator; a comma on its own is a decimal comma.
/// The value is the first contiguous run of digits and `.`, which may extend
/// to the end of the string (`"£4.20"`, `"9.99 Free Shipping"`).
pub fn parse_price(raw: &str) -> Result<f32, MonitorError> {
    let normalized = if raw.contains(',') {
        match (raw.rfind(','), raw.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => raw.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => raw.replace(',', ""),
            _ => raw.replace(',', "."),
        }
    } else {
        raw.to_string()
    };

    let parse_err = || MonitorError::Parse {
        what: "price",
        detail: raw.to_string(),
    };

    let start = normalized
        .find(|c: char| c.is_ascii_digit() || c == '.')
        .ok_or_else(parse_err)?;
    let run = &normalized[start..];
    let end = run
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(run.len());

    run[..end].parse::<f32>().map_err(|_| parse_err())
}

/// Extract a [`Listing`] from a parsed item page.
pub fn extract_listing(
    url: &str,
    currency: &str,
    doc: &Html,
) -> Result<Listing, MonitorError> {
    let image_sel = Selector::parse("img#icImg").unwrap();
    let image_url = doc
        .select(&image_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(MonitorError::MissingField("item image"))?
        .to_string();

    let stars_sel = Selector::parse("span.mbg-l").unwrap();
    let stars_el = doc
        .select(&stars_sel)
        .next()
        .ok_or(MonitorError::MissingField("seller stars"))?;
    let stars_text = stars_el
        .children()
        .filter_map(ElementRef::wrap)
        .next()
        .map(|first| first.text().collect::<String>())
        .unwrap_or_default();
    let seller_stars = stars_text
        .trim()
        .parse::<u32>()
        .map_err(|_| MonitorError::Parse {
            what: "seller stars",
            detail: stars_text.trim().to_string(),
        })?;

    let feedback_sel = Selector::parse("div#si-fb").unwrap();
    let feedback_text = first_text(doc, &feedback_sel);
    let seller_feedback_percentage = if feedback_text.is_empty() {
        None
    } else {
        let numeric = feedback_text.split('%').next().unwrap_or_default().trim();
        let pct = numeric.parse::<f32>().map_err(|_| MonitorError::Parse {
            what: "seller feedback percentage",
            detail: feedback_text.clone(),
        })?;
        Some(pct)
    };

    let price_sel = Selector::parse("span#prcIsum").unwrap();
    let price = parse_price(&first_text(doc, &price_sel))?;

    let bid_sel = Selector::parse("a#bidBtn_btn").unwrap();
    let format = if doc.select(&bid_sel).next().is_some() {
        SaleFormat::Auction
    } else {
        SaleFormat::BuyItNow
    };

    let title_sel = Selector::parse("h1#itemTitle").unwrap();
    let title = doc
        .select(&title_sel)
        .next()
        .map(visible_text)
        .unwrap_or_default();

    let offer_sel = Selector::parse("a#boBtn_btn").unwrap();
    let can_make_offer = doc.select(&offer_sel).next().is_some();

    let item_number_sel = Selector::parse("div#descItemNumber").unwrap();
    let seller_sel = Selector::parse("span.mbg-nw").unwrap();
    let location_sel = Selector::parse(r#"span[itemprop="availableAtOrFrom"]"#).unwrap();
    let condition_sel = Selector::parse("div#vi-itm-cond").unwrap();
    let postage_sel = Selector::parse("span#fshippingCost").unwrap();
    let returns_sel = Selector::parse("span#vi-ret-accrd-txt").unwrap();

    Ok(Listing {
        url: url.to_string(),
        image_url,
        ebay_item_number: first_text(doc, &item_number_sel),
        seller_name: first_text(doc, &seller_sel),
        seller_stars,
        seller_feedback_percentage,
        format,
        location: first_text(doc, &location_sel),
        title,
        condition: first_text(doc, &condition_sel),
        price,
        currency: currency.to_string(),
        postage: first_text(doc, &postage_sel),
        can_make_offer,
        returns: first_text(doc, &returns_sel),
    })
}

/// Trimmed text of the first match, or empty when the element is absent.
fn first_text(doc: &Html, selector: &Selector) -> String {
    doc.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Collected text of an element with hidden `span.g-hdn` annotation spans
/// skipped; those carry screen-reader prefixes like "Details about" that
/// must not leak into the title.
fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_visible(el, &mut out);
    out.trim().to_string()
}

fn collect_visible(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let value = child_el.value();
            if value.name() == "span" && value.classes().any(|class| class == "g-hdn") {
                continue;
            }
            collect_visible(child_el, out);
        }
    }
}
