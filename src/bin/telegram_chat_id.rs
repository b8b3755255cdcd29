//! One-shot helper: call Telegram `getUpdates` with the bot token and print
//! the chat ids of whoever has messaged the bot, so the operator can fill
//! `TELEGRAM_CHAT_ID` in `.env`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    from: Option<Sender>,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Sender {
    #[serde(default)]
    username: String,
    #[serde(default)]
    first_name: String,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let token =
        std::env::var("TELEGRAM_TOKEN").context("TELEGRAM_TOKEN not set (put it in .env)")?;

    let resp = reqwest::get(format!("https://api.telegram.org/bot{token}/getUpdates"))
        .await
        .context("could not reach telegram")?;
    if !resp.status().is_success() {
        bail!("telegram responded with status {}", resp.status());
    }

    let updates: GetUpdatesResponse = resp
        .json()
        .await
        .context("could not decode getUpdates response")?;
    if !updates.ok {
        bail!("telegram getUpdates returned ok=false");
    }
    if updates.result.is_empty() {
        println!("No updates yet. Send your bot a message, then run this again.");
        return Ok(());
    }

    for update in updates.result {
        let Some(message) = update.message else {
            continue;
        };
        let sender = message
            .from
            .map(|from| {
                if from.username.is_empty() {
                    from.first_name
                } else {
                    from.username
                }
            })
            .unwrap_or_default();
        println!("from {sender}");
        println!("  TELEGRAM_CHAT_ID={}", message.chat.id);
    }

    Ok(())
}
