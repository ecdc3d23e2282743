use std::sync::Arc;

use chrono::Utc;
use meteobot_weather::{FetchPipeline, OpenWeatherProvider};
use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::commands::{Action, Command};
use crate::presentation;

pub type SharedPipeline = Arc<FetchPipeline<OpenWeatherProvider>>;

/// Dispatcher endpoint for every parsed command
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    pipeline: SharedPipeline,
) -> ResponseResult<()> {
    tracing::info!(chat = msg.chat.id.0, command = ?cmd, "Received command");

    match cmd.action() {
        Action::Welcome => {
            let text = presentation::welcome_message(sender_first_name(&msg));
            bot.send_message(msg.chat.id, text).await?;
        }
        Action::Stats => {
            let now = Utc::now();
            let text = presentation::stats_message(
                &pipeline.quota().snapshot_at(now),
                pipeline.settings().cache_ttl,
                now,
            );
            bot.send_message(msg.chat.id, text).await?;
        }
        Action::Weather {
            city_key,
            force_refresh,
        } => send_weather(&bot, msg.chat.id, &pipeline, city_key, force_refresh).await?,
    }

    Ok(())
}

/// The sending user's first name; group chats have none of their own
fn sender_first_name(msg: &Message) -> Option<&str> {
    msg.from.as_ref().map(|user| user.first_name.as_str())
}

async fn send_weather(
    bot: &Bot,
    chat_id: ChatId,
    pipeline: &SharedPipeline,
    city_key: &str,
    force_refresh: bool,
) -> ResponseResult<()> {
    bot.send_message(chat_id, presentation::FETCHING).await?;

    let text = match pipeline.fetch(city_key, force_refresh).await {
        Ok(entry) => presentation::weather_message(&entry),
        Err(e) => presentation::fetch_error_message(&e),
    };

    bot.send_message(chat_id, text).await?;
    Ok(())
}
