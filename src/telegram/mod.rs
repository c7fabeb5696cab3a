pub mod auth;
pub mod commands;
pub mod handlers;

pub use auth::AuthorizedUsers;
pub use commands::Command;
pub use handlers::handle_command;

use teloxide::prelude::*;
use tracing::error;

/// Push channel for operator notifications (automatic trades, order
/// failures). Without a configured admin chat every send is a no-op.
#[derive(Clone)]
pub struct Notifier {
    bot: Bot,
    admin_chat: Option<ChatId>,
}

impl Notifier {
    pub fn new(bot: Bot, admin_chat: Option<i64>) -> Self {
        Self {
            bot,
            admin_chat: admin_chat.map(ChatId),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            bot: Bot::new("0:disabled"),
            admin_chat: None,
        }
    }

    pub async fn send(&self, text: impl Into<String>) {
        let Some(chat_id) = self.admin_chat else {
            return;
        };
        if let Err(err) = self.bot.send_message(chat_id, text.into()).await {
            error!("Failed to send notification: {err}");
        }
    }
}
