//! Chat-bot update handling.
//!
//! Each webhook update maps to at most one store call and one reply. The
//! handler is synchronous; the webhook route owns the async plumbing.

pub mod types;

use escrowflow_core::EscrowStore;
use serde::Deserialize;

use crate::amount::AmountInput;
use types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, SendMessage, Update,
    WebAppData,
};

pub const GENERIC_ERROR_TEXT: &str = "❌ Error processing your request. Please try again.";

const HELP_TEXT: &str = "🔒 *Escrowflow Help*

*Commands:*
/start - Open the Escrowflow web app
/help - Show this message
/support - How to reach us

*How it works:*
1. Tap \"Open Escrowflow\" to launch the web app
2. Create an escrow with the amount you want held
3. Share the transaction ID with your counterparty";

const SUPPORT_TEXT: &str = "🆘 *Escrowflow Support*

Reply in this chat or use the support link inside the web app. \
Include your transaction ID so we can find your escrow quickly.";

#[derive(Debug, Deserialize)]
struct WebAppAction {
    action: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CreateEscrowData {
    amount: AmountInput,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    counterparty: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BotHandler {
    escrows: EscrowStore,
    webapp_url: String,
}

impl BotHandler {
    pub fn new(escrows: EscrowStore, webapp_url: impl Into<String>) -> Self {
        Self {
            escrows,
            webapp_url: webapp_url.into(),
        }
    }

    pub fn handle(&self, update: &Update) -> Option<SendMessage> {
        if let Some(query) = &update.callback_query {
            return self.on_callback(query);
        }

        let message = update.message.as_ref()?;
        if let Some(data) = &message.web_app_data {
            return Some(self.on_web_app_data(message, data));
        }

        let text = message.text.as_deref()?;
        match command(text) {
            // Plain text gets the welcome as well
            None | Some("start") => Some(self.welcome(message)),
            Some("help") => Some(SendMessage::markdown(message.chat.id, HELP_TEXT)),
            Some("support") => Some(SendMessage::markdown(message.chat.id, SUPPORT_TEXT)),
            Some(other) => {
                tracing::debug!(update_id = update.update_id, command = other, "ignoring command");
                None
            }
        }
    }

    fn welcome(&self, message: &Message) -> SendMessage {
        let name = message
            .from
            .as_ref()
            .map(|u| u.first_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("there");
        let text = format!(
            "🔒 *Welcome to Escrowflow!*\n\nHello {}! 👋\n\n\
             Escrowflow holds funds in escrow until both sides are done. \
             Tap the button below to open the app and create your first escrow.",
            escape_markdown(name)
        );
        SendMessage::markdown(message.chat.id, text).with_keyboard(InlineKeyboardMarkup {
            inline_keyboard: vec![
                vec![InlineKeyboardButton::web_app(
                    "🔒 Open Escrowflow",
                    self.webapp_url.clone(),
                )],
                vec![InlineKeyboardButton::callback("ℹ️ Help", "help")],
            ],
        })
    }

    fn on_callback(&self, query: &CallbackQuery) -> Option<SendMessage> {
        let chat_id = query
            .message
            .as_ref()
            .map_or(query.from.id, |m| m.chat.id);
        match query.data.as_deref() {
            Some("help") => Some(SendMessage::markdown(chat_id, HELP_TEXT)),
            Some("support") => Some(SendMessage::markdown(chat_id, SUPPORT_TEXT)),
            other => {
                tracing::debug!(callback_id = %query.id, data = ?other, "ignoring callback");
                None
            }
        }
    }

    fn on_web_app_data(&self, message: &Message, data: &WebAppData) -> SendMessage {
        match self.create_from_web_app(message, data) {
            Ok(text) => SendMessage::markdown(message.chat.id, text),
            Err(reason) => {
                tracing::warn!(
                    target: "escrowflow::bot",
                    chat_id = message.chat.id,
                    %reason,
                    "web app data rejected"
                );
                SendMessage::plain(message.chat.id, GENERIC_ERROR_TEXT)
            }
        }
    }

    fn create_from_web_app(&self, message: &Message, data: &WebAppData) -> Result<String, String> {
        let from = message.from.as_ref().ok_or("message has no sender")?;
        let action: WebAppAction =
            serde_json::from_str(&data.data).map_err(|e| format!("invalid json: {e}"))?;
        if action.action != "create_escrow" {
            return Err(format!("unknown action '{}'", action.action));
        }
        let details: CreateEscrowData =
            serde_json::from_value(action.data).map_err(|e| format!("invalid data: {e}"))?;
        let amount = details
            .amount
            .to_f64()
            .ok_or_else(|| format!("amount is not a number: {:?}", details.amount))?;

        let escrow_id = self
            .escrows
            .create(&from.id.to_string(), amount)
            .map_err(|e| e.to_string())?;

        let field = |v: &Option<String>, fallback: &str| {
            escape_markdown(v.as_deref().filter(|s| !s.is_empty()).unwrap_or(fallback))
        };
        Ok(format!(
            "🔒 *Escrow Created Successfully!*\n\n\
             *Transaction Details:*\n\
             • Title: {}\n\
             • Amount: {} {}\n\
             • Counterparty: {}\n\
             • Description: {}\n\
             • Creator: {} ({})\n\n\
             *Next Steps:*\n\
             1. Share this escrow with your counterparty\n\
             2. Wait for them to accept the terms\n\n\
             *Transaction ID:* `{}`",
            field(&details.title, "Untitled"),
            amount,
            field(&details.currency, ""),
            field(&details.counterparty, "Not set"),
            field(&details.description, "No description"),
            escape_markdown(&from.first_name),
            from.id,
            escrow_id,
        ))
    }
}

/// Command name of a `/command@bot args` message.
fn command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let cmd = first.strip_prefix('/')?;
    Some(cmd.split_once('@').map_or(cmd, |(c, _)| c))
}

/// Escape the characters legacy Markdown treats as markup.
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use escrowflow_core::EscrowStatus;
    use serde_json::json;

    const URL: &str = "https://t.me/Escrowflow_bot/Escrowflow";

    fn handler() -> (BotHandler, EscrowStore) {
        let store = EscrowStore::new();
        (BotHandler::new(store.clone(), URL), store)
    }

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn text_update(text: &str) -> Update {
        update(json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": { "id": 77, "first_name": "Sam_" },
                "chat": { "id": 77 },
                "text": text
            }
        }))
    }

    fn web_app_update(data: &str) -> Update {
        update(json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": { "id": 77, "first_name": "Sam" },
                "chat": { "id": 770 },
                "web_app_data": { "data": data, "button_text": "Open" }
            }
        }))
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(command("/start"), Some("start"));
        assert_eq!(command("/help@Escrowflow_bot"), Some("help"));
        assert_eq!(command("/start ref123"), Some("start"));
        assert_eq!(command("hello"), None);
        assert_eq!(command("   "), None);
    }

    #[test]
    fn test_start_sends_web_app_button() {
        let (bot, _) = handler();
        let reply = bot.handle(&text_update("/start")).unwrap();
        assert_eq!(reply.chat_id, 77);
        assert!(reply.text.contains("Hello Sam\\_!"));

        let markup = reply.reply_markup.unwrap();
        assert_eq!(
            markup.inline_keyboard[0][0].web_app.as_ref().unwrap().url,
            URL
        );
        assert_eq!(markup.inline_keyboard[1][0].callback_data.as_deref(), Some("help"));
    }

    #[test]
    fn test_plain_text_gets_welcome() {
        let (bot, _) = handler();
        let reply = bot.handle(&text_update("hi there")).unwrap();
        assert!(reply.reply_markup.is_some());
    }

    #[test]
    fn test_help_support_and_unknown() {
        let (bot, _) = handler();
        assert_eq!(bot.handle(&text_update("/help")).unwrap().text, HELP_TEXT);
        assert_eq!(bot.handle(&text_update("/support")).unwrap().text, SUPPORT_TEXT);
        assert!(bot.handle(&text_update("/dispute")).is_none());
    }

    #[test]
    fn test_callback_query() {
        let (bot, _) = handler();
        let reply = bot
            .handle(&update(json!({
                "update_id": 3,
                "callback_query": {
                    "id": "cb1",
                    "from": { "id": 5, "first_name": "A" },
                    "message": { "message_id": 1, "chat": { "id": 500 } },
                    "data": "help"
                }
            })))
            .unwrap();
        assert_eq!(reply.chat_id, 500);
        assert_eq!(reply.text, HELP_TEXT);

        let none = bot.handle(&update(json!({
            "update_id": 4,
            "callback_query": { "id": "cb2", "from": { "id": 5 }, "data": "other" }
        })));
        assert!(none.is_none());
    }

    #[test]
    fn test_web_app_data_creates_escrow() {
        let (bot, store) = handler();
        let data = json!({
            "action": "create_escrow",
            "data": { "title": "Laptop", "amount": "250", "currency": "USDT", "counterparty": "@bob" }
        })
        .to_string();

        let reply = bot.handle(&web_app_update(&data)).unwrap();
        assert_eq!(reply.chat_id, 770);
        assert!(reply.text.contains("Laptop"));

        let records = store.list_by_owner("77");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 250.0);
        assert_eq!(records[0].status, EscrowStatus::Pending);
        assert!(reply.text.contains(records[0].escrow_id.as_str()));
    }

    #[test]
    fn test_bad_web_app_data_replies_generic_error() {
        let (bot, store) = handler();
        let cases = [
            "not json".to_string(),
            json!({ "action": "delete_everything" }).to_string(),
            json!({ "action": "create_escrow", "data": { "amount": -5 } }).to_string(),
            json!({ "action": "create_escrow", "data": { "amount": "lots" } }).to_string(),
            json!({ "action": "create_escrow", "data": {} }).to_string(),
        ];
        for data in cases {
            let reply = bot.handle(&web_app_update(&data)).unwrap();
            assert_eq!(reply.text, GENERIC_ERROR_TEXT, "{data}");
            assert_eq!(reply.parse_mode, None);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_without_content_is_ignored() {
        let (bot, _) = handler();
        assert!(bot.handle(&update(json!({ "update_id": 9 }))).is_none());
    }

    #[test]
    fn test_reply_serializes_as_method_call() {
        let reply = SendMessage::markdown(1, "hi");
        let json = serde_json::to_value(reply).unwrap();
        assert_eq!(json["method"], "sendMessage");
        assert_eq!(json["chat_id"], 1);
        assert_eq!(json["parse_mode"], "Markdown");
        assert!(json.get("reply_markup").is_none());
    }
}
