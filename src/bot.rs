use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::alerts::AlertFilter;
use crate::config::Config;
use crate::notify::Notifier;

/// Shared state for the command listener.
pub struct AppState {
    pub alerts: AlertFilter,
    pub notifier: Notifier,
}

/// Start the admin command listener. Only messages whose sender is the
/// configured admin reach the handler; every other update is ignored.
pub async fn run(bot: Bot, config: Config, state: Arc<AppState>) -> Result<()> {
    info!("Starting command listener...");

    let handler = Update::filter_message()
        .filter_map(move |msg: Message| {
            let user = msg.from.as_ref()?;
            if config.is_admin(user.id) {
                Some(msg)
            } else {
                None
            }
        })
        .endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("listener"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    info!("Admin command: {}", text);

    if let Some(reply) = execute(&text, &state.alerts).await {
        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
            error!("Failed to reply to command: {:#}", e);
            state
                .notifier
                .notify(format!("Error handling command: {:#}", e))
                .await;
        }
    }

    Ok(())
}

/// A parsed admin command. The leading token is case-sensitive; the argument
/// is the rest of the line, trimmed, and may contain spaces.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Add(&'a str),
    Del(&'a str),
    Show,
    Clear,
    Invalid,
    Unrecognized,
}

fn parse(text: &str) -> Command<'_> {
    let text = text.trim();
    let (token, argument) = match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (text, ""),
    };

    match token {
        "/add" if !argument.is_empty() => Command::Add(argument),
        "/del" if !argument.is_empty() => Command::Del(argument),
        "/add" | "/del" => Command::Invalid,
        "/show" => Command::Show,
        "/clear" => Command::Clear,
        _ => Command::Unrecognized,
    }
}

fn render(entries: &[String]) -> String {
    if entries.is_empty() {
        "Empty".to_string()
    } else {
        entries.join(", ")
    }
}

/// Apply a command to the filter list and produce the reply, if one is owed.
/// `/clear` acknowledges by silence.
async fn execute(text: &str, alerts: &AlertFilter) -> Option<String> {
    match parse(text) {
        Command::Add(state) => Some(render(&alerts.add(state).await)),
        Command::Del(state) => Some(render(&alerts.remove(state).await)),
        Command::Show => Some(render(&alerts.snapshot().await)),
        Command::Clear => {
            alerts.clear().await;
            None
        }
        Command::Invalid => Some("Invalid!".to_string()),
        Command::Unrecognized => Some("Command not recognized!".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(parse("/add texas"), Command::Add("texas"));
        assert_eq!(parse("/del texas"), Command::Del("texas"));
        assert_eq!(parse("/add new york"), Command::Add("new york"));
        assert_eq!(parse("/show"), Command::Show);
        assert_eq!(parse("/clear"), Command::Clear);
        assert_eq!(parse("/add"), Command::Invalid);
        assert_eq!(parse("/del"), Command::Invalid);
        assert_eq!(parse("/del   "), Command::Invalid);
        assert_eq!(parse("hello"), Command::Unrecognized);
        assert_eq!(parse("/ADD texas"), Command::Unrecognized);
    }

    #[tokio::test]
    async fn add_then_show_lists_the_entry() {
        let alerts = AlertFilter::new();
        assert_eq!(
            execute("/add texas", &alerts).await.as_deref(),
            Some("texas")
        );
        assert_eq!(execute("/show", &alerts).await.as_deref(), Some("texas"));
    }

    #[tokio::test]
    async fn del_removes_the_entry() {
        let alerts = AlertFilter::new();
        execute("/add texas", &alerts).await;
        execute("/add ohio", &alerts).await;

        assert_eq!(
            execute("/del texas", &alerts).await.as_deref(),
            Some("ohio")
        );
        assert_eq!(execute("/show", &alerts).await.as_deref(), Some("ohio"));
    }

    #[tokio::test]
    async fn del_without_argument_is_invalid_and_changes_nothing() {
        let alerts = AlertFilter::new();
        execute("/add texas", &alerts).await;

        assert_eq!(execute("/del", &alerts).await.as_deref(), Some("Invalid!"));
        assert_eq!(alerts.snapshot().await, vec!["texas".to_string()]);
    }

    #[tokio::test]
    async fn show_on_empty_list_says_empty() {
        let alerts = AlertFilter::new();
        assert_eq!(execute("/show", &alerts).await.as_deref(), Some("Empty"));
    }

    #[tokio::test]
    async fn clear_empties_the_list_without_a_reply() {
        let alerts = AlertFilter::new();
        execute("/add texas", &alerts).await;

        assert_eq!(execute("/clear", &alerts).await, None);
        assert!(alerts.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_gets_the_stock_reply() {
        let alerts = AlertFilter::new();
        assert_eq!(
            execute("/help", &alerts).await.as_deref(),
            Some("Command not recognized!")
        );
    }

    #[tokio::test]
    async fn duplicate_adds_are_kept() {
        let alerts = AlertFilter::new();
        execute("/add texas", &alerts).await;
        execute("/add texas", &alerts).await;
        assert_eq!(
            execute("/show", &alerts).await.as_deref(),
            Some("texas, texas")
        );
    }
}
