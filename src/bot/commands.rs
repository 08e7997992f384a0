//! Bot commands

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the menu and start a new order")]
    Start,
    #[command(description = "drop the order in progress")]
    Cancel,
    #[command(description = "explain how ordering works")]
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "order_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/cancel", "order_bot").unwrap(), Command::Cancel);
        assert_eq!(Command::parse("/help@order_bot", "order_bot").unwrap(), Command::Help);
        assert!(Command::parse("/menu", "order_bot").is_err());
    }

    #[test]
    fn test_command_list() {
        let names: Vec<String> = Command::bot_commands()
            .into_iter()
            .map(|c| c.command.trim_start_matches('/').to_string())
            .collect();
        assert_eq!(names, vec!["start", "cancel", "help"]);
    }
}
