use teloxide::utils::command::BotCommands;

/// Operator commands, mirroring the two threshold parameters and the two
/// manual overrides.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "SOL trader bot commands:")]
pub enum Command {
    #[command(description = "show what the bot does")]
    Start,

    #[command(description = "current price, thresholds and position")]
    Status,

    #[command(description = "set buy drop threshold in percent (usage: /setbuy 5)")]
    #[command(parse_with = "split")]
    Setbuy { pct: f64 },

    #[command(description = "set take-profit threshold in percent (usage: /settp 2)")]
    #[command(parse_with = "split")]
    Settp { pct: f64 },

    #[command(description = "manual market buy of the configured USDC amount")]
    Buy,

    #[command(description = "manual market sell of the open position")]
    Sell,

    #[command(description = "show this help message")]
    Help,
}
