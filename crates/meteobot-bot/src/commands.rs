//! Telegram command surface.

use meteobot_weather::DEFAULT_CITY;
use teloxide::utils::command::BotCommands;

/// Argument that bypasses the cache
const FORCE_ARG: &str = "force";

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "greeting and command list")]
    Start(String),
    #[command(description = "show this help")]
    Help(String),
    #[command(description = "weather in Taganrog")]
    Weather(String),
    #[command(description = "weather in Matveev Kurgan")]
    WeatherMatveev(String),
    #[command(description = "weather in Natalyevka")]
    WeatherNatalyevka(String),
    #[command(description = "weather in Rostov-on-Don")]
    WeatherRostov(String),
    #[command(description = "weather in Sochi")]
    WeatherSochi(String),
    #[command(description = "API usage statistics")]
    Stats(String),
}

/// What a command asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Welcome,
    Stats,
    Weather {
        city_key: &'static str,
        force_refresh: bool,
    },
}

impl Command {
    pub fn action(&self) -> Action {
        let city_key = match self {
            Self::Start(_) | Self::Help(_) => return Action::Welcome,
            Self::Stats(_) => return Action::Stats,
            Self::Weather(_) => DEFAULT_CITY,
            Self::WeatherMatveev(_) => "matveev_kurgan",
            Self::WeatherNatalyevka(_) => "natalyevka",
            Self::WeatherRostov(_) => "rostov",
            Self::WeatherSochi(_) => "sochi",
        };
        Action::Weather {
            city_key,
            force_refresh: self.force_refresh(),
        }
    }

    /// True if the arguments contain `force`
    pub fn force_refresh(&self) -> bool {
        self.args()
            .split_whitespace()
            .any(|arg| arg.eq_ignore_ascii_case(FORCE_ARG))
    }

    fn args(&self) -> &str {
        match self {
            Self::Start(args)
            | Self::Help(args)
            | Self::Weather(args)
            | Self::WeatherMatveev(args)
            | Self::WeatherNatalyevka(args)
            | Self::WeatherRostov(args)
            | Self::WeatherSochi(args)
            | Self::Stats(args) => args,
        }
    }
}
