use std::env;

/// Raw configuration values read from the process environment.
///
/// Empty variables are treated as unset.
#[derive(Debug, Clone, Default)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<String>,
    pub public_host: Option<String>,
    pub openai_api_key: Option<String>,
    pub realtime_url: Option<String>,
    pub system_message: Option<String>,
    pub greeting: Option<String>,
    pub voice: Option<String>,
    pub temperature: Option<String>,
    pub webhook_url: Option<String>,
}

impl EnvConfig {
    pub fn load() -> Self {
        Self {
            host: var("HOST"),
            port: var("PORT"),
            public_host: var("PUBLIC_HOST"),
            openai_api_key: var("OPENAI_API_KEY"),
            realtime_url: var("OPENAI_REALTIME_URL"),
            system_message: var("SYSTEM_MESSAGE"),
            greeting: var("GREETINGS_RESPONSE"),
            voice: var("OPENAI_REALTIME_VOICE"),
            temperature: var("OPENAI_REALTIME_TEMPERATURE"),
            webhook_url: var("WEBHOOK_URL"),
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
