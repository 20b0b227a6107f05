use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{ConfigOverrides, ServerConfig};
use crate::core::codec::RealtimeVoice;
use crate::core::codec::realtime::OPENAI_REALTIME_URL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Merge environment values with YAML overrides and CLI overrides.
///
/// Every missing required value is collected so the error names all of
/// them at once.
pub(super) fn merge_config(
    env: EnvConfig,
    yaml: Option<YamlConfig>,
    overrides: &ConfigOverrides,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml.unwrap_or_default();
    let server = yaml.server.unwrap_or_default();
    let openai = yaml.openai.unwrap_or_default();
    let assistant = yaml.assistant.unwrap_or_default();
    let webhook = yaml.webhook.unwrap_or_default();

    let env_port = env
        .port
        .as_deref()
        .map(|port| {
            port.parse::<u16>()
                .map_err(|e| format!("Invalid PORT value '{port}': {e}"))
        })
        .transpose()?;

    let env_temperature = env
        .temperature
        .as_deref()
        .map(|t| {
            t.parse::<f32>()
                .map_err(|e| format!("Invalid OPENAI_REALTIME_TEMPERATURE value '{t}': {e}"))
        })
        .transpose()?;

    let voice_name = assistant.voice.or(env.voice);
    let voice = match voice_name.as_deref() {
        Some(name) => RealtimeVoice::parse(name).ok_or_else(|| format!("Unsupported voice: {name}"))?,
        None => RealtimeVoice::default(),
    };

    let port = overrides.port.or(server.port).or(env_port);
    let openai_api_key = non_empty(openai.api_key).or(env.openai_api_key);
    let system_message = non_empty(assistant.system_message).or(env.system_message);
    let greeting = non_empty(assistant.greeting).or(env.greeting);
    let webhook_url = non_empty(webhook.url).or(env.webhook_url);

    let mut missing = Vec::new();
    if openai_api_key.is_none() {
        missing.push("OPENAI_API_KEY");
    }
    if system_message.is_none() {
        missing.push("SYSTEM_MESSAGE");
    }
    if port.is_none() {
        missing.push("PORT");
    }
    if greeting.is_none() {
        missing.push("GREETINGS_RESPONSE");
    }
    if webhook_url.is_none() {
        missing.push("WEBHOOK_URL");
    }

    match (openai_api_key, system_message, port, greeting, webhook_url) {
        (Some(openai_api_key), Some(system_message), Some(port), Some(greeting), Some(webhook_url)) => {
            Ok(ServerConfig {
                host: non_empty(server.host)
                    .or(env.host)
                    .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                public_host: non_empty(server.public_host).or(env.public_host),
                openai_api_key,
                realtime_url: non_empty(openai.realtime_url)
                    .or(env.realtime_url)
                    .unwrap_or_else(|| OPENAI_REALTIME_URL.to_string()),
                system_message,
                greeting,
                voice,
                temperature: assistant
                    .temperature
                    .or(env_temperature)
                    .unwrap_or(DEFAULT_TEMPERATURE),
                webhook_url,
            })
        }
        _ => Err(format!(
            "Missing required configuration: {}",
            missing.join(", ")
        )
        .into()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
