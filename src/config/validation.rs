use url::Url;

/// Accepted range for the realtime sampling temperature.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.6..=1.2;

/// The schedule webhook must be an absolute http(s) URL.
pub(super) fn validate_webhook_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Url::parse(url).map_err(|e| format!("Invalid WEBHOOK_URL '{url}': {e}"))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("Invalid WEBHOOK_URL '{url}': unsupported scheme '{scheme}'").into()),
    }
}

/// The realtime endpoint must be a ws(s) URL.
pub(super) fn validate_realtime_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed =
        Url::parse(url).map_err(|e| format!("Invalid OPENAI_REALTIME_URL '{url}': {e}"))?;

    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        scheme => Err(format!(
            "Invalid OPENAI_REALTIME_URL '{url}': unsupported scheme '{scheme}'"
        )
        .into()),
    }
}

pub(super) fn validate_temperature(temperature: f32) -> Result<(), Box<dyn std::error::Error>> {
    if TEMPERATURE_RANGE.contains(&temperature) {
        Ok(())
    } else {
        Err(format!(
            "Invalid temperature {temperature}: must be between {} and {}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )
        .into())
    }
}
