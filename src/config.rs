use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
    pub currency: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// How long an appointment may sit in `pending_payment` before the sweep
    /// expires it. `None` disables the sweep.
    pub pending_ttl: Option<chrono::Duration>,
    pub sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed_or("APP_PORT", 3000u16)?;

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            ttl_hours: parsed_or("JWT_TTL_HOURS", 24i64)?,
        };

        let payment = PaymentConfig {
            key_id: required("PAYMENT_KEY_ID")?,
            key_secret: required("PAYMENT_KEY_SECRET")?,
            api_base: env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com".to_string()),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            timeout: Duration::from_secs(parsed_or("PAYMENT_TIMEOUT_SECS", 15u64)?),
        };

        let ttl_minutes: i64 = parsed_or("PENDING_BOOKING_TTL_MINUTES", 30)?;
        let booking = BookingConfig {
            pending_ttl: (ttl_minutes > 0).then(|| chrono::Duration::minutes(ttl_minutes)),
            sweep_interval: Duration::from_secs(parsed_or("SWEEP_INTERVAL_SECS", 60u64)?.max(1)),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            payment,
            booking,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    let value = env::var(key).with_context(|| format!("{key} is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{key} must not be empty");
    }
    Ok(value)
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_or_falls_back_when_unset() {
        let port: u16 = parsed_or("CONSULT_MARKET_TEST_UNSET_PORT", 4000).unwrap();
        assert_eq!(port, 4000);
    }

    #[test]
    fn required_reports_missing_key() {
        let err = required("CONSULT_MARKET_TEST_MISSING_SECRET").unwrap_err();
        assert!(err.to_string().contains("CONSULT_MARKET_TEST_MISSING_SECRET"));
    }
}
