use crate::config::PriceFeedConfig;
use crate::error::SourceError;
use crate::models::price_snapshot::CURRENCY_SCALE;
use crate::models::PriceSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

/// Live market-data feed producing a price snapshot
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch current prices. Success always yields `is_fallback = false`.
    async fn fetch_live_prices(&self) -> Result<PriceSnapshot, SourceError>;
}

/// CollectAPI gold price feed
pub struct CollectApiPriceSource {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    result: Vec<FeedInstrument>,
}

#[derive(Debug, Deserialize)]
struct FeedInstrument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    buying: Option<Value>,
}

impl CollectApiPriceSource {
    /// Build a source with the configured endpoint, key and request timeout
    pub fn new(config: &PriceFeedConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PriceSource for CollectApiPriceSource {
    async fn fetch_live_prices(&self) -> Result<PriceSnapshot, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("apikey {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_feed(&body, Utc::now())
    }
}

/// Extract the five instrument buying prices from a feed payload.
/// Instruments that are absent or unusable take their per-field default.
pub fn parse_feed(body: &[u8], recorded_at: DateTime<Utc>) -> Result<PriceSnapshot, SourceError> {
    let feed: FeedResponse =
        serde_json::from_slice(body).map_err(|e| SourceError::Payload(e.to_string()))?;

    Ok(PriceSnapshot::from_lookup(recorded_at, |instrument| {
        let quoted = feed
            .result
            .iter()
            .find(|item| item.name.as_deref() == Some(instrument.feed_name()))
            .and_then(|item| item.buying.as_ref())
            .and_then(parse_price);

        match quoted {
            Some(price) => price,
            None => {
                debug!(instrument = ?instrument, "Instrument missing from feed, using default");
                instrument.default_price()
            }
        }
    }))
}

/// Interpret a buying price given as a JSON number or string.
/// Zero, negative, ambiguous and unparsable quotes are treated as missing.
/// Prices are kept at currency precision, the same as stored history.
fn parse_price(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => match normalize_decimal_text(s) {
            Some(text) => text,
            None => {
                warn!("Ignoring ambiguous feed price {:?}", s);
                return None;
            }
        },
        _ => return None,
    };

    let parsed = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .map(|price| {
            price.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
        });

    match parsed {
        Some(price) if price > Decimal::ZERO => Some(price.normalize()),
        Some(price) => {
            warn!("Ignoring non-positive feed price {}", price);
            None
        }
        None => {
            warn!("Ignoring unparsable feed price {:?}", raw);
            None
        }
    }
}

/// Rewrite a quoted price into plain decimal form.
///
/// The separator that appears last is the decimal point and the other one
/// groups thousands, so both "1,234.50" and "2.450,75" are read correctly.
/// With a single kind of separator, one occurrence followed by exactly three
/// digits could be either, and `None` is returned. Repeated occurrences of
/// one separator only group thousands.
fn normalize_decimal_text(s: &str) -> Option<String> {
    let trimmed = s.trim();

    let (decimal, grouping) = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (None, None) => return Some(trimmed.to_string()),
        (Some(comma), Some(dot)) if comma > dot => (',', '.'),
        (Some(_), Some(_)) => ('.', ','),
        (Some(_), None) | (None, Some(_)) => {
            let sep = if trimmed.contains(',') { ',' } else { '.' };
            if trimmed.matches(sep).count() > 1 {
                return Some(trimmed.replace(sep, ""));
            }
            let (_, fraction) = trimmed.rsplit_once(sep)?;
            if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            (sep, if sep == ',' { '.' } else { ',' })
        }
    };

    Some(trimmed.replace(grouping, "").replace(decimal, "."))
}
