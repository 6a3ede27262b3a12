//! Currency conversion producer, including the Robux DevEx rate.

use super::{Fetcher, string_arg};
use crate::format::format_money_number;
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_types::{FetchError, FetchResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Pseudo-currency converted through USD at the DevEx rate
pub const ROBUX: &str = "Robux";

/// USD paid out per Robux (350 USD per 100K)
pub const ROBUX_USD_RATE: f64 = 0.0035;

/// Units of each currency per one unit of the base currency
pub type Rates = HashMap<String, f64>;

pub trait RateSource: Send + Sync {
    fn latest(&self) -> BoxFuture<'static, Result<Rates, FetchError>>;
}

#[derive(Debug, Clone, PartialEq)]
struct Conversion {
    from: String,
    to: String,
    multiplier: f64,
    decimal_places: Option<u32>,
}

impl Conversion {
    fn parse(args: &[Value]) -> Result<Self, FetchError> {
        let from = string_arg(args, 0, "currencyA")?.to_string();
        let to = string_arg(args, 1, "currencyB")?.to_string();
        let multiplier = args.get(2).and_then(Value::as_f64).unwrap_or(1.0);
        let decimal_places = args
            .get(3)
            .and_then(Value::as_f64)
            .filter(|dp| *dp >= 0.0)
            .map(|dp| dp as u32);
        Ok(Self {
            from,
            to,
            multiplier,
            decimal_places,
        })
    }

    /// How much of `from` is in `multiplier` units of `to`.
    ///
    /// Decimal places are honoured for conversions into Robux only; plain
    /// currency pairs always show two, and Robux amounts are whole numbers.
    fn apply(&self, rates: &Rates) -> FetchResult {
        let rate = |code: &str| {
            rates
                .get(code)
                .copied()
                .ok_or_else(|| FetchError::Failed(format!("no rate for {}", code)))
        };
        let m = self.multiplier;

        let value = if self.to == ROBUX {
            let usd = m * (rate(&self.from)? / rate("USD")?);
            format_money_number(usd * ROBUX_USD_RATE, self.decimal_places)
        } else if self.from == ROBUX {
            let robux = (m * rate("USD")? / (rate(&self.to)? * ROBUX_USD_RATE)).floor();
            if !robux.is_finite() {
                return Err(FetchError::Failed("conversion overflowed".to_string()));
            }
            format!("{}", robux as i64)
        } else {
            format_money_number(m * rate(&self.from)? / rate(&self.to)?, None)
        };
        Ok(value)
    }
}

pub struct CurrencyFetcher {
    source: Arc<dyn RateSource>,
}

impl CurrencyFetcher {
    pub const NAME: &'static str = "currency";

    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }
}

impl Fetcher for CurrencyFetcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        let conversion = match Conversion::parse(args) {
            Ok(conversion) => conversion,
            Err(err) => return ready(Err(err)).boxed(),
        };

        if conversion.from == conversion.to {
            return ready(Ok(format_money_number(
                conversion.multiplier,
                conversion.decimal_places,
            )))
            .boxed();
        }

        let latest = self.source.latest();
        async move {
            let rates = latest.await?;
            conversion.apply(&rates)
        }
        .boxed()
    }
}
