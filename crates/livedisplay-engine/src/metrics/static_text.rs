use super::Fetcher;
use crate::format::localise_value;
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use livedisplay_types::{FetchError, FetchResult};
use serde_json::Value;

/// Shows its first argument as is; numbers are localised.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticText;

impl StaticText {
    pub const NAME: &'static str = "static";

    fn produce(args: &[Value]) -> FetchResult {
        match args.first() {
            None | Some(Value::Null) => {
                Err(FetchError::InvalidArgs("text is required".to_string()))
            }
            Some(value) => Ok(localise_value(value)),
        }
    }
}

impl Fetcher for StaticText {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch(&self, args: &[Value], _now_ms: i64) -> BoxFuture<'static, FetchResult> {
        ready(Self::produce(args)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    #[test]
    fn test_static_text_is_ready_immediately() {
        let result = StaticText.fetch(&[json!("hello")], 0).now_or_never();
        assert_eq!(result, Some(Ok("hello".to_string())));
    }

    #[test]
    fn test_numbers_are_localised() {
        let result = StaticText.fetch(&[json!(1500000)], 0).now_or_never();
        assert_eq!(result, Some(Ok("1,500,000".to_string())));
    }

    #[test]
    fn test_missing_text_is_invalid() {
        let result = StaticText.fetch(&[], 0).now_or_never();
        assert!(matches!(result, Some(Err(FetchError::InvalidArgs(_)))));
    }
}
