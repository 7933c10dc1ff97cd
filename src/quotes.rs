use crate::error::PortfolioError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Live prices keyed by symbol, as returned by the quote API.
pub type QuoteMap = HashMap<String, Quote>;

/// One quote as delivered by the API.
///
/// The price arrives as a bare number or string-encoded depending on the
/// endpoint, and is kept raw across this boundary; parsing happens in the
/// aggregator so a malformed value degrades that one symbol instead of
/// failing the whole batch. A symbol the API could not serve comes back as
/// an error object without a price field, which decodes to `price: None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub price: Option<serde_json::Value>,
}

impl Quote {
    pub fn parsed_price(&self) -> Option<f64> {
        let value = match self.price.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64()?,
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// Client for a Twelve-Data-style price endpoint.
///
/// All symbols are fetched in one comma-joined GET per run.
pub struct QuoteClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl QuoteClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<QuoteClient, PortfolioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PortfolioError::QuoteSource(e.to_string()))?;
        Ok(QuoteClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch the latest price for every symbol in one batched request.
    pub async fn latest_prices(&self, symbols: &[String]) -> Result<QuoteMap, PortfolioError> {
        if symbols.is_empty() {
            return Ok(QuoteMap::new());
        }

        let url = format!("{}/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbols.join(",").as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PortfolioError::QuoteSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PortfolioError::QuoteSource(format!(
                "quote API returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PortfolioError::QuoteSource(e.to_string()))?;
        decode_price_response(&body, symbols)
    }
}

/// Decode the price endpoint's response body.
///
/// A batch request comes back keyed by symbol: `{"AAPL": {"price": "…"}}`.
/// When exactly one symbol is requested the API flattens the envelope to
/// `{"price": "…"}`, so that shape is retried under the requested symbol.
fn decode_price_response(body: &str, symbols: &[String]) -> Result<QuoteMap, PortfolioError> {
    if let Ok(map) = serde_json::from_str::<QuoteMap>(body) {
        return Ok(map);
    }
    if let [symbol] = symbols {
        // An error envelope also decodes here, but without a price; only a
        // real flat quote counts.
        if let Ok(quote) = serde_json::from_str::<Quote>(body) {
            if quote.price.is_some() {
                return Ok(QuoteMap::from([(symbol.clone(), quote)]));
            }
        }
    }
    Err(PortfolioError::QuoteSource(
        "could not decode quote response".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_batch_response() {
        let body = r#"{"AAPL": {"price": "150.00"}, "MSFT": {"price": "280.00"}}"#;
        let map = decode_price_response(body, &symbols(&["AAPL", "MSFT"])).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["AAPL"].parsed_price(), Some(150.0));
        assert_eq!(map["MSFT"].parsed_price(), Some(280.0));
    }

    #[test]
    fn test_decode_numeric_price() {
        let body = r#"{"AAPL": {"price": 150.5}}"#;
        let map = decode_price_response(body, &symbols(&["AAPL"])).unwrap();
        assert_eq!(map["AAPL"].parsed_price(), Some(150.5));
    }

    #[test]
    fn test_decode_single_symbol_flat_response() {
        let body = r#"{"price": "96.30"}"#;
        let map = decode_price_response(body, &symbols(&["AAPL"])).unwrap();
        assert_eq!(map["AAPL"].parsed_price(), Some(96.3));
    }

    #[test]
    fn test_decode_per_symbol_error_object_has_no_price() {
        let body = r#"{"AAPL": {"price": "150.00"}, "XXXX": {"code": 404, "status": "error"}}"#;
        let map = decode_price_response(body, &symbols(&["AAPL", "XXXX"])).unwrap();
        assert_eq!(map["AAPL"].parsed_price(), Some(150.0));
        assert_eq!(map["XXXX"].parsed_price(), None);
    }

    #[test]
    fn test_decode_rejects_error_envelope() {
        let body = r#"{"code": 401, "message": "invalid api key", "status": "error"}"#;
        let result = decode_price_response(body, &symbols(&["AAPL", "MSFT"]));
        assert!(matches!(result, Err(PortfolioError::QuoteSource(_))));
    }

    #[test]
    fn test_decode_rejects_error_envelope_for_single_symbol() {
        let body = r#"{"code": 401, "message": "invalid api key", "status": "error"}"#;
        let result = decode_price_response(body, &symbols(&["AAPL"]));
        assert!(matches!(result, Err(PortfolioError::QuoteSource(_))));
    }

    #[test]
    fn test_decode_rejects_non_json_body() {
        let result = decode_price_response("<html>bad gateway</html>", &symbols(&["AAPL"]));
        assert!(matches!(result, Err(PortfolioError::QuoteSource(_))));
    }

    #[test]
    fn test_parsed_price_rejects_garbage() {
        let quote = Quote {
            price: Some("n/a".into()),
        };
        assert_eq!(quote.parsed_price(), None);
        let quote = Quote { price: None };
        assert_eq!(quote.parsed_price(), None);
        let quote = Quote {
            price: Some(serde_json::json!({"unexpected": true})),
        };
        assert_eq!(quote.parsed_price(), None);
    }
}
