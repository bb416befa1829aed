use crate::error::{Error, Result};
use crate::model::request::RequestTemplate;
use crate::services::http::{HttpRequest, Pause, Transport};

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use std::time::Duration;

pub const SORT_BY: &str = "LEARNED_DATE";

const PAGINATION_PARAMS: [&str; 3] = ["limit", "sortBy", "startIndex"];

// Checked in order; the first present key wins.
const RECORD_KEYS: [&str; 2] = ["lexemes", "results"];

pub struct FetchConfig {
    pub page_size: usize,
    pub page_pause: Duration,
}

/// Page URL: the template's own query parameters plus `limit`, `sortBy`
/// and `startIndex` for this page.
pub fn page_url(template: &RequestTemplate, start_index: usize, limit: usize) -> Result<String> {
    let mut url = Url::parse(&template.base_url)
        .map_err(|e| Error::parse(format!("invalid base URL '{}': {e}", template.base_url)))?;

    {
        let mut query = url.query_pairs_mut();
        for (name, value) in &template.params {
            if PAGINATION_PARAMS.contains(&name.as_str()) {
                continue;
            }
            for v in value.values() {
                query.append_pair(name, v);
            }
        }
        query
            .append_pair("limit", &limit.to_string())
            .append_pair("sortBy", SORT_BY)
            .append_pair("startIndex", &start_index.to_string());
    }

    Ok(url.to_string())
}

/// Pull the record list out of one response body.
pub fn records_from(response: &Value) -> Vec<Value> {
    for key in RECORD_KEYS {
        if let Some(v) = response.get(key) {
            return v.as_array().cloned().unwrap_or_default();
        }
    }

    if let Some(obj) = response.as_object() {
        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        warn!("Response has no record list; keys: {:?}", keys);
    }

    Vec::new()
}

fn build_request(template: &RequestTemplate, url: String) -> Result<HttpRequest> {
    let method = Method::from_bytes(template.method.as_bytes())
        .map_err(|_| Error::parse(format!("invalid HTTP method '{}'", template.method)))?;

    Ok(HttpRequest {
        method,
        url,
        headers: template
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        body: template.body.clone(),
    })
}

pub fn fetch_page(
    transport: &dyn Transport,
    template: &RequestTemplate,
    start_index: usize,
    limit: usize,
) -> Result<Vec<Value>> {
    info!("Fetching lexemes from startIndex={}", start_index);

    let request = build_request(template, page_url(template, start_index, limit)?)?;

    let resp = transport.send(&request).map_err(|e| Error::Transport { message: e.message })?;

    if !resp.status.is_success() {
        return Err(Error::Http {
            status: resp.status.as_u16(),
            reason: resp.reason().to_string(),
            body: resp.body_text(),
        });
    }

    let json: Value = serde_json::from_slice(&resp.body)?;
    Ok(records_from(&json))
}

/// Fetch every page, stopping at the first empty or short page.
///
/// A short page is taken to mean "last page". Any failed page aborts the
/// whole fetch; nothing accumulated so far is returned.
pub fn fetch_all(
    transport: &dyn Transport,
    pause: &dyn Pause,
    template: &RequestTemplate,
    cfg: &FetchConfig,
) -> Result<Vec<Value>> {
    if cfg.page_size == 0 {
        return Err(Error::invalid_settings("page_size must be at least 1"));
    }

    let mut all = Vec::new();
    let mut start_index = 0usize;

    loop {
        let page = fetch_page(transport, template, start_index, cfg.page_size)?;

        if page.is_empty() {
            debug!("No more lexemes found");
            break;
        }

        let count = page.len();
        all.extend(page);
        info!("Retrieved {} lexemes (total: {})", count, all.len());

        if count < cfg.page_size {
            break;
        }

        start_index += cfg.page_size;
        pause.pause(cfg.page_pause);
    }

    info!("Total lexemes retrieved: {}", all.len());
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::curl;
    use crate::services::http::testing::{RecordingPause, ScriptedTransport};
    use serde_json::json;

    fn template() -> RequestTemplate {
        curl::parse(
            "curl 'https://www.duolingo.com/2017-06-30/users/42/courses/vi/en/learned-lexemes?limit=10&sortBy=ALPHABETICAL&startIndex=0&keep=yes' \
             -H 'authorization: Bearer t' --data-raw '{}'",
        )
        .unwrap()
    }

    fn page(n: usize, key: &str) -> Vec<u8> {
        let items: Vec<Value> = (0..n).map(|i| json!({ "word": format!("w{i}") })).collect();
        serde_json::to_vec(&json!({ key: items })).unwrap()
    }

    fn cfg() -> FetchConfig {
        FetchConfig {
            page_size: 50,
            page_pause: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_page_url_overrides_pagination_only() {
        let url = page_url(&template(), 100, 50).unwrap();
        assert_eq!(
            url,
            "https://www.duolingo.com/2017-06-30/users/42/courses/vi/en/learned-lexemes?keep=yes&limit=50&sortBy=LEARNED_DATE&startIndex=100"
        );
    }

    #[test]
    fn test_fetch_all_stops_on_short_page() {
        let transport = ScriptedTransport::new()
            .respond(200, &page(50, "lexemes"))
            .respond(200, &page(50, "lexemes"))
            .respond(200, &page(30, "lexemes"));
        let pause = RecordingPause::default();

        let records = fetch_all(&transport, &pause, &template(), &cfg()).unwrap();

        assert_eq!(records.len(), 130);
        assert_eq!(transport.calls(), 3);
        assert_eq!(pause.pauses.borrow().len(), 2);
        assert_eq!(records[50]["word"], "w0");

        let requests = transport.requests.borrow();
        assert!(requests[2].url.ends_with("startIndex=100"));
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_fetch_all_stops_on_empty_page() {
        let transport = ScriptedTransport::new()
            .respond(200, &page(50, "results"))
            .respond(200, &page(0, "results"));
        let pause = RecordingPause::default();

        let records = fetch_all(&transport, &pause, &template(), &cfg()).unwrap();

        assert_eq!(records.len(), 50);
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_unknown_shape_yields_no_records() {
        assert!(records_from(&json!({ "items": [1, 2] })).is_empty());
        assert!(records_from(&json!([1, 2])).is_empty());
        assert_eq!(records_from(&json!({ "results": [1] })).len(), 1);
    }

    #[test]
    fn test_http_error_aborts_fetch() {
        let transport = ScriptedTransport::new()
            .respond(200, &page(50, "lexemes"))
            .respond(401, b"{\"error\":\"unauthorized\"}");
        let pause = RecordingPause::default();

        let err = fetch_all(&transport, &pause, &template(), &cfg()).unwrap_err();

        match err {
            Error::Http { status, body, .. } => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_aborts_fetch() {
        let transport = ScriptedTransport::new().fail("dns failure");
        let pause = RecordingPause::default();

        let err = fetch_all(&transport, &pause, &template(), &cfg()).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
