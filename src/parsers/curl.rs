use crate::error::{Error, Result};
use crate::model::request::{QueryValue, RequestTemplate};
use regex::Regex;
use std::collections::BTreeMap;
use url::Url;

/// Parse a "Copy as cURL" capture into a replayable request.
///
/// Accepts `curl '<url>'`, any number of `-H '<Name>: <value>'` (or `--header`)
/// flags, an optional `-X`/`--request` method and an optional
/// `--data-raw`/`--data`/`--data-binary` payload which may span lines.
pub fn parse(capture: &str) -> Result<RequestTemplate> {
    let url_re = compile(r"curl\s+'([^']+)'")?;
    let header_re = compile(r"(?:-H|--header)\s+'([^:']+):\s*([^']*)'")?;
    let data_re = compile(r"--data(?:-raw|-binary)?\s+'([^']*)'")?;
    let method_re = compile(r"(?:-X|--request)\s+'?([A-Za-z]+)'?")?;

    let url = url_re
        .captures(capture)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::parse("could not find URL in curl command"))?;

    let mut headers = BTreeMap::new();
    for caps in header_re.captures_iter(capture) {
        let name = caps[1].trim().to_string();
        let value = caps[2].trim().to_string();
        headers.insert(name, value);
    }

    let body = data_re
        .captures(capture)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let method = match method_re.captures(capture).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().to_ascii_uppercase(),
        None => "POST".to_string(),
    };

    let parts = decompose_url(&url)?;

    Ok(RequestTemplate {
        method,
        url,
        base_url: parts.base_url,
        params: parts.params,
        headers,
        body,
        user_id: parts.user_id,
        learning_language: parts.learning_language,
        from_language: parts.from_language,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub base_url: String,
    pub params: BTreeMap<String, QueryValue>,
    pub user_id: Option<String>,
    pub learning_language: Option<String>,
    pub from_language: Option<String>,
}

/// Split a captured URL into base path, query parameters and the
/// positional segments of `/<version>/users/<id>/courses/<learning>/<from>/...`.
pub fn decompose_url(raw: &str) -> Result<UrlParts> {
    let parsed = Url::parse(raw).map_err(|e| Error::parse(format!("invalid URL '{raw}': {e}")))?;

    let mut base = parsed.clone();
    base.set_query(None);
    base.set_fragment(None);

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in parsed.query_pairs() {
        grouped.entry(k.into_owned()).or_default().push(v.into_owned());
    }

    let params = grouped
        .into_iter()
        .map(|(k, mut vs)| {
            let value = if vs.len() == 1 {
                QueryValue::Single(vs.remove(0))
            } else {
                QueryValue::Multi(vs)
            };
            (k, value)
        })
        .collect();

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();
    let segment = |i: usize| {
        segments
            .get(i)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Ok(UrlParts {
        base_url: base.to_string(),
        params,
        user_id: segment(2),
        learning_language: segment(4),
        from_language: segment(5),
    })
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::parse(format!("bad pattern {pattern}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"curl 'https://www.duolingo.com/2017-06-30/users/123456/courses/vi/en/learned-lexemes?limit=50&sortBy=ALPHABETICAL&startIndex=0' \
  -H 'accept: application/json; charset=UTF-8' \
  -H 'authorization: Bearer abc.def.ghi' \
  -H 'content-type: application/json; charset=UTF-8' \
  --data-raw '{"lastTotalLexemeCount":0,"progressedSkills":[{"finishedLevels":1,
"finishedSessions":0,"skillId":{"id":"abc"}}]}'"#;

    #[test]
    fn test_parse_full_capture() {
        let t = parse(CAPTURE).unwrap();

        assert_eq!(t.method, "POST");
        assert_eq!(
            t.base_url,
            "https://www.duolingo.com/2017-06-30/users/123456/courses/vi/en/learned-lexemes"
        );
        assert_eq!(t.headers.len(), 3);
        assert_eq!(t.headers["authorization"], "Bearer abc.def.ghi");
        assert!(t.body.as_deref().unwrap().contains("\"finishedSessions\":0"));
        assert_eq!(t.user_id.as_deref(), Some("123456"));
        assert_eq!(t.learning_language.as_deref(), Some("vi"));
        assert_eq!(t.from_language.as_deref(), Some("en"));
        assert_eq!(
            t.params.get("limit"),
            Some(&QueryValue::Single("50".to_string()))
        );
    }

    #[test]
    fn test_missing_url_is_parse_error() {
        let err = parse("-H 'accept: */*'").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_method_defaults() {
        let t = parse("curl 'https://example.com/a/b'").unwrap();
        assert_eq!(t.method, "POST");
        assert!(t.body.is_none());
        assert!(t.user_id.is_none());

        let t = parse("curl 'https://example.com/a' -X PUT --data-raw 'x'").unwrap();
        assert_eq!(t.method, "PUT");
        assert_eq!(t.body.as_deref(), Some("x"));

        let t = parse("curl 'https://example.com/a' --request get").unwrap();
        assert_eq!(t.method, "GET");
    }

    #[test]
    fn test_repeated_query_params_stay_lists() {
        let parts = decompose_url("https://example.com/p?a=1&b=2&b=3").unwrap();
        assert_eq!(parts.params["a"], QueryValue::Single("1".to_string()));
        assert_eq!(
            parts.params["b"],
            QueryValue::Multi(vec!["2".to_string(), "3".to_string()])
        );
        assert_eq!(parts.base_url, "https://example.com/p");
    }
}
