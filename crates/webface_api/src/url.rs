use url::Url;

use crate::error::ApiError;

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Parse a base URL into a form endpoints can be joined onto.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_BASE_URL`]
/// 2) only `http`/`https` are accepted
/// 3) query and fragment are dropped, and the path gains a trailing `/` so a
///    prefix like `/app` keeps its last segment when endpoints are joined
pub fn normalize_base_url(input: &str) -> Result<Url, ApiError> {
    let raw = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };

    let mut url =
        Url::parse(raw).map_err(|error| ApiError::InvalidBaseUrl(format!("{raw}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidBaseUrl(format!(
            "{raw}: unsupported scheme '{}'",
            url.scheme()
        )));
    }

    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Join a relative endpoint path onto the base and append query pairs in order.
pub fn endpoint_url(base: &Url, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
    let mut url = base
        .join(path.trim_start_matches('/'))
        .map_err(|error| ApiError::InvalidBaseUrl(format!("{base} + {path}: {error}")))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Resolve a page directive (usually origin-relative, e.g. `/static/page.html`)
/// against the base URL the way a browser would. Unresolvable input is
/// returned untouched.
pub fn resolve_page_url(base: &Url, page: &str) -> String {
    base.join(page)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| page.to_owned())
}
