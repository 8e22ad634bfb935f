//! URL utilities for building upstream and stream URLs

use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Join a base URL and path segments with exactly one `/` between parts
    ///
    /// ```rust
    /// use m3u_lineup::utils::url::UrlUtils;
    ///
    /// assert_eq!(
    ///     UrlUtils::join_path("https://i.mjh.nz/", &["Roku", ".app.json"]),
    ///     "https://i.mjh.nz/Roku/.app.json"
    /// );
    /// ```
    pub fn join_path(base: &str, segments: &[&str]) -> String {
        let mut joined = base.trim_end_matches('/').to_string();
        for segment in segments {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            joined.push('/');
            joined.push_str(segment);
        }
        joined
    }

    /// Substitute `{id}` in a stream URL template
    pub fn fill_template(template: &str, id: &str) -> String {
        template.replace("{id}", id)
    }

    /// Append query pairs, preserving any query already present
    pub fn append_query(url: &str, pairs: &[(&str, &str)]) -> Result<String, url::ParseError> {
        let mut parsed = Url::parse(url)?;
        {
            let mut query = parsed.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }
        Ok(parsed.to_string())
    }

    /// Percent-encode a value for use inside a `|key=value` header suffix
    pub fn encode_component(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    /// Strip the query string from a URL for logging
    pub fn without_query(url: &str) -> &str {
        url.split_once('?').map_or(url, |(base, _)| base)
    }
}
