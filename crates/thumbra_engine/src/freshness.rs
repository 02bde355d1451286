//! Conditional-GET negotiation.

use chrono::{DateTime, NaiveDateTime, Utc};
use thumbra_core::ObjectMetadata;

/// IMF-fixdate, the preferred HTTP date form.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 form.
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// Obsolete ANSI C `asctime()` form.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Validators a client sent with its request.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct Conditions {
    if_none_match: Option<String>,
    if_modified_since: Option<String>,
}

impl Conditions {
    /// Conditions from raw header values. Blank values count as absent.
    pub fn new(if_none_match: Option<String>, if_modified_since: Option<String>) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            if_none_match: present(if_none_match),
            if_modified_since: present(if_modified_since),
        }
    }

    /// No validators at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only an `If-None-Match` value.
    pub fn matching(value: impl Into<String>) -> Self {
        Self::new(Some(value.into()), None)
    }

    /// Only an `If-Modified-Since` value.
    pub fn since(value: impl Into<String>) -> Self {
        Self::new(None, Some(value.into()))
    }
}

/// Outcome of negotiating a stored object against client validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The client's copy is current; answer 304.
    NotModified,
    /// Send the full object.
    Modified,
}

/// Decide between 304 and a full response.
///
/// `If-None-Match` takes precedence: when present it alone decides. Otherwise
/// a parseable `If-Modified-Since` yields not-modified if the stored instant is
/// known and not after it. Comparison is at whole-second resolution, matching
/// what HTTP dates can express.
///
/// # Examples
///
/// ```
/// use thumbra_core::ObjectMetadata;
/// use thumbra_engine::{Conditions, Freshness, negotiate};
///
/// let stored = ObjectMetadata {
///     e_tag: Some("\"abc\"".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(negotiate(&Conditions::matching("\"abc\""), &stored), Freshness::NotModified);
/// assert_eq!(negotiate(&Conditions::matching("\"xyz\""), &stored), Freshness::Modified);
/// ```
pub fn negotiate(conditions: &Conditions, stored: &ObjectMetadata) -> Freshness {
    if let Some(if_none_match) = &conditions.if_none_match {
        let candidate = if_none_match.trim();
        return match &stored.e_tag {
            Some(e_tag) if candidate == "*" || candidate == e_tag => Freshness::NotModified,
            _ => Freshness::Modified,
        };
    }

    let since = conditions
        .if_modified_since
        .as_deref()
        .and_then(parse_http_date);
    match (since, stored.last_modified) {
        (Some(since), Some(modified)) if modified.timestamp() <= since.timestamp() => {
            Freshness::NotModified
        }
        _ => Freshness::Modified,
    }
}

/// Parse an HTTP date in any of the three forms HTTP/1.1 allows.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Format an instant as an IMF-fixdate.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use thumbra_engine::format_http_date;
///
/// let instant = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
/// assert_eq!(format_http_date(instant), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn format_http_date(instant: DateTime<Utc>) -> String {
    instant.format(IMF_FIXDATE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn modified() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 21, 23, 31, 1).unwrap()
    }

    fn stored() -> ObjectMetadata {
        ObjectMetadata {
            content_type: "image/png".to_string(),
            length: 3,
            e_tag: Some("\"abc\"".to_string()),
            last_modified: Some(modified()),
            content_disposition: None,
        }
    }

    #[test]
    fn test_all_three_date_forms_parse() {
        let expected = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_entity_tag_match_and_wildcard() {
        assert_eq!(
            negotiate(&Conditions::matching("\"abc\""), &stored()),
            Freshness::NotModified
        );
        assert_eq!(
            negotiate(&Conditions::matching("*"), &stored()),
            Freshness::NotModified
        );
        assert_eq!(
            negotiate(&Conditions::matching("\"other\""), &stored()),
            Freshness::Modified
        );
    }

    #[test]
    fn test_wildcard_needs_a_known_tag() {
        let untagged = ObjectMetadata {
            e_tag: None,
            ..stored()
        };
        assert_eq!(
            negotiate(&Conditions::matching("*"), &untagged),
            Freshness::Modified
        );
    }

    #[test]
    fn test_modification_time_boundaries() {
        let at = format_http_date(modified());
        let after = format_http_date(modified() + Duration::seconds(1));
        let before = format_http_date(modified() - Duration::seconds(1));

        assert_eq!(
            negotiate(&Conditions::since(at), &stored()),
            Freshness::NotModified
        );
        assert_eq!(
            negotiate(&Conditions::since(after), &stored()),
            Freshness::NotModified
        );
        assert_eq!(
            negotiate(&Conditions::since(before), &stored()),
            Freshness::Modified
        );
    }

    #[test]
    fn test_sub_second_precision_is_ignored() {
        let precise = ObjectMetadata {
            last_modified: Some(modified() + Duration::milliseconds(750)),
            ..stored()
        };
        let echoed = format_http_date(modified());
        assert_eq!(
            negotiate(&Conditions::since(echoed), &precise),
            Freshness::NotModified
        );
    }

    #[test]
    fn test_etag_mismatch_skips_date_check() {
        let conditions = Conditions::new(
            Some("\"other\"".to_string()),
            Some(format_http_date(modified())),
        );
        assert_eq!(negotiate(&conditions, &stored()), Freshness::Modified);
    }

    #[test]
    fn test_unknown_modification_time_or_bad_date_sends_full() {
        let undated = ObjectMetadata {
            last_modified: None,
            ..stored()
        };
        assert_eq!(
            negotiate(&Conditions::since(format_http_date(modified())), &undated),
            Freshness::Modified
        );
        assert_eq!(
            negotiate(&Conditions::since("not a date"), &stored()),
            Freshness::Modified
        );
        assert_eq!(negotiate(&Conditions::none(), &stored()), Freshness::Modified);
    }

    #[test]
    fn test_blank_headers_are_absent() {
        let conditions = Conditions::new(Some("  ".to_string()), None);
        assert_eq!(conditions.if_none_match(), &None);
    }
}
