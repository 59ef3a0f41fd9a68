use reqwest::header::HeaderMap;
use url::Url;

use crate::domain::models::{
    CookieStats, HttpsRating, HttpsStatus, SecurityHeaderValues, SecurityHeaders, SecurityReport,
};
use crate::service::scoring::{cookie_score, header_score};

/// Evaluate the transport and header posture of a fetched page.
///
/// Cookie flags are detected by plain substring search over the whole
/// `Set-Cookie` value, so a cookie *named* `Secure` also counts as secure.
pub fn evaluate_security(headers: &HeaderMap, cookies: &[String], final_url: &str) -> SecurityReport {
    let enabled = is_https(final_url);
    let values = collect_headers(headers);
    let implemented = values.implemented();
    let total = SecurityHeaderValues::NAMES.len();

    SecurityReport {
        https: HttpsStatus {
            enabled,
            score: if enabled {
                HttpsRating::Good
            } else {
                HttpsRating::Poor
            },
        },
        security_headers: SecurityHeaders {
            headers: values,
            implemented,
            missing: total - implemented,
            score: header_score(implemented, total),
        },
        cookies: analyze_cookies(cookies),
    }
}

fn is_https(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "https",
        Err(_) => url.starts_with("https://"),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn collect_headers(headers: &HeaderMap) -> SecurityHeaderValues {
    SecurityHeaderValues {
        strict_transport_security: header_value(headers, "strict-transport-security"),
        content_security_policy: header_value(headers, "content-security-policy"),
        x_xss_protection: header_value(headers, "x-xss-protection"),
        x_frame_options: header_value(headers, "x-frame-options"),
        x_content_type_options: header_value(headers, "x-content-type-options"),
        referrer_policy: header_value(headers, "referrer-policy"),
    }
}

fn analyze_cookies(cookies: &[String]) -> CookieStats {
    let count = |flag: &str| cookies.iter().filter(|c| c.contains(flag)).count();

    let total = cookies.len();
    let secure = count("Secure");
    let http_only = count("HttpOnly");
    let same_site = count("SameSite");

    CookieStats {
        total,
        secure,
        http_only,
        same_site,
        score: cookie_score(total, secure, http_only, same_site),
    }
}
