//! Auth cookie construction, mirroring the source's cookie attributes
//! exactly: `domain` is set only when `COOKIE_DOMAIN` is configured to
//! something other than `localhost`/empty, and the refresh cookie always
//! carries the restricted path `/api/v1/auth/refresh`, both when set and
//! when cleared.

use crate::config::Config;

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

fn base_attributes(config: &Config, path: &str) -> String {
    let mut attrs = format!("Path={path}; HttpOnly; SameSite=Strict");
    if let Some(domain) = &config.cookie_domain {
        attrs.push_str(&format!("; Domain={domain}"));
    }
    if config.cookie_secure {
        attrs.push_str("; Secure");
    }
    attrs
}

pub fn set_access_cookie(config: &Config, token: &str, max_age_secs: i64) -> String {
    format!(
        "{ACCESS_COOKIE_NAME}={token}; Max-Age={max_age_secs}; {}",
        base_attributes(config, "/")
    )
}

pub fn set_refresh_cookie(config: &Config, token: &str, max_age_secs: i64) -> String {
    format!(
        "{REFRESH_COOKIE_NAME}={token}; Max-Age={max_age_secs}; {}",
        base_attributes(config, REFRESH_COOKIE_PATH)
    )
}

pub fn clear_access_cookie(config: &Config) -> String {
    format!(
        "{ACCESS_COOKIE_NAME}=; Max-Age=0; {}",
        base_attributes(config, "/")
    )
}

pub fn clear_refresh_cookie(config: &Config) -> String {
    format!(
        "{REFRESH_COOKIE_NAME}=; Max-Age=0; {}",
        base_attributes(config, REFRESH_COOKIE_PATH)
    )
}

/// Parses a single cookie value out of a raw `Cookie` header.
pub fn read_cookie(cookie_header: Option<&str>, name: &str) -> Option<String> {
    let header = cookie_header?;
    header.split(';').find_map(|part| {
        let part = part.trim();
        let (k, v) = part.split_once('=')?;
        if k == name {
            Some(v.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_domain(domain: Option<&str>, secure: bool) -> Config {
        let mut config = Config::from_env();
        config.cookie_domain = domain.map(|d| d.to_string());
        config.cookie_secure = secure;
        config
    }

    #[test]
    fn omits_domain_when_unset() {
        let config = config_with_domain(None, false);
        let cookie = set_access_cookie(&config, "tok", 900);
        assert!(!cookie.contains("Domain="));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn includes_domain_when_configured() {
        let config = config_with_domain(Some("example.com"), true);
        let cookie = set_refresh_cookie(&config, "tok", 604_800);
        assert!(cookie.contains("Domain=example.com"));
        assert!(cookie.contains("Path=/api/v1/auth/refresh"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn parses_cookie_header() {
        let header = "access_token=abc123; refresh_token=def456";
        assert_eq!(
            read_cookie(Some(header), "refresh_token"),
            Some("def456".to_string())
        );
        assert_eq!(read_cookie(Some(header), "missing"), None);
    }
}
