//! Session and CSRF cookie assembly.
//!
//! The session cookie carries the opaque token key. Attributes come from
//! [`SessionConfig`](crate::config::SessionConfig) so deployments behind
//! plain HTTP (development) can drop the `Secure` flag.

use crate::config::Config;

/// Name of the CSRF cookie. Script-readable, so no HttpOnly flag.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// CSRF cookie lifetime in seconds (roughly a year).
const CSRF_COOKIE_MAX_AGE: u64 = 31_449_600;

/// Build the Set-Cookie value that stores the token key.
pub fn session_cookie(key: &str, config: &Config) -> String {
    let session = &config.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session.cookie_name,
        key,
        session.cookie_same_site,
        session.timeout.as_secs()
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that expires the session cookie.
pub fn clear_session_cookie(config: &Config) -> String {
    let session = &config.session;
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        session.cookie_name, session.cookie_same_site
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value for the CSRF token.
///
/// Cross-site frontends read this cookie from script and echo it back in a
/// header, so it must not be HttpOnly.
pub fn csrf_cookie(token: &str, config: &Config) -> String {
    let session = &config.session;
    let mut cookie = format!(
        "{}={}; Path=/; SameSite={}; Max-Age={}",
        CSRF_COOKIE_NAME, token, session.cookie_same_site, CSRF_COOKIE_MAX_AGE
    );
    if session.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = Config::default();
        let cookie = session_cookie("abc123", &config);

        assert!(cookie.starts_with("auth_token=abc123; "));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_insecure_config_drops_secure_flag() {
        let mut config = Config::default();
        config.session.cookie_secure = false;

        assert!(!session_cookie("abc123", &config).contains("Secure"));
        assert!(!clear_session_cookie(&config).contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let config = Config::default();
        let cookie = clear_session_cookie(&config);

        assert!(cookie.starts_with("auth_token=; "));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_csrf_cookie_is_script_readable() {
        let config = Config::default();
        let cookie = csrf_cookie("tok", &config);

        assert!(cookie.starts_with("csrftoken=tok; "));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
    }
}
