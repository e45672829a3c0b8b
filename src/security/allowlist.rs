//! Source URL allowlist.
//!
//! # Responsibilities
//! - Decide whether a caller-supplied copy source may be fetched
//!
//! # Design Decisions
//! - Pure predicate over hostname and path; no DNS, no redirect inspection
//! - Fixed rule set compiled into the binary, never configured at runtime
//! - Suffix rules match on a label boundary: `a.example.com` matches
//!   `example.com`, `badexample.com` does not

use url::Url;

/// Takeout downloads are served from this domain.
const TAKEOUT_DOMAIN: &str = "apidata.googleusercontent.com";

/// Storage download API prefixes reserved for takeout exports.
const TAKEOUT_PATH_PREFIXES: &[&str] = &[
    "/download/storage/v1/b/dataliberation/o/",
    "/download/storage/v1/b/takeout",
];

/// Test servers and mirrors, matched as the host itself or any subdomain.
const TEST_SERVER_DOMAINS: &[&str] = &[
    "gtr-test.677472.xyz",
    "3vngqvvpoq-uc.a.run.app",
    "releases.ubuntu.com",
];

/// Mirrors matched by exact hostname only.
const TEST_SERVER_HOSTS: &[&str] = &["mirrors.advancedhosters.com"];

/// Returns true if the source URL may be fetched by the relay.
pub fn is_allowed(url: &Url) -> bool {
    is_takeout_url(url) || is_test_server_url(url)
}

/// A takeout export download on the storage API.
pub fn is_takeout_url(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    host_within(host, TAKEOUT_DOMAIN)
        && TAKEOUT_PATH_PREFIXES
            .iter()
            .any(|prefix| url.path().starts_with(prefix))
}

/// One of the known test servers or mirrors.
pub fn is_test_server_url(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    TEST_SERVER_HOSTS.contains(&host)
        || TEST_SERVER_DOMAINS
            .iter()
            .any(|domain| host_within(host, domain))
}

fn host_within(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|rest| rest.ends_with('.'))
}
