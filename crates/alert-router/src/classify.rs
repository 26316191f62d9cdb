use lazy_static::lazy_static;
use regex::Regex;

/// Route is the category of an alert, and names the room mapping entry it's sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    PcDown,
    LoginFailures,
    LoginEvents,
    LongSessions,
    DiskSpace,
    ResourceUsage,
    NetworkTraffic,
    Updates,
    FileIntegrity,
    Default,
}

lazy_static! {
    // `route` followed by a `:`, `=` or whitespace separator, then the route name.
    static ref ROUTE_TAG_RE: Regex =
        Regex::new(r"(?i)\broute\s*[:=\s]\s*([A-Za-z0-9_]+)").expect("Is a valid regex");
    static ref BAN_RE: Regex = Regex::new(r"\bban\b|\bunban\b").expect("Is a valid regex");
}

/// Extract the lowercase route name of a `route:<name>` or `route=<name>`
/// tag from the flat tag string of an event.
pub fn route_tag(tags: &str) -> Option<String> {
    ROUTE_TAG_RE
        .captures(tags)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_lowercase())
}

/// Classify an alert by its subject. Predicates are evaluated in order and the
/// first match wins, so failed logins must be tested before successful ones.
pub fn classify_subject(subject: &str) -> Route {
    let s = subject.to_lowercase();
    let any = |phrases: &[&str]| phrases.iter().any(|p| s.contains(p));

    if any(&["zabbix agent is not available", "unreachable", "kein netzwerk"]) {
        Route::PcDown
    } else if any(&[
        "ssh failed login",
        "failed login attempt",
        "failed password",
        "authentication failure",
    ]) {
        Route::LoginFailures
    } else if s.contains("fail2ban action") || BAN_RE.is_match(&s) {
        Route::LoginFailures
    } else if any(&["ssh login", "accepted password", "session opened"]) {
        Route::LoginEvents
    } else if any(&["ssh logout", "session closed"]) {
        Route::LoginEvents
    } else if any(&["user logged in over", "user zu lange eingeloggt"]) {
        Route::LongSessions
    } else if any(&[
        "space is low",
        "space is critically low",
        "filesystem has become read-only",
        "free inodes",
    ]) || s.starts_with("mounted filesystem discovery: linux: fs")
        || s.starts_with("linux: fs ")
    {
        Route::DiskSpace
    } else if any(&[
        "cpu utilization",
        "cpu-überlastung",
        "high memory utilization",
        "lack of available memory",
        "high swap space",
        "getting closer to process limit",
        "load average is too high",
    ]) {
        Route::ResourceUsage
    } else if s.contains("interface")
        && any(&[
            "bandwidth",
            "error rate",
            "link down",
            "has changed to lower speed",
        ])
    {
        Route::NetworkTraffic
    } else if any(&[
        "package installed",
        "package removed",
        "system update performed",
        "number of installed packages has been changed",
        "updates installation",
    ]) {
        Route::Updates
    } else if any(&[
        "file security",
        "file integrity",
        "/etc/passwd has been changed",
    ]) {
        Route::FileIntegrity
    } else {
        Route::Default
    }
}
