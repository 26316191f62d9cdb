/// Category of a problem in the weekly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum Category {
    #[strum(serialize = "PC/Agent Issues")]
    AgentIssues,
    #[strum(serialize = "Login Events")]
    LoginEvents,
    #[strum(serialize = "Login Failures")]
    LoginFailures,
    #[strum(serialize = "Long Sessions")]
    LongSessions,
    #[strum(serialize = "Disk Space")]
    DiskSpace,
    #[strum(serialize = "Resource Usage")]
    ResourceUsage,
    #[strum(serialize = "Network")]
    Network,
    #[strum(serialize = "System Updates")]
    SystemUpdates,
    #[strum(serialize = "File Integrity")]
    FileIntegrity,
    #[strum(serialize = "Other/Uncategorized")]
    Other,
}

// These keywords are matched against historical problem names, and are tuned
// separately from the subject phrases used to route live alerts.
// Lists are tested in order and the first list with a matching keyword wins.
const KEYWORDS: [(Category, &[&str]); 9] = [
    (
        Category::AgentIssues,
        &[
            "not available",
            "unreachable",
            "timeout",
            "agent down",
            "connection lost",
            "no data",
        ],
    ),
    (
        Category::LoginEvents,
        &[
            "ssh login:",
            "accepted password",
            "logout",
            "session opened",
            "session closed",
            "login:",
        ],
    ),
    (
        Category::LoginFailures,
        &[
            "failed password",
            "authentication failure",
            "ssh login failed",
            "fail2ban found",
            "invalid user",
            "failed login",
        ],
    ),
    (
        Category::LongSessions,
        &["logged in over", "long session", "session duration"],
    ),
    (
        Category::DiskSpace,
        &[
            "space is low",
            "free inodes",
            "read-only",
            "disk space",
            "filesystem",
            "volume full",
        ],
    ),
    (
        Category::ResourceUsage,
        &[
            "high cpu",
            "memory utilization",
            "swap",
            "process limit",
            "load average",
            "cpu load",
            "ram usage",
        ],
    ),
    (
        Category::Network,
        &[
            "bandwidth",
            "error rate",
            "lower speed",
            "interface",
            "link down",
            "packet loss",
            "network",
        ],
    ),
    (
        Category::SystemUpdates,
        &[
            "package installed",
            "package removed",
            "package updated",
            "update available",
            "patch",
        ],
    ),
    (
        Category::FileIntegrity,
        &[
            "file integrity",
            "checksum",
            "/etc/passwd",
            "file changed",
            "permission changed",
        ],
    ),
];

/// Categorize a problem by its name.
pub fn categorize(name: &str) -> Category {
    let name = name.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| name.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}
