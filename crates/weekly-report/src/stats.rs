use crate::{categorize, Category, Window};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::future::Future;
use zabbix::{Problem, Severity};

/// Number of hosts listed in the report.
pub const TOP_HOSTS: usize = 10;

/// ProblemSource is a queryable history of monitoring problems.
pub trait ProblemSource {
    /// Events with a clock within `[time_from, time_till]`, in unix seconds.
    fn recent_events(
        &self,
        time_from: i64,
        time_till: i64,
    ) -> impl Future<Output = Result<Vec<Problem>, zabbix::Error>>;

    /// Currently open and recently resolved problems.
    fn current_problems(&self) -> impl Future<Output = Result<Vec<Problem>, zabbix::Error>>;
}

impl ProblemSource for zabbix::Client {
    async fn recent_events(
        &self,
        time_from: i64,
        time_till: i64,
    ) -> Result<Vec<Problem>, zabbix::Error> {
        zabbix::Client::recent_events(self, time_from, time_till).await
    }

    async fn current_problems(&self) -> Result<Vec<Problem>, zabbix::Error> {
        zabbix::Client::current_problems(self).await
    }
}

/// Fetch the problems of `window`. Events of the window are preferred, and
/// current problems are used if there are none. Failed queries count as empty.
pub async fn fetch_problems<S: ProblemSource>(source: &S, window: &Window) -> Vec<Problem> {
    let events = match source
        .recent_events(window.start.timestamp(), window.end.timestamp())
        .await
    {
        Ok(events) => events,
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::warn!(error = %format!("{error:#}"), "fetching recent events failed");
            Vec::new()
        }
    };

    if !events.is_empty() {
        tracing::info!(count = events.len(), "fetched recent events");
        return events;
    }
    tracing::info!("no recent events, falling back to current problems");

    match source.current_problems().await {
        Ok(problems) => {
            tracing::info!(count = problems.len(), "fetched current problems");
            problems
        }
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::warn!(error = %format!("{error:#}"), "fetching current problems failed");
            Vec::new()
        }
    }
}

/// WeeklyStats tallies problems by category, severity, and host.
/// Category and host tallies are kept in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyStats {
    pub total: usize,
    pub by_category: IndexMap<Category, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_host: IndexMap<String, usize>,
}

impl WeeklyStats {
    pub fn from_problems<'p>(problems: impl IntoIterator<Item = &'p Problem>) -> Self {
        let mut stats = WeeklyStats::default();

        for problem in problems {
            stats.total += 1;
            *stats
                .by_category
                .entry(categorize(problem.name()))
                .or_default() += 1;

            // Unknown severity codes aren't tallied.
            if let Some(severity) = problem.severity() {
                *stats.by_severity.entry(severity).or_default() += 1;
            }
            if let Some(host) = problem.first_host() {
                *stats.by_host.entry(host.to_string()).or_default() += 1;
            }
        }
        stats
    }

    /// Categories by descending count. Ties keep their order of first appearance.
    pub fn categories(&self) -> Vec<(Category, usize)> {
        let mut categories: Vec<_> = self.by_category.iter().map(|(c, n)| (*c, *n)).collect();
        categories.sort_by(|l, r| r.1.cmp(&l.1));
        categories
    }

    /// Severities having a non-zero count, from least to most critical.
    pub fn severities(&self) -> Vec<(Severity, usize)> {
        self.by_severity
            .iter()
            .filter(|(_, n)| **n != 0)
            .map(|(s, n)| (*s, *n))
            .collect()
    }

    /// The TOP_HOSTS hosts having the most problems.
    pub fn top_hosts(&self) -> Vec<(&str, usize)> {
        let mut hosts: Vec<_> = self
            .by_host
            .iter()
            .map(|(h, n)| (h.as_str(), *n))
            .collect();
        hosts.sort_by(|l, r| r.1.cmp(&l.1));
        hosts.truncate(TOP_HOSTS);
        hosts
    }
}
