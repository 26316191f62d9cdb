use crate::{WeeklyStats, TOP_HOSTS};
use anyhow::Context;
use chrono::{DateTime, Duration, Local};
use matrix::RoomMessage;
use std::fmt::Write;

const REPORT_HTML: &str = "report-html";
const NO_PROBLEMS: &str = "No problems detected in the last 7 days.";

/// Window is the reporting period, ending at the time of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl Window {
    pub fn last_week(now: DateTime<Local>) -> Self {
        Self {
            start: now - Duration::days(7),
            end: now,
        }
    }
}

/// Renderer formats weekly stats into a room message.
pub struct Renderer<'a> {
    reg: handlebars::Handlebars<'a>,
}

#[derive(serde::Serialize)]
struct TemplateData {
    period_start: String,
    period_end: String,
    generated: String,
    total: usize,
    has_problems: bool,
    categories: Vec<String>,
    severities: Vec<String>,
    hosts: Vec<String>,
    top_hosts: usize,
}

// Each `{{this}}` is a pre-formatted, column aligned line which handlebars
// escapes when interpolating.
const TEMPLATE: &str = r#"<h2>ZABBIX WEEKLY REPORT</h2>
<p><strong>Period:</strong> {{period_start}} to {{period_end}}<br>
<strong>Generated:</strong> {{generated}}</p>

<h3>SUMMARY</h3>
<p><strong>Total Problems:</strong> {{total}}</p>

<h3>BY CATEGORY</h3>
<pre>{{#if has_problems}}{{#each categories}}{{this}}
{{/each}}</pre>
<h3>BY SEVERITY</h3>
<pre>{{#each severities}}{{this}}
{{/each}}{{#if hosts}}</pre>
<h3>TOP {{top_hosts}} HOSTS</h3>
<pre>{{#each hosts}}{{this}}
{{/each}}{{/if}}{{else}}No problems detected in the last 7 days.{{/if}}</pre><hr><p><small>Report generated automatically by Zabbix Weekly Report Script</small></p>"#;

fn count_line(label: &str, count: usize) -> String {
    format!("{label:<25} {count:>5}")
}

fn host_line(host: &str, count: usize) -> String {
    format!("{host:<30} {count:>5}")
}

impl Renderer<'_> {
    pub fn try_new() -> anyhow::Result<Self> {
        let mut reg = handlebars::Handlebars::new();
        reg.set_strict_mode(true);
        reg.register_template_string(REPORT_HTML, TEMPLATE)
            .context("registering report-html template")?;

        Ok(Self { reg })
    }

    /// Render `stats` of the reporting `window`.
    pub fn render(&self, stats: &WeeklyStats, window: &Window) -> anyhow::Result<RoomMessage> {
        let data = TemplateData {
            period_start: window.start.format("%Y-%m-%d").to_string(),
            period_end: window.end.format("%Y-%m-%d").to_string(),
            generated: window.end.format("%Y-%m-%d %H:%M:%S").to_string(),
            total: stats.total,
            has_problems: stats.total != 0,
            categories: stats
                .categories()
                .into_iter()
                .map(|(category, count)| count_line(&category.to_string(), count))
                .collect(),
            severities: stats
                .severities()
                .into_iter()
                .map(|(severity, count)| count_line(severity.label(), count))
                .collect(),
            hosts: stats
                .top_hosts()
                .into_iter()
                .map(|(host, count)| host_line(host, count))
                .collect(),
            top_hosts: TOP_HOSTS,
        };

        let formatted_body = self
            .reg
            .render(REPORT_HTML, &data)
            .context("rendering report-html template")?;

        Ok(RoomMessage::html(plain_body(&data), formatted_body))
    }
}

fn plain_body(data: &TemplateData) -> String {
    let mut w = String::new();

    // Writes into a String are infallible.
    let _ = write!(
        w,
        "ZABBIX WEEKLY REPORT\n\
         ====================\n\
         Period: {} to {}\n\
         Generated: {}\n\
         \n\
         SUMMARY\n\
         -------\n\
         Total Problems: {}\n\
         \n\
         BY CATEGORY\n\
         -----------",
        data.period_start, data.period_end, data.generated, data.total,
    );

    if !data.has_problems {
        let _ = write!(w, "\n{NO_PROBLEMS}");
    } else {
        for line in &data.categories {
            let _ = write!(w, "\n{line}");
        }
        w.push_str("\n\nBY SEVERITY\n-----------");
        for line in &data.severities {
            let _ = write!(w, "\n{line}");
        }
        if !data.hosts.is_empty() {
            let _ = write!(w, "\n\nTOP {} HOSTS\n------------", data.top_hosts);
            for line in &data.hosts {
                let _ = write!(w, "\n{line}");
            }
        }
    }

    let _ = write!(w, "\n\n{}\nEnd of Report", "=".repeat(50));
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use zabbix::Problem;

    fn window() -> Window {
        Window::last_week(Local.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap())
    }

    fn problem(name: &str, severity: &str, host: Option<&str>) -> Problem {
        let mut value = json!({"name": name, "severity": severity});
        if let Some(host) = host {
            value["hosts"] = json!([{ "host": host }]);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn window_spans_the_last_seven_days() {
        let window = window();
        assert_eq!(
            window.start,
            Local.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap()
        );
        assert_eq!((window.end - window.start).num_days(), 7);
    }

    #[test]
    fn empty_week_is_reported() {
        let message = Renderer::try_new()
            .unwrap()
            .render(&WeeklyStats::default(), &window())
            .unwrap();

        assert_eq!(
            message.body,
            "ZABBIX WEEKLY REPORT\n\
             ====================\n\
             Period: 2024-03-02 to 2024-03-09\n\
             Generated: 2024-03-09 08:30:00\n\
             \n\
             SUMMARY\n\
             -------\n\
             Total Problems: 0\n\
             \n\
             BY CATEGORY\n\
             -----------\n\
             No problems detected in the last 7 days.\n\
             \n\
             ==================================================\n\
             End of Report"
        );
        assert_eq!(
            message.formatted_body,
            "<h2>ZABBIX WEEKLY REPORT</h2>\n\
             <p><strong>Period:</strong> 2024-03-02 to 2024-03-09<br>\n\
             <strong>Generated:</strong> 2024-03-09 08:30:00</p>\n\
             \n\
             <h3>SUMMARY</h3>\n\
             <p><strong>Total Problems:</strong> 0</p>\n\
             \n\
             <h3>BY CATEGORY</h3>\n\
             <pre>No problems detected in the last 7 days.</pre>\
             <hr><p><small>Report generated automatically by Zabbix Weekly Report Script</small></p>"
        );
        assert!(!message.body.contains("BY SEVERITY"));
        assert!(!message.formatted_body.contains("BY SEVERITY"));
    }

    #[test]
    fn week_with_problems_is_reported() {
        let problems = vec![
            problem("Interface eth0: Link down", "4", Some("gw-01")),
            problem("/: Disk space is low", "2", Some("db-01")),
            problem("Interface eth1: Link down", "3", Some("gw-01")),
            problem("Certificate expires", "0", None),
        ];
        let stats = WeeklyStats::from_problems(&problems);
        let message = Renderer::try_new().unwrap().render(&stats, &window()).unwrap();

        let plain = message.body.split_once("Total Problems: 4\n").unwrap().1;
        assert_eq!(
            plain,
            "\n\
             BY CATEGORY\n\
             -----------\n\
             Network                       2\n\
             Disk Space                    1\n\
             Other/Uncategorized           1\n\
             \n\
             BY SEVERITY\n\
             -----------\n\
             Not classified                1\n\
             Warning                       1\n\
             Average                       1\n\
             High                          1\n\
             \n\
             TOP 10 HOSTS\n\
             ------------\n\
             gw-01                              2\n\
             db-01                              1\n\
             \n\
             ==================================================\n\
             End of Report"
        );

        let html = message
            .formatted_body
            .split_once("<h3>BY CATEGORY</h3>\n")
            .unwrap()
            .1;
        assert_eq!(
            html,
            "<pre>Network                       2\n\
             Disk Space                    1\n\
             Other/Uncategorized           1\n\
             </pre>\n\
             <h3>BY SEVERITY</h3>\n\
             <pre>Not classified                1\n\
             Warning                       1\n\
             Average                       1\n\
             High                          1\n\
             </pre>\n\
             <h3>TOP 10 HOSTS</h3>\n\
             <pre>gw-01                              2\n\
             db-01                              1\n\
             </pre><hr><p><small>Report generated automatically by Zabbix Weekly Report Script</small></p>"
        );
    }

    #[test]
    fn host_section_requires_a_host() {
        let problems = vec![problem("High CPU utilization", "3", None)];
        let stats = WeeklyStats::from_problems(&problems);
        let message = Renderer::try_new().unwrap().render(&stats, &window()).unwrap();

        assert!(message.body.contains("BY SEVERITY"));
        assert!(!message.body.contains("TOP 10 HOSTS"));
        assert!(!message.formatted_body.contains("TOP 10 HOSTS"));
        assert!(message
            .formatted_body
            .ends_with("Average                       1\n</pre><hr><p><small>Report generated automatically by Zabbix Weekly Report Script</small></p>"));
    }

    #[test]
    fn markup_in_host_names_is_escaped() {
        let problems = vec![problem("x", "1", Some("<b>web</b> & co"))];
        let stats = WeeklyStats::from_problems(&problems);
        let message = Renderer::try_new().unwrap().render(&stats, &window()).unwrap();

        assert!(message
            .formatted_body
            .contains("&lt;b&gt;web&lt;/b&gt; &amp; co"));
        assert!(!message.formatted_body.contains("<b>web"));
        assert!(message.body.contains("<b>web</b> & co"));
    }
}
