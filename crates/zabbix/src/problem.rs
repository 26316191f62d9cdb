/// Severity of a trigger event, ordered from least to most critical.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::Display,
    strum::IntoStaticStr,
)]
pub enum Severity {
    #[strum(serialize = "Not classified")]
    NotClassified,
    Information,
    Warning,
    Average,
    High,
    Disaster,
}

impl Severity {
    /// Map a wire code "0" through "5" into its Severity.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "0" => Severity::NotClassified,
            "1" => Severity::Information,
            "2" => Severity::Warning,
            "3" => Severity::Average,
            "4" => Severity::High,
            "5" => Severity::Disaster,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

/// Problem is a single row of `event.get` or `problem.get` output.
/// Only the fields used for reporting are modeled, and all of them are optional.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Problem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eventid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Severity code, which is sent as a string but tolerated as a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<Host>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Host {
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    pub tag: String,
    #[serde(default)]
    pub value: String,
}

impl Problem {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Severity of the Problem. A missing code is "0" (not classified);
    /// codes outside of "0" through "5" have no Severity.
    pub fn severity(&self) -> Option<Severity> {
        match &self.severity {
            None => Some(Severity::NotClassified),
            Some(serde_json::Value::String(code)) => Severity::from_code(code),
            Some(serde_json::Value::Number(code)) => Severity::from_code(&code.to_string()),
            Some(_) => None,
        }
    }

    /// Technical name of the first host of the Problem, if any.
    pub fn first_host(&self) -> Option<&str> {
        self.hosts.first().and_then(|h| h.host.as_deref())
    }
}
