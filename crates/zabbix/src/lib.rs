//! A minimal client of the Zabbix JSON-RPC API, covering the event and problem
//! queries used for activity reports.
mod client;
mod problem;
mod settings;

pub use client::{Client, Error, RpcError, RECENT_EVENTS_LIMIT};
pub use problem::{Host, Problem, Severity, Tag};
pub use settings::{Settings, SettingsError, DEFAULT_PATH};
