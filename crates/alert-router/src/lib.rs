//! Routes Zabbix alerts to Matrix rooms. A `route` trigger tag selects the room
//! directly; otherwise the alert subject is classified into a route.
mod classify;
mod render;

pub use classify::{classify_subject, route_tag, Route};
pub use render::Renderer;

use alert_cli_common::{LogArgs, Success, EXIT_USAGE};
use anyhow::Context;
use chrono::{DateTime, Local};
use matrix::{MessageSender, RoomMapping};
use std::path::PathBuf;
use std::time::Duration;

/// Requests to the homeserver fail after this long.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

const USAGE: &str = "matrix-smart [OPTIONS] <to> <tags> <subject> <message>\n       \
                     matrix-smart [OPTIONS] <to> <subject> <message>";

/// Sends a Zabbix alert to the Matrix room selected by its route tag or subject.
#[derive(Debug, clap::Parser)]
#[clap(override_usage = USAGE)]
pub struct Args {
    /// Path to the INI file holding the homeserver, token and room mapping.
    #[clap(long, env = "MATRIX_INI", default_value = matrix::DEFAULT_PATH)]
    pub matrix_config: PathBuf,
    /// Log the message which would be sent, instead of sending it.
    #[clap(long)]
    pub dry_run: bool,
    #[clap(flatten)]
    pub log: LogArgs,
    /// Alert parameters as passed by the Zabbix media type.
    #[clap(value_name = "PARAMS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub params: Vec<String>,
}

/// Alert is a single Zabbix alert to deliver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alert {
    /// Flat tag string of the event, like "route:disk_space, env:prod".
    pub tags: String,
    pub subject: String,
    pub message: String,
}

impl Alert {
    /// Build an Alert from `<to> <tags> <subject> <message>` or, for older media
    /// types, `<to> <subject> <message>`. The recipient is not used for routing,
    /// and parameters past the fourth are ignored.
    pub fn from_params(params: &[String]) -> Option<Self> {
        match params {
            [_to, tags, subject, message, ..] => Some(Alert {
                tags: tags.clone(),
                subject: subject.clone(),
                message: message.clone(),
            }),
            [_to, subject, message] => Some(Alert {
                tags: String::new(),
                subject: subject.clone(),
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

/// Determine the room of `alert`. A route tag takes precedence over the subject.
/// Returns None only if neither the selected route nor `default` has a room.
pub fn determine_room<'r>(rooms: &'r RoomMapping, alert: &Alert) -> Option<&'r str> {
    if let Some(room) = route_tag(&alert.tags).and_then(|key| rooms.resolve(&key)) {
        return Some(room);
    }
    rooms.resolve(classify_subject(&alert.subject).as_ref())
}

/// Route and send `alert`, returning whether it was delivered.
/// Delivery failures are logged and never retried.
pub async fn send_alert<S: MessageSender>(
    sender: &S,
    renderer: &Renderer<'_>,
    rooms: &RoomMapping,
    alert: &Alert,
    now: DateTime<Local>,
) -> anyhow::Result<bool> {
    let Some(room_id) = determine_room(rooms, alert) else {
        tracing::error!(subject = %alert.subject, "No room mapping (missing 'default' in INI?)");
        return Ok(false);
    };
    let message = renderer.render(alert, now)?;

    match sender.send(room_id, &message).await {
        Ok(()) => {
            tracing::info!(route = %room_id, "ok");
            Ok(true)
        }
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::error!(route = %room_id, error = %format!("{error:#}"), "sending alert failed");
            Ok(false)
        }
    }
}

/// Run the router, returning the process exit code.
pub fn run(args: Args) -> anyhow::Result<Success> {
    let Some(alert) = Alert::from_params(&args.params) else {
        tracing::error!(got = args.params.len(), "usage: {USAGE}");
        return Ok(EXIT_USAGE.into());
    };

    let settings = match matrix::Settings::load(&args.matrix_config) {
        Ok(settings) => settings,
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::error!(error = %format!("{error:#}"), "loading Matrix settings failed");
            return Ok(EXIT_USAGE.into());
        }
    };
    tracing::debug!(default = ?settings.rooms.default_room(), tags = %alert.tags, "loaded Matrix settings");

    let sender = if args.dry_run {
        matrix::Sender::Disabled
    } else {
        matrix::Sender::Matrix(
            matrix::Client::from_settings(&settings, SEND_TIMEOUT)
                .context("building Matrix client")?,
        )
    };
    let renderer = Renderer::try_new()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    let delivered = runtime.block_on(send_alert(
        &sender,
        &renderer,
        &settings.rooms,
        &alert,
        Local::now(),
    ))?;

    Ok(delivered.into())
}
