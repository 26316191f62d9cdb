//! Weekly summary of Zabbix problems, posted to a Matrix room.
//!
//! Problems of the last seven days are fetched from the Zabbix API, tallied
//! by category, severity and host, and rendered as a plain and an HTML report.
mod categorize;
mod report;
mod stats;

pub use categorize::{categorize, Category};
pub use report::{Renderer, Window};
pub use stats::{fetch_problems, ProblemSource, WeeklyStats, TOP_HOSTS};

use alert_cli_common::{LogArgs, Success, EXIT_USAGE};
use anyhow::Context;
use chrono::{DateTime, Local};
use matrix::{MessageSender, RoomMapping};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Zabbix API calls fail after this long.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);
/// Requests to the homeserver fail after this long.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Room mapping key of the report room.
pub const REPORT_ROOM: &str = "weekly_reports";

/// Posts a weekly report of Zabbix problems to Matrix.
#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Path to the INI file holding the homeserver, token and room mapping.
    #[clap(long, env = "MATRIX_INI", default_value = matrix::DEFAULT_PATH)]
    pub matrix_config: PathBuf,
    /// Path to the INI file holding the Zabbix API endpoint and token.
    #[clap(long, env = "ZABBIX_API_INI", default_value = zabbix::DEFAULT_PATH)]
    pub zabbix_config: PathBuf,
    /// Log the report which would be sent, instead of sending it.
    #[clap(long)]
    pub dry_run: bool,
    #[clap(flatten)]
    pub log: LogArgs,
}

/// Load the Matrix settings of the reporter. `base_url` and `access_token`
/// win over `MATRIX_SERVER` and `MATRIX_TOKEN` when both are present.
pub fn load_matrix_settings(path: &Path) -> Result<matrix::Settings, matrix::SettingsError> {
    matrix::Settings::load_with(path, matrix::KeyPrecedence::ClientKeys)
}

/// Fetch, tally and render the problems of the week ending at `now`, and send
/// the report to its room. Returns whether the report was delivered.
pub async fn generate_and_send<P, S>(
    source: &P,
    sender: &S,
    renderer: &Renderer<'_>,
    rooms: &RoomMapping,
    now: DateTime<Local>,
) -> anyhow::Result<bool>
where
    P: ProblemSource,
    S: MessageSender,
{
    let window = Window::last_week(now);
    let problems = fetch_problems(source, &window).await;

    let stats = WeeklyStats::from_problems(&problems);
    tracing::info!(
        total = stats.total,
        categories = stats.by_category.len(),
        hosts = stats.by_host.len(),
        "aggregated weekly stats"
    );
    let message = renderer.render(&stats, &window)?;

    let Some(room_id) = rooms.resolve(REPORT_ROOM) else {
        tracing::error!("No room mapping (missing 'default' in INI?)");
        return Ok(false);
    };

    match sender.send(room_id, &message).await {
        Ok(()) => {
            tracing::info!(room = %room_id, "report sent");
            Ok(true)
        }
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::error!(room = %room_id, error = %format!("{error:#}"), "sending report failed");
            Ok(false)
        }
    }
}

/// Run the reporter, returning the process exit code.
pub fn run(args: Args) -> anyhow::Result<Success> {
    tracing::info!("generating weekly report");

    let matrix_settings = match load_matrix_settings(&args.matrix_config) {
        Ok(settings) => settings,
        Err(error) => {
            let error = anyhow::Error::new(error);
            tracing::error!(error = %format!("{error:#}"), "loading Matrix settings failed");
            return Ok(EXIT_USAGE.into());
        }
    };
    let zabbix = match zabbix::Settings::load(&args.zabbix_config)
        .map_err(anyhow::Error::new)
        .and_then(|settings| {
            zabbix::Client::from_settings(&settings, API_TIMEOUT)
                .context("building Zabbix client")
        }) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "loading Zabbix settings failed");
            return Ok(EXIT_USAGE.into());
        }
    };

    let sender = if args.dry_run {
        matrix::Sender::Disabled
    } else {
        matrix::Sender::Matrix(
            matrix::Client::from_settings(&matrix_settings, SEND_TIMEOUT)
                .context("building Matrix client")?,
        )
    };
    let renderer = Renderer::try_new()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    let delivered = runtime.block_on(generate_and_send(
        &zabbix,
        &sender,
        &renderer,
        &matrix_settings.rooms,
        Local::now(),
    ))?;

    if delivered {
        tracing::info!("weekly report finished");
    } else {
        tracing::error!("weekly report was not delivered");
    }
    Ok(delivered.into())
}
