//! Contains helpers and things that are used by both alerting executables.
mod logging;

pub use logging::{init_logging, LogArgs, LogFormat, LogLevel};

/// Exit code for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit code when the outbound message could not be delivered.
pub const EXIT_SEND_FAILED: i32 = 1;
/// Exit code for usage or configuration errors.
pub const EXIT_USAGE: i32 = 2;

/// A return type indicating that a function cannot return.
pub enum Never {}

/// Executes the given `run_fn` and exits the process with the resulting code.
/// This function will never return, so a typical `fn main` will have this as the last
/// line. Argument parsing is left up to the caller.
/// The `run_fn` can be any function or closure that returns a Result having a `Ok` that can be
/// converted into a `Success`. Returning an `Err` will cause the error to be logged and the
/// application will exit with a code of `1`. Note that it's intentionally allowed for a function
/// to return `Success::Exit` with a non-zero code, in cases where the caller wishes to opt out
/// of the default error handling.
pub fn run_cli_main<A, S, F>(args: A, run_fn: F) -> Never
where
    F: FnOnce(A) -> Result<S, anyhow::Error>,
    S: Into<Success>,
{
    let code = exit_code(run_fn(args).map(Into::<Success>::into));
    std::process::exit(code);
}

fn exit_code(result: Result<Success, anyhow::Error>) -> i32 {
    match result {
        Ok(Success::Exit(code)) => code,
        Err(error) => {
            let error = format!("{error:#}");
            tracing::error!(%error, "execution failed");
            EXIT_SEND_FAILED
        }
    }
}

/// Represents the completed execution of a program.
#[derive(Debug, PartialEq)]
pub enum Success {
    /// Program should immediately exit with the given code.
    Exit(i32),
}

impl From<()> for Success {
    fn from(_: ()) -> Self {
        Success::Exit(EXIT_OK)
    }
}

impl From<i32> for Success {
    fn from(code: i32) -> Self {
        Success::Exit(code)
    }
}

impl From<bool> for Success {
    fn from(delivered: bool) -> Self {
        Success::Exit(if delivered {
            EXIT_OK
        } else {
            EXIT_SEND_FAILED
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successes_map_to_exit_codes() {
        assert_eq!(exit_code(Ok(().into())), 0);
        assert_eq!(exit_code(Ok(true.into())), 0);
        assert_eq!(exit_code(Ok(false.into())), 1);
        assert_eq!(exit_code(Ok(EXIT_USAGE.into())), 2);
    }

    #[test]
    fn errors_exit_with_one() {
        assert_eq!(exit_code(Err(anyhow::anyhow!("boom"))), 1);
    }
}
