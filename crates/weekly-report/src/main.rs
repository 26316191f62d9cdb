use clap::Parser;

fn main() {
    let args = weekly_report::Args::parse();
    alert_cli_common::init_logging(&args.log);

    alert_cli_common::run_cli_main(args, weekly_report::run);
}
