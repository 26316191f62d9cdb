use clap::Parser;

fn main() {
    let args = alert_router::Args::parse();
    alert_cli_common::init_logging(&args.log);

    alert_cli_common::run_cli_main(args, alert_router::run);
}
