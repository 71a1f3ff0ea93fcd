//! markup-tour: interactive lessons on parsing HTML and XML

use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use markup_scrape::config::{init_logging, CommonArgs, Settings};
use markup_scrape::menu::Dispatcher;
use markup_scrape::tour::Tour;

#[derive(Parser)]
#[command(
    name = "markup-tour",
    about = "Interactive lessons on parsing HTML and XML",
    version
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::from(cli.common);
    init_logging(&settings.log_level);

    let fetcher = settings.fetcher();
    let stdin = io::stdin();
    let output = BufWriter::new(io::stdout());
    let mut dispatcher =
        Dispatcher::new(stdin.lock(), output, settings.palette()).with_pause(settings.pause);

    match dispatcher.run(&Tour::new(&fetcher)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "could not write to stdout");
            ExitCode::FAILURE
        }
    }
}
