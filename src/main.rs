use tinybuild::cli::Cli;
use tinybuild::theme::Theme;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.run() {
        eprintln!("{} {:#}", Theme::error("Error:"), e);
        std::process::exit(1);
    }
}
