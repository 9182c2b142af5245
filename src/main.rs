use job_pruner::cli::{self, Args};
use job_pruner::{Environment, logging};

fn main() {
    let args: Args = argh::from_env();
    let result = cli::load_config(&args).and_then(|config| {
        logging::init_logging(&config.logging)?;
        cli::run(args, config, Environment::new(), &mut std::io::stdout().lock())
    });
    std::process::exit(cli::exit_code(result, &mut std::io::stderr()));
}
