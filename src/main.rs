use std::process;

use clap::Parser;

use arbor::cli::{Cli, Commands};
use arbor::commands::{
    self, FlowContext, FlowOutcome, first_run_setup, report_error, run_menu, run_settings,
};
use arbor::config::Config;
use arbor::git::GitCli;
use arbor::hooks::DevHooks;
use arbor::prompt::TermPrompter;
use arbor::styling::{eprintln, error_message, muted, println};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if which::which("git").is_err() {
        eprintln!(
            "{}",
            error_message("git is not installed. Please install git and try again.")
        );
        process::exit(1);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            process::exit(1);
        }
    };

    match run(cli, config) {
        Ok(FlowOutcome::Completed) => {}
        Ok(FlowOutcome::Cancelled) => {
            println!("{}", muted("Cancelled."));
        }
        Err(e) => {
            report_error(&e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli, mut config: Config) -> anyhow::Result<FlowOutcome> {
    let vcs = GitCli::new();
    let hooks = DevHooks::new();
    let mut prompter = TermPrompter::new();

    let Some(command) = cli.command else {
        println!();
        println!("{}", arbor::styling::banner());
        first_run_setup(&mut config, &mut prompter)?;
        run_menu(&mut config, &vcs, &hooks, &mut prompter)?;
        return Ok(FlowOutcome::Completed);
    };

    if let Commands::Settings = command {
        return run_settings(&mut config, &mut prompter);
    }

    let mut ctx = FlowContext {
        config: &config,
        vcs: &vcs,
        hooks: &hooks,
        prompter: &mut prompter,
    };
    match command {
        Commands::New { name } => commands::run_new(&mut ctx, name.as_deref()),
        Commands::Ls => commands::run_list(&mut ctx),
        Commands::Rm => commands::run_remove(&mut ctx),
        Commands::Clear => commands::run_clear(&mut ctx),
        Commands::Settings => unreachable!(),
    }
}
