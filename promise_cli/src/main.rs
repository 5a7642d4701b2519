// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
mod host_hooks;
mod scenarios;

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use host_hooks::CliHostHooks;
use promise_vm::ecmascript::execution::{Agent, Options};
use scenarios::Scenario;

/// A host for promise_vm
#[derive(Debug, ClapParser)] // requires `derive` feature
#[command(name = "promise")]
#[command(about = "Runs promise scenarios on a microtask queue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a scenario and drains the microtask queue
    Run {
        #[arg(short, long)]
        verbose: bool,
        #[arg(short, long)]
        nogc: bool,

        /// Length of the generated chains
        #[arg(short, long, default_value_t = 3)]
        depth: u32,

        /// The scenario to run
        #[arg(value_enum)]
        scenario: Scenario,
    },

    /// Lists the available scenarios
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    match args.command {
        Command::Run {
            verbose,
            nogc,
            depth,
            scenario,
        } => {
            let level = if verbose { "debug" } else { "info" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .format_timestamp(None)
                .try_init()?;

            let host_hooks: &CliHostHooks = &*Box::leak(Box::default());
            let mut agent = Agent::new(
                Options {
                    disable_gc: nogc,
                    ..Default::default()
                },
                host_hooks,
            );
            let realm = agent.create_realm();
            log::info!("Running {scenario:?} with depth {depth}");
            let result = agent.run_in_realm(realm, |agent| scenario.run(agent, host_hooks, depth));
            if let Err(error) = result {
                eprintln!("Uncaught exception: {}", error.to_string(&agent));
                std::process::exit(1);
            }

            let unhandled = host_hooks.take_unhandled_rejections(&agent);
            if !unhandled.is_empty() {
                for reason in unhandled {
                    eprintln!("Unhandled promise rejection: {reason}");
                }
                std::process::exit(1);
            }
        }
        Command::List => {
            for scenario in Scenario::value_variants() {
                if let Some(value) = scenario.to_possible_value() {
                    println!(
                        "{:<22}{}",
                        value.get_name(),
                        value.get_help().map(ToString::to_string).unwrap_or_default()
                    );
                }
            }
        }
    }
    Ok(())
}
