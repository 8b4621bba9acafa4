use std::{io::Write, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use client_core::{load_settings, Action, App, InteractionController, NodeId, Outcome, SkipReason};
use shared::domain::{CreatureId, TrainerId};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::{JoinError, JoinSet},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse trainers and manage their rosters")]
struct Args {
    /// Backend base URL, overriding config file and environment.
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file (defaults to ./roster.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the rendered markup once and exit.
    #[arg(long)]
    once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activation {
    Click(NodeId),
    Dispatch(Action),
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Show,
    Tree,
    Activate(Activation),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let number = |what: &str| -> Result<i64> {
        let raw = arg.ok_or_else(|| anyhow!("{head} needs a {what}"))?;
        raw.parse()
            .with_context(|| format!("{raw:?} is not a valid {what}"))
    };

    let command = match head {
        "show" => Command::Show,
        "tree" => Command::Tree,
        "click" => {
            let raw = arg.ok_or_else(|| anyhow!("click needs a node id"))?;
            Command::Activate(Activation::Click(
                raw.parse()
                    .with_context(|| format!("{raw:?} is not a node id"))?,
            ))
        }
        "add" => Command::Activate(Activation::Dispatch(Action::AddCreature {
            trainer_id: TrainerId(number("trainer id")?),
        })),
        "release" => Command::Activate(Activation::Dispatch(Action::ReleaseCreature {
            creature_id: CreatureId(number("creature id")?),
        })),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command {other:?}; try `help`"),
    };
    Ok(Some(command))
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Released { creature_id, .. } => format!("released creature {creature_id}"),
        Outcome::Added {
            trainer_id,
            creature,
            ..
        } => format!("trainer {trainer_id} received {}", creature.label()),
        Outcome::Skipped(SkipReason::NoAction(node)) => format!("node {node} does nothing"),
        Outcome::Skipped(SkipReason::RosterFull { trainer_id, size }) => {
            format!("trainer {trainer_id} already has {size} creatures")
        }
        Outcome::Skipped(SkipReason::UnknownTrainer(trainer_id)) => {
            format!("no card for trainer {trainer_id}")
        }
        Outcome::Skipped(SkipReason::EntryGone(creature_id)) => {
            format!("creature {creature_id} was no longer shown")
        }
        Outcome::Failed(err) => format!("failed: {err}"),
    }
}

const HELP: &str = "commands: show | tree | click <node> | add <trainer_id> | release <creature_id> | quit";

async fn activate(controller: InteractionController, activation: Activation) -> Outcome {
    tracing::debug!(?activation, "activation started");
    match activation {
        Activation::Click(node) => controller.click(node).await,
        Activation::Dispatch(action) => controller.dispatch(action).await,
    }
}

fn print_outcome(out: &mut impl Write, joined: Result<Outcome, JoinError>) -> Result<()> {
    match joined {
        Ok(outcome) => writeln!(out, "{}", describe(&outcome))?,
        Err(err) => tracing::warn!(error = %err, "activation task failed"),
    }
    Ok(())
}

/// Reads commands until `quit` or end of input. Activations run
/// concurrently and report in completion order; any still in flight are
/// awaited before returning.
async fn run(app: &App, input: impl AsyncBufRead + Unpin, out: &mut impl Write) -> Result<()> {
    let mut lines = input.lines();
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                print_outcome(out, joined)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Show)) => writeln!(out, "{}", app.html().await)?,
                    Ok(Some(Command::Tree)) => {
                        for line in app.outline().await {
                            writeln!(out, "{line}")?;
                        }
                    }
                    Ok(Some(Command::Help)) => writeln!(out, "{HELP}")?,
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Activate(activation))) => {
                        in_flight.spawn(activate(app.controller().clone(), activation));
                    }
                    Err(err) => writeln!(out, "{err:#}")?,
                }
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        print_outcome(out, joined)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let app = App::connect(&settings)
        .await
        .context("failed to start trainer roster")?;

    if args.once {
        println!("{}", app.html().await);
        return Ok(());
    }

    println!("{HELP}");
    run(&app, BufReader::new(tokio::io::stdin()), &mut std::io::stdout()).await?;

    tracing::info!("input closed, leaving trainer roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;
    use client_core::{RemoteStore, StoreError};
    use shared::domain::{Creature, Trainer};

    /// Answers every create slowly so the activation is still in flight
    /// when input ends.
    struct SlowStore;

    #[async_trait]
    impl RemoteStore for SlowStore {
        async fn list_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
            Ok(vec![Trainer {
                id: TrainerId(1),
                name: "Ash".into(),
                creatures: Vec::new(),
            }])
        }

        async fn delete_creature(&self, _id: CreatureId) -> Result<(), StoreError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        }

        async fn create_creature(&self, trainer_id: TrainerId) -> Result<Creature, StoreError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Creature {
                id: CreatureId(11),
                nickname: "Squirt".into(),
                species: "Squirtle".into(),
                trainer_id: Some(trainer_id),
            })
        }
    }

    #[tokio::test]
    async fn end_of_input_waits_for_in_flight_activations() {
        let app = App::launch(Arc::new(SlowStore)).await;
        let mut out = Vec::new();

        run(&app, "add 1\n".as_bytes(), &mut out)
            .await
            .expect("run");

        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(printed, "trainer 1 received Squirt (Squirtle)\n");
        assert!(app.html().await.contains("Squirt (Squirtle)"));
    }

    #[tokio::test]
    async fn quit_also_drains_and_reports_bad_lines() {
        let app = App::launch(Arc::new(SlowStore)).await;
        let mut out = Vec::new();

        run(&app, "catch 3\nclick #0\nquit\nadd 1\n".as_bytes(), &mut out)
            .await
            .expect("run");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.starts_with("unknown command \"catch\""));
        assert!(printed.contains("node 0 does nothing"));
        assert!(!printed.contains("received"));
    }

    #[test]
    fn parses_actions_and_node_clicks() {
        assert_eq!(
            parse_command("add 1").expect("parse"),
            Some(Command::Activate(Activation::Dispatch(Action::AddCreature {
                trainer_id: TrainerId(1)
            })))
        );
        assert_eq!(
            parse_command("  release 10 ").expect("parse"),
            Some(Command::Activate(Activation::Dispatch(
                Action::ReleaseCreature {
                    creature_id: CreatureId(10)
                }
            )))
        );
        assert_eq!(
            parse_command("click #5").expect("parse"),
            Some(Command::Activate(Activation::Click(
                "5".parse().expect("node")
            )))
        );
        assert_eq!(parse_command("").expect("parse"), None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("add").is_err());
        assert!(parse_command("release pika").is_err());
        assert!(parse_command("catch 3").is_err());
    }

    #[test]
    fn describes_full_roster() {
        let text = describe(&Outcome::Skipped(SkipReason::RosterFull {
            trainer_id: TrainerId(2),
            size: 6,
        }));
        assert_eq!(text, "trainer 2 already has 6 creatures");
    }
}
