use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::{Context, Result};
use serde::Serialize;
use skid_core::{AgentSettings, ControlCommand, DebugMap, DebugSubscriber, Team};
use skid_executor::Agent;
use skid_simulator::{Simulation, SimulationConfig, SimulationEvent};
use tokio::{
    sync::broadcast::{self, error::TryRecvError},
    time::Duration,
};

use super::settings_watch::SettingsWatcher;
use crate::Args;

const FREQ: f64 = 120.0;
const DT: f64 = 1.0 / FREQ;

#[derive(Serialize)]
struct TickRecord<'a> {
    tick: u64,
    time: f64,
    commands: &'a [ControlCommand],
    /// Which cars are running a committed maneuver
    in_maneuver: &'a [bool],
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<DebugMap>,
}

/// Run the agent on both cars of a one-on-one simulation.
pub async fn run(
    args: Args,
    settings: AgentSettings,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let team: Team = args.team.into();
    let teams = [team, team.opponent()];
    let mut simulator = Simulation::new(SimulationConfig::default(), &teams, args.seed);
    let field = simulator.field().clone();
    let mut agents: Vec<Agent> = (0..teams.len())
        .map(|index| Agent::new(index, &field, &settings))
        .collect();

    let mut watcher = SettingsWatcher::new(&args.settings, settings);
    let debug = args.debug_draw.then(DebugSubscriber::install);
    let mut writer = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let mut interval = args
        .realtime
        .then(|| tokio::time::interval(Duration::from_secs_f64(DT)));
    let steps = (args.duration.max(0.0) * FREQ).round() as u64;
    tracing::info!(
        "Simulating {:.1}s as {} (seed {}, realtime: {})",
        args.duration,
        team,
        args.seed,
        args.realtime
    );

    let mut commands = Vec::with_capacity(agents.len());
    let mut in_maneuver = Vec::with_capacity(agents.len());
    for tick in 0..steps {
        if let Some(interval) = interval.as_mut() {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => {}
            }
        } else {
            match shutdown_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }
            if tick % FREQ as u64 == 0 {
                tokio::task::yield_now().await;
            }
        }

        if tick % FREQ as u64 == 0 {
            if let Some(settings) = watcher.poll() {
                tracing::info!("Reloaded settings from {}", args.settings.display());
                for agent in agents.iter_mut() {
                    agent.update_settings(settings);
                }
            }
        }

        let snapshot = simulator.snapshot();
        let prediction = simulator.prediction();

        commands.clear();
        in_maneuver.clear();
        for agent in agents.iter_mut() {
            let cmd = agent.tick(&snapshot, Some(&prediction));
            for chat in agent.quick_chats() {
                tracing::info!(car = agent.index(), "Quick chat: {:?}", chat);
            }
            simulator.push_cmd(agent.index(), cmd);
            commands.push(cmd);
            in_maneuver.push(agent.in_maneuver());
        }

        simulator.step(DT);
        log_events(&teams, simulator.events());

        if let Some(writer) = writer.as_mut() {
            let record = TickRecord {
                tick,
                time: snapshot.game_info.seconds_elapsed,
                commands: &commands,
                in_maneuver: &in_maneuver,
                debug: debug.map(|debug| debug.drain()),
            };
            serde_json::to_writer(&mut *writer, &record).context("Failed to write tick record")?;
            writeln!(writer).context("Failed to write tick record")?;
        }
    }

    if let Some(mut writer) = writer {
        writer.flush().context("Failed to flush output")?;
    }

    tracing::info!(
        "Final score: blue {} - orange {}",
        simulator.score(Team::Blue),
        simulator.score(Team::Orange)
    );
    Ok(())
}

fn log_events(teams: &[Team], events: Vec<SimulationEvent>) {
    for event in events {
        match event {
            SimulationEvent::Kickoff => tracing::info!("Kickoff"),
            SimulationEvent::Goal { team, last_touch } => match last_touch {
                Some(car) => tracing::info!(
                    "Goal for {} (last touch: car {} of {})",
                    team,
                    car,
                    teams[car]
                ),
                None => tracing::info!("Goal for {}", team),
            },
            SimulationEvent::Touch { car } => tracing::trace!(car, "Touch"),
            SimulationEvent::BoostPickup { car, pad } => {
                tracing::debug!(car, pad, "Boost pad picked up")
            }
        }
    }
}
