use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use skid_core::{AgentSettings, BallTrajectory, FieldInfo, Team, WorldSnapshot};
use skid_executor::Agent;

use crate::Args;

/// One line of replay input.
#[derive(Debug, Deserialize)]
struct ReplayFrame {
    snapshot: WorldSnapshot,
    #[serde(default)]
    prediction: Option<BallTrajectory>,
}

/// Replay recorded frames through a fresh agent.
pub fn run(args: &Args, settings: &AgentSettings) -> Result<()> {
    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open replay input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let frames = replay(input, output, args.team.into(), settings)?;
    tracing::info!("Replayed {} frames", frames);
    Ok(())
}

/// Run the agent on each frame of `input`, writing one command per frame to `output`.
///
/// The agent drives the first car of `team` found in the first frame. Blank lines are
/// skipped. Returns the number of frames replayed.
fn replay(
    input: impl BufRead,
    mut output: impl Write,
    team: Team,
    settings: &AgentSettings,
) -> Result<usize> {
    let field = FieldInfo::standard_full_boosts();
    let mut agent: Option<Agent> = None;
    let mut frames = 0;

    for (line_index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read replay input")?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: ReplayFrame = serde_json::from_str(&line)
            .with_context(|| format!("Invalid replay frame on line {}", line_index + 1))?;

        let agent = agent.get_or_insert_with(|| {
            let index = frame
                .snapshot
                .cars
                .iter()
                .position(|car| car.team == team)
                .unwrap_or_else(|| {
                    tracing::warn!("No {} car in the first frame, using car 0", team);
                    0
                });
            Agent::new(index, &field, settings)
        });

        let cmd = agent.tick(&frame.snapshot, frame.prediction.as_ref());
        serde_json::to_writer(&mut output, &cmd).context("Failed to write command")?;
        writeln!(output).context("Failed to write command")?;
        frames += 1;
    }

    output.flush().context("Failed to flush output")?;
    Ok(frames)
}
