use clap::ValueEnum;

pub mod replay;
pub mod settings_watch;
pub mod sim;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Drive both cars against the built-in simulation
    Sim,
    /// Feed recorded snapshots to the agent and print its commands
    Replay,
}
