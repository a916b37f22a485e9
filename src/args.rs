// Commandline argument parser using clap for the BCI feedback front-end

use crate::paradigm::Paradigm;

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Everything the `bcifeedback` binary can be told on the command line.
#[derive(Debug, Parser, Clone)]
#[clap(version, about)]
pub struct FeedbackArgs {
    #[command(subcommand, long_about)]
    /// Where bus messages come from
    pub command: CommandTask,

    /// RON file with session settings; flags below override it
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Which feedback paradigm to run. Asked for interactively if neither
    /// this nor a config file gives one
    #[arg(short = 'p', long = "paradigm", value_enum, global = true)]
    pub paradigm: Option<Paradigm>,

    /// Smoothing time constant, in seconds
    #[arg(short = 's', long = "smooth-time", global = true)]
    pub smooth_time: Option<f32>,

    /// Frames rendered per second
    #[arg(short = 'r', long = "frame-rate", global = true)]
    pub frame_rate: Option<f32>,
}

impl FeedbackArgs {
    /// Rejects combinations clap cannot express. `listen` reads the bus from
    /// stdin, which the monitor needs for its keys.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if let CommandTask::Listen(cmd) = &self.command {
            if cmd.output.monitor {
                return Err(Self::command().error(
                    ErrorKind::ArgumentConflict,
                    "--monitor cannot be used with listen: both read the terminal",
                ));
            }
        }
        Ok(())
    }
}

#[allow(missing_docs)]
#[derive(Debug, Subcommand, Clone)]
pub enum CommandTask {
    /// Decode bus lines arriving on standard input
    #[command(about)]
    Listen(ListenCommand),

    /// Replay a recorded bus feed from a file
    #[command(about)]
    Replay(ReplayCommand),

    /// Run synthetic trials from the built-in dummy bus
    #[command(about)]
    Demo(DemoCommand),
}

impl CommandTask {
    /// The output options shared by every subcommand.
    pub fn output(&self) -> &OutputArgs {
        match self {
            CommandTask::Listen(cmd) => &cmd.output,
            CommandTask::Replay(cmd) => &cmd.output,
            CommandTask::Demo(cmd) => &cmd.output,
        }
    }
}

#[allow(missing_docs)]
#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct ListenCommand {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[allow(missing_docs)]
#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct ReplayCommand {
    /// Bus feed to replay, one message per line
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Honour the `@seconds` stamps instead of replaying as fast as possible
    #[arg(long)]
    pub realtime: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[allow(missing_docs)]
#[derive(Debug, Args, Clone)]
#[command(version, about)]
pub struct DemoCommand {
    /// Probability that a synthetic trial drifts toward the cued class
    #[arg(short = 'a', long = "accuracy", default_value_t = 0.7)]
    pub accuracy: f32,

    /// Amplitude of the noise added to each synthetic decoder output
    #[arg(short = 'n', long = "noise", default_value_t = 0.05)]
    pub noise: f32,

    /// Number of seconds to run for; runs until quit if not given
    #[arg(short = 'd', long = "duration")]
    pub duration: Option<f32>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Where the rendered scene goes besides the in-memory mirror.
#[derive(Debug, Args, Clone, Default)]
pub struct OutputArgs {
    /// Record the audio feedback to this WAV file
    #[arg(short = 'o', long = "record")]
    pub record: Option<PathBuf>,

    /// WAV clip played for a left cue
    #[arg(long = "cue-left", requires = "record")]
    pub cue_left: Option<PathBuf>,

    /// WAV clip played for a right cue
    #[arg(long = "cue-right", requires = "record")]
    pub cue_right: Option<PathBuf>,

    /// WAV clip played for a rest cue
    #[arg(long = "cue-rest", requires = "record")]
    pub cue_rest: Option<PathBuf>,

    /// Show the live terminal monitor
    #[arg(short = 'm', long = "monitor")]
    pub monitor: bool,
}
