use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use scopelink::port::Timeout;
use scopelink::{TriggerMode, TriggerType};

#[derive(Parser, Debug)]
#[command(name = "scopelink", about = "Protocol console for DSP oscilloscope instruments")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Verify the link with echo round-trips
    Ping(PingOpts),
    /// Configure the instrument and stream decoded wave groups
    Watch(WatchOpts),
}

#[derive(Args, Debug, Clone)]
pub struct LinkOpts {
    /// Device path, ftdi:// URL, or "pcsim"
    #[arg(long, default_value = "/dev/ttyUSB0")]
    pub dev: String,
    /// Bit rate
    #[arg(long, default_value_t = 115_200)]
    pub bitrate: u32,
    /// Read timeout in seconds; 0 waits forever
    #[arg(long, default_value_t = 3.0)]
    pub timeout: f64,
    /// Launch this simulator binary first and connect to its pty
    #[arg(long)]
    pub sim_bin: Option<PathBuf>,
}

impl LinkOpts {
    pub fn timeout(&self) -> Timeout {
        if self.timeout == 0.0 {
            Timeout::Forever
        } else {
            Timeout::Bounded(Duration::from_secs_f64(self.timeout))
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PingOpts {
    #[command(flatten)]
    pub link: LinkOpts,
    /// Text to bounce off the instrument
    #[arg(long, default_value = "ping")]
    pub content: String,
    /// Number of round-trips
    #[arg(long, default_value_t = 3)]
    pub count: u32,
}

#[derive(Args, Debug, Clone)]
pub struct WatchOpts {
    #[command(flatten)]
    pub link: LinkOpts,
    /// Quantization bit depth per sample
    #[arg(long, default_value_t = 16)]
    pub resolution: u32,
    #[arg(long, value_enum, default_value = "auto")]
    pub trigmode: ModeArg,
    #[arg(long, value_enum, default_value = "rising")]
    pub trigtype: EdgeArg,
    /// Channel index the trigger watches
    #[arg(long, default_value_t = 0)]
    pub trig_channel: u32,
    /// Trigger level in the channel's physical unit
    #[arg(long, default_value_t = 0.0)]
    pub trig_level: f32,
    /// Screen-width time span in seconds; 0 keeps the instrument default
    #[arg(long, default_value_t = 0.0)]
    pub timescale: f32,
    /// Wave groups to fetch before terminating
    #[arg(long, default_value_t = 10)]
    pub groups: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Auto,
    Normal,
    Single,
}

impl From<ModeArg> for TriggerMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => TriggerMode::Auto,
            ModeArg::Normal => TriggerMode::Normal,
            ModeArg::Single => TriggerMode::Single,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EdgeArg {
    Rising,
    Falling,
}

impl From<EdgeArg> for TriggerType {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Rising => TriggerType::RisingEdge,
            EdgeArg::Falling => TriggerType::FallingEdge,
        }
    }
}
