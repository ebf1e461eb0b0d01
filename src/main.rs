use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scopelink::{Dsp, sim, wave};

mod cli;

use cli::{Cli, Cmd, LinkOpts, PingOpts, WatchOpts};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    match args.cmd {
        Cmd::Ping(opts) => ping(opts),
        Cmd::Watch(opts) => watch(opts),
    }
}

/// Open the link, spawning a simulator first when asked to. The returned
/// guard must outlive the session.
fn connect(link: &LinkOpts) -> Result<(Dsp, Option<sim::Simulator>)> {
    if let Some(bin) = &link.sim_bin {
        let simulator = sim::launch(bin)?;
        let dsp = Dsp::open(simulator.pty_path(), link.bitrate, link.timeout())?;
        Ok((dsp, Some(simulator)))
    } else {
        let dsp = Dsp::open(&link.dev, link.bitrate, link.timeout())?;
        Ok((dsp, None))
    }
}

fn ping(opts: PingOpts) -> Result<()> {
    let (mut dsp, _sim) = connect(&opts.link)?;

    for i in 0..opts.count {
        let t0 = Instant::now();
        let reply = dsp
            .echo(&opts.content)
            .with_context(|| format!("echo #{i}"))?;
        println!(
            "[ping] #{} \"{}\" in {:.1} ms",
            i,
            reply,
            t0.elapsed().as_secs_f64() * 1e3
        );
    }
    Ok(())
}

fn watch(opts: WatchOpts) -> Result<()> {
    let (mut dsp, _sim) = connect(&opts.link)?;

    let cfg = dsp
        .configure(
            opts.resolution,
            opts.trigmode.into(),
            opts.trigtype.into(),
            opts.trig_channel,
            opts.trig_level,
            opts.timescale,
        )
        .context("configure")?;
    println!(
        "[watch] samplerate={} Hz timescale={}..{} s channels={}",
        cfg.samplerate(),
        cfg.default_timescale(),
        cfg.max_timescale(),
        cfg.chconfig.len()
    );

    let mut fetched = 0;
    while fetched < opts.groups {
        let group = dsp.wave_group().context("wave group")?;
        if group.wave.is_empty() {
            // Nothing acquired yet; back off instead of hammering the link.
            std::thread::sleep(std::time::Duration::from_millis(10));
            continue;
        }
        fetched += 1;
        print!("[watch] group {} triggered={}", fetched, group.triggered());
        for w in &group.wave {
            let Some(channel) = cfg.chconfig.get(w.ch_id() as usize) else {
                print!("  ch{}:<unknown channel>", w.ch_id());
                continue;
            };
            let series = wave::decode_wave(w, channel, opts.resolution);
            let lo = series.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = series.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            print!(
                "  {}: {} samples, {:.3}..{:.3} {}",
                channel.name(),
                series.len(),
                lo,
                hi,
                channel.unit()
            );
        }
        println!();
    }

    dsp.terminate().context("terminate")?;
    Ok(())
}
