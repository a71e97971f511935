use std::f64::consts::TAU;
use std::fs::File;
use std::io::BufReader;

use anyhow::{bail, Context, Result};
use clap::Parser;
use midiosc::generator::midi_to_frequency;
use midiosc::pipeline::{read_sequence, NoteSequence, NoteSequenceRunner};
use midiosc::SynthConfig;
use plotters::prelude::*;

/// Render the waveform of a melody file to SVG and check it for clicks
#[derive(Parser)]
#[command(name = "plot-melody")]
struct Args {
    /// Melody in `<timestamp ms> <midi note>` lines
    input: String,

    /// Output SVG path
    output: String,

    /// Start of the plotted window in milliseconds
    #[arg(long, default_value_t = 0.0)]
    start_ms: f64,

    /// Length of the plotted window in milliseconds
    #[arg(long, default_value_t = 20.0)]
    length_ms: f64,

    /// Maximum number of input lines
    #[arg(long, default_value_t = 100)]
    max_notes: usize,
}

/// Largest sample-to-sample change a sine can make without a phase jump
fn max_step(sequence: &NoteSequence, sample_rate: u32) -> f64 {
    let max_freq = sequence
        .notes()
        .iter()
        .map(|n| midi_to_frequency(n.midi_note))
        .fold(0.0, f64::max);
    TAU * max_freq / f64::from(sample_rate)
}

fn check_discontinuities(samples: &[f64], threshold: f64, sample_rate: u32) -> Result<()> {
    let mut max_diff: f64 = 0.0;
    let mut max_diff_idx: usize = 0;

    for i in 1..samples.len() {
        let diff = (samples[i] - samples[i - 1]).abs();
        if diff > max_diff {
            max_diff = diff;
            max_diff_idx = i;
        }
        if diff > threshold {
            bail!(
                "DISCONTINUITY at sample {} ({:.3}ms): {} -> {} (diff = {})",
                i,
                i as f64 / f64::from(sample_rate) * 1000.0,
                samples[i - 1],
                samples[i],
                diff
            );
        }
    }

    println!(
        "  ✓ Max step: {:.6} at sample {} (limit {:.6})",
        max_diff, max_diff_idx, threshold
    );
    Ok(())
}

/// Sample indices where each note after the first begins
fn boundaries(sequence: &NoteSequence, config: &SynthConfig) -> Vec<u64> {
    sequence
        .notes()
        .iter()
        .scan(0u64, |start, n| {
            *start += config.samples_for(n.duration_ms);
            Some(*start)
        })
        .collect()
}

fn create_plot(
    args: &Args,
    samples: &[f64],
    boundaries: &[u64],
    sample_rate: u32,
) -> Result<()> {
    let per_ms = f64::from(sample_rate) / 1000.0;
    let first = (args.start_ms * per_ms) as usize;
    let last = (((args.start_ms + args.length_ms) * per_ms) as usize).min(samples.len());
    if first >= last {
        bail!("plot window is outside the rendered {} samples", samples.len());
    }

    let root = SVGBackend::new(&args.output, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let to_ms = |i: usize| i as f64 / per_ms;
    let title = format!(
        "{}: {:.1}ms - {:.1}ms",
        args.input,
        to_ms(first),
        to_ms(last)
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(to_ms(first)..to_ms(last), -1.1f64..1.1f64)?;

    chart
        .configure_mesh()
        .x_desc("Time (ms)")
        .y_desc("Amplitude")
        .x_labels(10)
        .y_labels(10)
        .draw()?;

    chart.draw_series(LineSeries::new(
        (first..last).map(|i| (to_ms(i), samples[i])),
        BLUE.stroke_width(1),
    ))?;

    // Note boundaries
    for &b in boundaries {
        let b = b as usize;
        if (first..last).contains(&b) {
            chart.draw_series(std::iter::once(Circle::new(
                (to_ms(b), samples[b]),
                4,
                RED.filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = SynthConfig {
        max_events: args.max_notes,
        ..Default::default()
    };

    println!("Melody Plot Generator");
    println!("=====================");

    let file = File::open(&args.input).with_context(|| format!("opening {}", args.input))?;
    let sequence = read_sequence(BufReader::new(file), &config)?;
    println!("  Notes: {}", sequence.len());

    print!("  Rendering... ");
    let samples = NoteSequenceRunner::new(config.clone()).render(&sequence)?;
    println!(
        "done ({} samples, {:.1}ms)",
        samples.len(),
        samples.len() as f64 / f64::from(config.sample_rate) * 1000.0
    );

    let expected = sequence.total_samples(&config);
    if samples.len() as u64 != expected {
        bail!(
            "Sample count mismatch: expected {} but got {}",
            expected,
            samples.len()
        );
    }
    println!("  ✓ Sample count matches");

    let threshold = max_step(&sequence, config.sample_rate) + 1e-9;
    check_discontinuities(&samples, threshold, config.sample_rate)?;

    print!("  Creating plot... ");
    create_plot(
        &args,
        &samples,
        &boundaries(&sequence, &config),
        config.sample_rate,
    )?;
    println!("done");

    println!();
    println!("Output: {}", args.output);

    Ok(())
}
