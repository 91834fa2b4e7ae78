//! Time-domain spectrum analyzer
//!
//! Reads a signal and prints its time-domain spectrum (and optionally the
//! bispectrum, trispectrum and tetraspectrum) as CSV on stdout.
//!
//! Usage:
//!   cargo run --release --bin tdspec -- [OPTIONS] <input>
//!
//! Input is either a WAV file (first channel, sample rate taken from the
//! header) or a text file with one sample per line (requires `--fs`).
//!
//! Examples:
//!   # Fundamental spectrum between 40 and 60 Hz
//!   tdspec --fmin 40 --fmax 60 --freq-step 0.1 lfp.wav
//!
//!   # Up to the trispectrum, single precision, from a text trace sampled at 200 Hz
//!   tdspec --fs 200 --order 3 --precision 32 trace.txt > spectra.csv

use std::fs;
use std::io::{self, BufWriter, Write};

use tdhosa::tracing_init::init_tracing;
use tdhosa::{AnyEstimate, BaseSpectrum, Estimator, Precision, Sample, SpectralEstimate, SpectralOrder, SpectrumConfig};

struct AnalyzeConfig {
    input_path: String,
    sampling_frequency: Option<f64>,
    order: SpectralOrder,
    fmin: Option<f64>,
    fmax: Option<f64>,
    freq_step: Option<f64>,
    phase_step: Option<f64>,
    precision: Precision,
    base: BaseSpectrum,
    serial: bool,
    progress: bool,
}

impl AnalyzeConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut config = AnalyzeConfig {
            input_path: String::new(),
            sampling_frequency: None,
            order: SpectralOrder::Fundamental,
            fmin: None,
            fmax: None,
            freq_step: None,
            phase_step: None,
            precision: Precision::Double,
            base: BaseSpectrum::Fundamental,
            serial: false,
            progress: false,
        };
        let mut input_path = None;

        let mut i = 1;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--fs" => config.sampling_frequency = Some(parse_value(&args, &mut i, "sampling frequency")?),
                "--fmin" => config.fmin = Some(parse_value(&args, &mut i, "fmin")?),
                "--fmax" => config.fmax = Some(parse_value(&args, &mut i, "fmax")?),
                "--freq-step" => config.freq_step = Some(parse_value(&args, &mut i, "frequency step")?),
                "--phase-step" => config.phase_step = Some(parse_value(&args, &mut i, "phase step")?),
                "-o" | "--order" => {
                    let order: u8 = parse_value(&args, &mut i, "order")?;
                    config.order = SpectralOrder::try_from(order).map_err(|e| e.to_string())?;
                }
                "-p" | "--precision" => {
                    let value: String = parse_value(&args, &mut i, "precision")?;
                    config.precision = value.parse()?;
                }
                "--base" => {
                    let value: String = parse_value(&args, &mut i, "base")?;
                    config.base = match value.as_str() {
                        "fundamental" => BaseSpectrum::Fundamental,
                        "within-band" => BaseSpectrum::WithinBand,
                        other => return Err(format!("Unknown base spectrum: {}", other)),
                    };
                }
                "--serial" => config.serial = true,
                "--progress" => config.progress = true,
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if !arg.starts_with('-') => {
                    if input_path.is_some() {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                    input_path = Some(arg.to_string());
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        config.input_path = input_path.ok_or("Missing input file argument")?;
        Ok(config)
    }

    fn spectrum_config(&self, sampling_frequency: f64) -> SpectrumConfig {
        let mut config = SpectrumConfig::new(sampling_frequency);
        config.fmin = self.fmin;
        config.fmax = self.fmax;
        if let Some(step) = self.freq_step {
            config.freq_step = step;
        }
        if let Some(step) = self.phase_step {
            config.phase_step = step;
        }
        config.base = self.base;
        config.parallel = !self.serial;
        config.progress = self.progress;
        config
    }
}

fn parse_value<V: std::str::FromStr>(args: &[String], i: &mut usize, name: &str) -> Result<V, String> {
    *i += 1;
    let raw = args.get(*i).ok_or_else(|| format!("Missing value for {}", name))?;
    raw.parse().map_err(|_| format!("Invalid {} value: {}", name, raw))
}

fn print_help(program: &str) {
    eprintln!("Time-domain higher-order spectrum analyzer");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <input.wav|input.txt>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("      --fs <Hz>             Sampling frequency (required for text input)");
    eprintln!("  -o, --order <1-4>         Highest order: 1 spectrum .. 4 tetraspectrum (default: 1)");
    eprintln!("      --fmin <Hz>           Lowest frequency (default: one cycle per whole second)");
    eprintln!("      --fmax <Hz>           Upper frequency bound, exclusive (default: floor(fs/2) - 1)");
    eprintln!("      --freq-step <Hz>      Frequency step (default: 0.01)");
    eprintln!("      --phase-step <rad>    Phase step (default: 0.01 * 2π)");
    eprintln!("  -p, --precision <32|64>   Float width (default: 64)");
    eprintln!("      --base <name>         fundamental | within-band (default: fundamental)");
    eprintln!("      --serial              Evaluate frequency bins on one thread");
    eprintln!("      --progress            Log scan progress to stderr");
    eprintln!("  -h, --help                Show this help message");
}

/// Read the first channel of a WAV file, normalized to [-1, 1]
fn read_wav(path: &str) -> Result<(Vec<f64>, f64), String> {
    let reader = hound::WavReader::open(path).map_err(|e| format!("Failed to open WAV file: {}", e))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let samples: Result<Vec<f64>, _> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
            reader
                .into_samples::<i32>()
                .step_by(channels)
                .map(|s| s.map(|v| v as f64 / scale))
                .collect()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .step_by(channels)
            .map(|s| s.map(f64::from))
            .collect(),
    };

    let samples = samples.map_err(|e| format!("Failed to read samples: {}", e))?;
    Ok((samples, spec.sample_rate as f64))
}

/// Read one sample per line; blank lines and `#` comments are skipped
fn read_text(path: &str) -> Result<Vec<f64>, String> {
    let contents = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    contents
        .lines()
        .enumerate()
        .map(|(n, line)| (n, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            line.parse::<f64>()
                .map_err(|_| format!("Line {}: not a number: {}", n + 1, line))
        })
        .collect()
}

fn load_signal(config: &AnalyzeConfig) -> Result<(Vec<f64>, f64), String> {
    if config.input_path.to_ascii_lowercase().ends_with(".wav") {
        let (signal, rate) = read_wav(&config.input_path)?;
        Ok((signal, config.sampling_frequency.unwrap_or(rate)))
    } else {
        let signal = read_text(&config.input_path)?;
        let fs = config
            .sampling_frequency
            .ok_or("Text input needs --fs <Hz>")?;
        Ok((signal, fs))
    }
}

fn write_csv<T: Sample, W: Write>(estimate: &SpectralEstimate<T>, out: &mut W) -> io::Result<()> {
    write!(out, "frequency")?;
    for level in &estimate.levels {
        let k = level.order.as_u8();
        write!(out, ",amplitude_{},phase_{}", k, k)?;
    }
    writeln!(out)?;

    for (i, frequency) in estimate.frequencies.iter().enumerate() {
        write!(out, "{}", frequency)?;
        for (amplitude, phase) in estimate.pairs() {
            write!(out, ",{},{}", amplitude[i], phase[i])?;
        }
        writeln!(out)?;
    }
    out.flush()
}

fn main() {
    init_tracing();

    let config = match AnalyzeConfig::parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(1);
        }
    };

    let (signal, sampling_frequency) = match load_signal(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("Input: {}", config.input_path);
    eprintln!("  Samples: {}", signal.len());
    eprintln!("  Sampling frequency: {} Hz", sampling_frequency);
    eprintln!("  Duration: {:.3} s", signal.len() as f64 / sampling_frequency);
    eprintln!("  Order: {} ({}), precision {}", config.order.as_u8(), config.order, config.precision);

    let estimator = Estimator::new(config.spectrum_config(sampling_frequency));
    let estimate = match estimator.estimate_with_precision(config.order, config.precision, &signal, None) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Estimation failed: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = match &estimate {
        AnyEstimate::Single(e) => write_csv(e, &mut out),
        AnyEstimate::Double(e) => write_csv(e, &mut out),
    };

    if let Err(e) = written {
        eprintln!("Failed to write output: {}", e);
        std::process::exit(1);
    }
}
