//! Test signal simulator
//!
//! Writes a sum of tones, optionally with Gaussian noise, to a WAV or text file
//! that `tdspec` can analyze.
//!
//! Usage:
//!   cargo run --bin tdsim -- [OPTIONS] <output.wav|output.txt>
//!
//! Options:
//!   --fs <Hz>                 Sampling frequency (default: 1000)
//!   -d, --duration <sec>      Duration in seconds (default: 2)
//!   -t, --tone <f:phase:gain> Add a tone (repeatable; default 50:0:1)
//!   --am <fm:fc>              Amplitude-modulated carrier instead of tones
//!   -s, --snr <dB>            Add white noise at this SNR
//!   --seed <n>                Noise seed (default: 12345)
//!
//! Examples:
//!   # Five-tone mixture, 5 seconds at 1 kHz
//!   tdsim -d 5 -t 12:1.571:0.8 -t 53:0.785:0.7 -t 150:3.142:0.9 mix.wav
//!
//!   # 53.71 Hz envelope on a 1 kHz carrier, sampled at 10 kHz, noisy
//!   tdsim --fs 10000 -d 0.1 --am 53.71:1000 -s 0 am.txt

use std::fs::File;
use std::io::{BufWriter, Write};

use tdhosa::simulation::{add_noise, am_tone, synthesize, Tone};

struct SimConfig {
    output_path: String,
    sampling_frequency: f64,
    duration: f64,
    tones: Vec<Tone>,
    am: Option<(f64, f64)>,
    snr_db: Option<f64>,
    seed: u64,
}

impl SimConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut sampling_frequency = 1000.0;
        let mut duration = 2.0;
        let mut tones = Vec::new();
        let mut am = None;
        let mut snr_db = None;
        let mut seed = 12345;
        let mut output_path = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--fs" => sampling_frequency = parse_value(&args, &mut i, "sampling frequency")?,
                "-d" | "--duration" => duration = parse_value(&args, &mut i, "duration")?,
                "-t" | "--tone" => {
                    let spec: String = parse_value(&args, &mut i, "tone")?;
                    let parts = parse_fields(&spec, 3)?;
                    tones.push(Tone::new(parts[0], parts[1], parts[2]));
                }
                "--am" => {
                    let spec: String = parse_value(&args, &mut i, "am")?;
                    let parts = parse_fields(&spec, 2)?;
                    am = Some((parts[0], parts[1]));
                }
                "-s" | "--snr" => snr_db = Some(parse_value(&args, &mut i, "SNR")?),
                "--seed" => seed = parse_value(&args, &mut i, "seed")?,
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if !arg.starts_with('-') => {
                    if output_path.is_some() {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                    output_path = Some(arg.to_string());
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        if tones.is_empty() {
            tones.push(Tone::new(50.0, 0.0, 1.0));
        }
        if !(sampling_frequency > 0.0 && duration > 0.0) {
            return Err("Sampling frequency and duration must be positive".to_string());
        }

        Ok(SimConfig {
            output_path: output_path.ok_or("Missing output file argument")?,
            sampling_frequency,
            duration,
            tones,
            am,
            snr_db,
            seed,
        })
    }

    fn num_samples(&self) -> usize {
        (self.duration * self.sampling_frequency).round() as usize
    }
}

fn parse_value<V: std::str::FromStr>(args: &[String], i: &mut usize, name: &str) -> Result<V, String> {
    *i += 1;
    let raw = args.get(*i).ok_or_else(|| format!("Missing value for {}", name))?;
    raw.parse().map_err(|_| format!("Invalid {} value: {}", name, raw))
}

fn parse_fields(spec: &str, expected: usize) -> Result<Vec<f64>, String> {
    let fields: Result<Vec<f64>, _> = spec.split(':').map(str::parse::<f64>).collect();
    match fields {
        Ok(f) if f.len() == expected => Ok(f),
        _ => Err(format!("Expected {} ':'-separated numbers, got '{}'", expected, spec)),
    }
}

fn print_help(program: &str) {
    eprintln!("Test signal simulator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <output.wav|output.txt>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("      --fs <Hz>                 Sampling frequency (default: 1000)");
    eprintln!("  -d, --duration <sec>          Duration in seconds (default: 2)");
    eprintln!("  -t, --tone <f:phase:gain>     Add a tone (repeatable; default 50:0:1)");
    eprintln!("      --am <fm:fc>              Amplitude-modulated carrier instead of tones");
    eprintln!("  -s, --snr <dB>                Add white noise at this SNR");
    eprintln!("      --seed <n>                Noise seed (default: 12345)");
    eprintln!("  -h, --help                    Show this help message");
}

fn write_wav(path: &str, samples: &[f64], sampling_frequency: f64) -> Result<(), String> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sampling_frequency.round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| format!("Failed to create WAV: {}", e))?;
    for &sample in samples {
        writer
            .write_sample(sample as f32)
            .map_err(|e| format!("Failed to write sample: {}", e))?;
    }
    writer.finalize().map_err(|e| format!("Failed to finalize WAV: {}", e))
}

fn write_text(path: &str, samples: &[f64]) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?;
    let mut out = BufWriter::new(file);
    for sample in samples {
        writeln!(out, "{}", sample).map_err(|e| format!("Failed to write: {}", e))?;
    }
    out.flush().map_err(|e| format!("Failed to write: {}", e))
}

fn main() {
    let config = match SimConfig::parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(1);
        }
    };

    let n = config.num_samples();
    let mut signal = match config.am {
        Some((fm, fc)) => am_tone(fm, fc, config.sampling_frequency, n),
        None => synthesize(&config.tones, config.sampling_frequency, n),
    };

    if let Some(snr_db) = config.snr_db {
        if let Err(e) = add_noise(&mut signal, snr_db, config.seed) {
            eprintln!("Failed to add noise: {}", e);
            std::process::exit(1);
        }
    }

    let result = if config.output_path.to_ascii_lowercase().ends_with(".wav") {
        write_wav(&config.output_path, &signal, config.sampling_frequency)
    } else {
        write_text(&config.output_path, &signal)
    };

    match result {
        Ok(()) => eprintln!("Wrote {} samples at {} Hz to {}", n, config.sampling_frequency, config.output_path),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
