//! Command-line driver for the raypack preprocessor.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use byteorder::{ByteOrder, LittleEndian};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use raypack::net;
use raypack::report;
use raypack::scene::Scene;
use raypack::serial::{self, Layout, SCENE_MAGIC};
use raypack::util::{Error, Result};

#[derive(Parser)]
#[command(name = "raypack")]
#[command(about = "Host-side scene preprocessor for an FPGA raytracer")]
#[command(version)]
struct Cli {
    /// Input: a .scene description, or a pre-serialized binary
    #[arg(short = 'i', long = "in", value_name = "path")]
    infile: PathBuf,

    /// Output path (required by --tobin, --tohdr and --rt)
    #[arg(short = 'o', long = "out", value_name = "path")]
    outfile: Option<PathBuf>,

    /// Raytrace over TCP and save the returned framebuffer
    #[arg(long, value_name = "host,port", num_args = 0..=1,
          default_missing_value = "de1soclinux,50000")]
    rt: Option<String>,

    /// Bounding-volume leaf cap (power of two)
    #[arg(long = "max-bv", value_name = "uint", default_value_t = 128)]
    max_bv: u32,

    /// Serialization layout
    #[arg(long, value_enum, default_value_t = SerFmt::Dup)]
    serfmt: SerFmt,

    /// Write the serialized scene as a binary file
    #[arg(short = 'b', long)]
    tobin: bool,

    /// Write the serialized scene as a C header
    #[arg(short = 'c', long)]
    tohdr: bool,

    /// Print ray/BV intersection statistics (.scene input only)
    #[arg(long = "bv-report")]
    bv_report: bool,

    /// Byteswap every word of the output
    #[arg(short = 'e', long)]
    eswap: bool,

    /// Progress logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// CLI face of [`Layout`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SerFmt {
    /// Inline per-triangle attributes
    Dup,
    /// Shared pools, index triples
    Nodup,
}

impl From<SerFmt> for Layout {
    fn from(f: SerFmt) -> Layout {
        match f {
            SerFmt::Dup => Layout::Duplicated,
            SerFmt::Nodup => Layout::Indexed,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let selected = [cli.tobin, cli.tohdr, cli.rt.is_some(), cli.bv_report];
    match selected.iter().filter(|&&on| on).count() {
        0 => {
            return Err(Error::config(
                "no output selected (--tobin, --tohdr, --rt or --bv-report)",
            ))
        }
        1 => {}
        _ => return Err(Error::config("output modes are mutually exclusive")),
    }
    if cli.eswap && cli.tohdr {
        return Err(Error::config("--eswap does not apply to a C header"));
    }

    let is_scene = cli.infile.extension().is_some_and(|e| e == "scene");
    if cli.bv_report && !is_scene {
        return Err(Error::config("--bv-report needs a .scene input"));
    }

    let (mut words, res) = if is_scene {
        let t0 = Instant::now();
        let scene = Scene::load(&cli.infile, cli.max_bv, cli.serfmt.into())?;
        debug!("scene assembled in {:.1?}", t0.elapsed());

        if cli.bv_report {
            print!("{}", report::survey(&scene));
            return Ok(());
        }

        let t0 = Instant::now();
        let words = scene.to_words();
        debug!("serialized {} words in {:.1?}", words.len(), t0.elapsed());
        (words, scene.res)
    } else {
        read_binary(&cli.infile)?
    };

    if cli.tohdr {
        let out = outfile(cli)?;
        let mut f = BufWriter::new(File::create(out)?);
        serial::write_c_header(&mut f, &words)?;
        f.flush()?;
        info!("wrote {}", out.display());
        return Ok(());
    }

    if cli.eswap {
        serial::swap_words(&mut words);
    }

    if cli.tobin {
        let out = outfile(cli)?;
        write_words(out, &words)?;
        info!("wrote {} ({} words)", out.display(), words.len());
        return Ok(());
    }

    // the remaining mode is --rt
    if let Some(endpoint) = &cli.rt {
        let (host, port) = parse_endpoint(endpoint)?;
        let out = outfile(cli)?;
        let npixels = res.0 as usize * res.1 as usize;
        let frame = net::raytrace(&host, port, &words, npixels)?;
        save_frame(out, &frame, res)?;
        info!("wrote {}", out.display());
    }
    Ok(())
}

fn outfile(cli: &Cli) -> Result<&Path> {
    cli.outfile
        .as_deref()
        .ok_or_else(|| Error::config("no output file (use -o)"))
}

/// Read a pre-serialized scene. Accepts native or byteswapped word order,
/// normalizing to native; resolution comes from header words 1 and 2.
fn read_binary(path: &Path) -> Result<(Vec<u32>, (u32, u32))> {
    let bytes = std::fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(Error::MisalignedInput);
    }
    let mut words = vec![0u32; bytes.len() / 4];
    LittleEndian::read_u32_into(&bytes, &mut words);

    match words.first() {
        Some(&SCENE_MAGIC) => {}
        Some(&w) if w == SCENE_MAGIC.swap_bytes() => serial::swap_words(&mut words),
        _ => return Err(Error::MissingMagic),
    }
    if words.len() < 3 {
        return Err(Error::TruncatedInput);
    }
    let res = (words[1], words[2]);
    debug!("binary input: {} words, {}x{}", words.len(), res.0, res.1);
    Ok((words, res))
}

fn write_words(path: &Path, words: &[u32]) -> Result<()> {
    std::fs::write(path, serial::words_to_le_bytes(words))?;
    Ok(())
}

/// Split a "host,port" endpoint.
fn parse_endpoint(s: &str) -> Result<(String, u16)> {
    let bad = || Error::config(format!("invalid endpoint '{}', expected host,port", s));
    let (host, port) = s.split_once(',').ok_or_else(bad)?;
    let port = port.trim().parse().map_err(|_| bad())?;
    Ok((host.trim().to_string(), port))
}

/// Save the framebuffer by output extension: `.png` as PNG, `.raw`/`.rgb`
/// as raw bytes, anything else as BMP.
fn save_frame(path: &Path, frame: &[u8], res: (u32, u32)) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "raw" | "rgb" => Ok(std::fs::write(path, frame)?),
        "png" => Ok(image::save_buffer_with_format(
            path,
            frame,
            res.0,
            res.1,
            image::ExtendedColorType::Rgb8,
            image::ImageFormat::Png,
        )?),
        _ => Ok(image::save_buffer_with_format(
            path,
            frame,
            res.0,
            res.1,
            image::ExtendedColorType::Rgb8,
            image::ImageFormat::Bmp,
        )?),
    }
}
