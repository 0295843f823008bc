// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line handling shared by the `mandel` and `mandelmovie`
//! binaries: argument definitions, validators, and the plain
//! configuration structs the arguments are parsed into.

use clap::{value_t_or_exit, App, AppSettings, Arg, ArgMatches};
use env_logger::Env;
use log::warn;
use num::Complex;
use std::path::PathBuf;
use std::str::FromStr;

use crate::bulkhead::FrameSettings;
use crate::errors::MandelError;
use crate::request::RenderRequest;
use crate::sequence::FrameSequence;

/// Names of the arguments, as used with `ArgMatches`.
pub const MAX: &str = "max";
/// X coordinate of the center.
pub const XCENTER: &str = "xcenter";
/// Y coordinate of the center.
pub const YCENTER: &str = "ycenter";
/// Scale, or goal scale for a movie.
pub const SCALE: &str = "scale";
/// Width in pixels.
pub const WIDTH: &str = "width";
/// Height in pixels.
pub const HEIGHT: &str = "height";
/// Output file, or base name for a movie.
pub const OUTPUT: &str = "output";
/// Threads per image.
pub const THREADS: &str = "threads";
/// Number of frames in a movie.
pub const FRAMES: &str = "frames";
/// Frames rendered at once.
pub const PROCESSES: &str = "processes";
/// Path of the single-frame renderer.
pub const RENDERER: &str = "renderer";
/// Render frames as threads instead of processes.
pub const IN_PROCESS: &str = "in-process";
/// Help.
pub const HELP: &str = "help";

/// The zoom always starts from this scale.
pub const START_SCALE: f64 = 2.0;

/// Accepts anything that parses as a `T`.
pub fn validate_number<T: FromStr>(s: &str, isnotanumber_err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// Accepts a `T` that is at least `low`.
pub fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

/// Accepts a finite float greater than zero.
pub fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() && f > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn count_arg(
    name: &'static str,
    short: &str,
    default: &'static str,
    help: &'static str,
) -> Arg<'static, 'static> {
    let label = name.to_string();
    Arg::with_name(name)
        .short(short)
        .long(name)
        .takes_value(true)
        .default_value(default)
        .validator(move |s| {
            validate_range::<u64>(
                &s,
                1,
                &format!("{} should be an integer", label),
                &format!("{} should be an integer of at least 1", label),
            )
        })
        .help(help)
}

fn coordinate_arg(
    name: &'static str,
    short: &str,
    default: &'static str,
    help: &'static str,
) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .short(short)
        .long(name)
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value(default)
        .validator(|s| validate_number::<f64>(&s, "Could not parse coordinate"))
        .help(help)
}

fn common_args(app: App<'static, 'static>) -> App<'static, 'static> {
    app.setting(AppSettings::AllowNegativeNumbers)
        .setting(AppSettings::DisableHelpFlags)
        .setting(AppSettings::DisableVersion)
        .arg(
            Arg::with_name(HELP)
                .short("h")
                .long(HELP)
                .help("Show this help text."),
        )
}

/// Arguments of the single-frame renderer.
pub fn render_app() -> App<'static, 'static> {
    common_args(App::new("mandel"))
        .about("Renders one Mandelbrot image")
        .arg(count_arg(MAX, "m", "1000", "The maximum number of iterations per point."))
        .arg(coordinate_arg(XCENTER, "x", "0", "X coordinate of image center point."))
        .arg(coordinate_arg(YCENTER, "y", "0", "Y coordinate of image center point."))
        .arg(
            Arg::with_name(SCALE)
                .short("s")
                .long(SCALE)
                .takes_value(true)
                .default_value("4")
                .validator(|s| validate_positive(&s, "Scale should be a positive number"))
                .help("Scale of the image in Mandelbrot coordinates."),
        )
        .arg(count_arg(WIDTH, "W", "500", "Width of the image in pixels."))
        .arg(count_arg(HEIGHT, "H", "500", "Height of the image in pixels."))
        .arg(
            Arg::with_name(OUTPUT)
                .short("o")
                .long(OUTPUT)
                .takes_value(true)
                .default_value("mandel.bmp")
                .help("Set output file."),
        )
        .arg(count_arg(
            THREADS,
            "n",
            "1",
            "Number of threads that will process the image.",
        ))
        .after_help(
            "Some examples are:\n    \
             mandel -x -0.5 -y -0.5 -s 0.2\n    \
             mandel -x -.38 -y -.665 -s .05 -m 100\n    \
             mandel -x 0.286932 -y 0.014287 -s .0005 -m 1000",
        )
}

/// Arguments of the frame-sequence driver.
pub fn movie_app() -> App<'static, 'static> {
    common_args(App::new("mandelmovie"))
        .about("Renders a sequence of Mandelbrot images zooming in on one point")
        .arg(count_arg(MAX, "m", "900", "The maximum number of iterations per point."))
        .arg(coordinate_arg(XCENTER, "x", "-0.11275", "X coordinate of image center point."))
        .arg(coordinate_arg(YCENTER, "y", "0.89223", "Y coordinate of image center point."))
        .arg(
            Arg::with_name(SCALE)
                .short("s")
                .long(SCALE)
                .takes_value(true)
                .default_value("0.00008")
                .validator(|s| validate_positive(&s, "Scale should be a positive number"))
                .help("Scale of the final image in Mandelbrot coordinates."),
        )
        .arg(count_arg(WIDTH, "W", "1000", "Width of the image in pixels."))
        .arg(count_arg(HEIGHT, "H", "1000", "Height of the image in pixels."))
        .arg(
            Arg::with_name(OUTPUT)
                .short("o")
                .long(OUTPUT)
                .takes_value(true)
                .default_value("mandel")
                .help("Base name of the output files; the frame number and .bmp are appended."),
        )
        .arg(count_arg(
            THREADS,
            "n",
            "1",
            "Number of threads that will process each image.",
        ))
        .arg(count_arg(
            FRAMES,
            "i",
            "50",
            "Number of images in the sequence. More images make smaller jumps in zoom.",
        ))
        .arg(count_arg(
            PROCESSES,
            "p",
            "1",
            "Number of images rendered at the same time.",
        ))
        .arg(
            Arg::with_name(RENDERER)
                .long(RENDERER)
                .takes_value(true)
                .help("Path of the mandel renderer (default: next to this program)."),
        )
        .arg(
            Arg::with_name(IN_PROCESS)
                .long(IN_PROCESS)
                .help("Render frames on threads in this process instead of child processes."),
        )
}

/// Parses `args` with `app`.  `-h` prints the help text and exits with
/// status 1; bad arguments print an error and exit with status 1.
pub fn matches_or_exit<'a, 'b, I, T>(app: App<'a, 'b>, args: I) -> ArgMatches<'a>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let mut help = app.clone();
    let matches = app.get_matches_from(args);
    if matches.is_present(HELP) {
        // Nothing useful can be done if stdout is gone.
        let _ = help.print_help();
        println!();
        std::process::exit(1);
    }
    matches
}

fn center(matches: &ArgMatches) -> Complex<f64> {
    Complex::new(
        value_t_or_exit!(matches, XCENTER, f64),
        value_t_or_exit!(matches, YCENTER, f64),
    )
}

/// Configuration of one render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Iteration budget.
    pub max_iterations: u32,
    /// Image center.
    pub center: Complex<f64>,
    /// Half-width of the view.
    pub scale: f64,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Output file.
    pub output: String,
    /// Worker threads.
    pub threads: usize,
}

impl RenderConfig {
    /// From matches of `render_app`.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        RenderConfig {
            max_iterations: value_t_or_exit!(matches, MAX, u32),
            center: center(matches),
            scale: value_t_or_exit!(matches, SCALE, f64),
            width: value_t_or_exit!(matches, WIDTH, usize),
            height: value_t_or_exit!(matches, HEIGHT, usize),
            output: matches.value_of(OUTPUT).unwrap_or("mandel.bmp").to_string(),
            threads: value_t_or_exit!(matches, THREADS, usize),
        }
    }

    /// The request this configuration describes.
    pub fn request(&self) -> Result<RenderRequest, MandelError> {
        RenderRequest::centered(
            self.center,
            self.scale,
            self.width,
            self.height,
            self.max_iterations,
            self.threads,
        )
    }
}

/// Configuration of a zoom sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieConfig {
    /// What every frame shares.
    pub frame: FrameSettings,
    /// Zoom center.
    pub center: Complex<f64>,
    /// Scale of the last frame.
    pub goal_scale: f64,
    /// Number of frames.
    pub frames: usize,
    /// Frames in flight at once.
    pub processes: usize,
    /// Renderer to run, when not the default.
    pub renderer: Option<PathBuf>,
    /// Use threads instead of processes.
    pub in_process: bool,
}

impl MovieConfig {
    /// From matches of `movie_app`.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        MovieConfig {
            frame: FrameSettings {
                width: value_t_or_exit!(matches, WIDTH, usize),
                height: value_t_or_exit!(matches, HEIGHT, usize),
                max_iterations: value_t_or_exit!(matches, MAX, u32),
                threads: value_t_or_exit!(matches, THREADS, usize),
                output: matches.value_of(OUTPUT).unwrap_or("mandel").to_string(),
            },
            center: center(matches),
            goal_scale: value_t_or_exit!(matches, SCALE, f64),
            frames: value_t_or_exit!(matches, FRAMES, usize),
            processes: value_t_or_exit!(matches, PROCESSES, usize),
            renderer: matches.value_of(RENDERER).map(PathBuf::from),
            in_process: matches.is_present(IN_PROCESS),
        }
    }

    /// The zoom this configuration describes.
    pub fn sequence(&self) -> Result<FrameSequence, MandelError> {
        FrameSequence::new(self.center, START_SCALE, self.goal_scale, self.frames)
    }
}

/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Complains when more threads are asked for than there are cores.  It
/// still works; it just won't go any faster.
pub fn warn_if_oversubscribed(threads: usize) {
    let cpus = num_cpus::get();
    if threads > cpus {
        warn!("{} threads requested but only {} cpus available", threads, cpus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(args: &[&str]) -> Result<RenderConfig, clap::Error> {
        let mut argv = vec!["mandel"];
        argv.extend_from_slice(args);
        render_app()
            .get_matches_from_safe(argv)
            .map(|m| RenderConfig::from_matches(&m))
    }

    fn movie(args: &[&str]) -> Result<MovieConfig, clap::Error> {
        let mut argv = vec!["mandelmovie"];
        argv.extend_from_slice(args);
        movie_app()
            .get_matches_from_safe(argv)
            .map(|m| MovieConfig::from_matches(&m))
    }

    #[test]
    fn validate_range_accepts_and_rejects() {
        assert!(validate_range::<u64>("1", 1, "nan", "range").is_ok());
        assert_eq!(validate_range::<u64>("0", 1, "nan", "range"), Err("range".to_string()));
        assert_eq!(validate_range::<u64>("-3", 1, "nan", "range"), Err("nan".to_string()));
        assert_eq!(validate_range::<u64>("ten", 1, "nan", "range"), Err("nan".to_string()));
    }

    #[test]
    fn validate_positive_rejects_zero_and_junk() {
        assert!(validate_positive("0.0005", "bad").is_ok());
        assert!(validate_positive("0", "bad").is_err());
        assert!(validate_positive("-1", "bad").is_err());
        assert!(validate_positive("inf", "bad").is_err());
        assert!(validate_positive("x", "bad").is_err());
    }

    #[test]
    fn render_defaults() {
        let c = render(&[]).unwrap();
        assert_eq!(
            c,
            RenderConfig {
                max_iterations: 1000,
                center: Complex::new(0.0, 0.0),
                scale: 4.0,
                width: 500,
                height: 500,
                output: "mandel.bmp".to_string(),
                threads: 1,
            }
        );
    }

    #[test]
    fn render_accepts_negative_coordinates() {
        let c = render(&["-x", "-0.5", "-y", "-.665", "-s", ".05", "-m", "100", "-n", "4"]).unwrap();
        assert_eq!(c.center, Complex::new(-0.5, -0.665));
        assert_eq!(c.scale, 0.05);
        assert_eq!(c.max_iterations, 100);
        assert_eq!(c.threads, 4);
        assert!(c.request().is_ok());
    }

    #[test]
    fn render_rejects_empty_images_and_no_threads() {
        assert!(render(&["-W", "0"]).is_err());
        assert!(render(&["-H", "-2"]).is_err());
        assert!(render(&["-n", "0"]).is_err());
        assert!(render(&["-m", "0"]).is_err());
        assert!(render(&["-s", "0"]).is_err());
        assert!(render(&["-n", "1"]).is_ok());
    }

    #[test]
    fn help_flag_is_ours() {
        let m = render_app().get_matches_from_safe(vec!["mandel", "-h"]).unwrap();
        assert!(m.is_present(HELP));
    }

    #[test]
    fn movie_defaults() {
        let c = movie(&[]).unwrap();
        assert_eq!(c.center, Complex::new(-0.11275, 0.89223));
        assert_eq!(c.goal_scale, 0.00008);
        assert_eq!(c.frames, 50);
        assert_eq!(c.processes, 1);
        assert_eq!(c.frame.width, 1000);
        assert_eq!(c.frame.height, 1000);
        assert_eq!(c.frame.max_iterations, 900);
        assert_eq!(c.frame.threads, 1);
        assert_eq!(c.frame.output, "mandel");
        assert_eq!(c.renderer, None);
        assert!(!c.in_process);
        let seq = c.sequence().unwrap();
        assert_eq!(seq.len(), 50);
        assert_eq!(seq.frames().next().unwrap().scale, START_SCALE);
    }

    #[test]
    fn movie_options() {
        let c = movie(&[
            "-i", "5", "-p", "3", "-o", "zoom", "--renderer", "/opt/mandel", "--in-process",
        ])
        .unwrap();
        assert_eq!(c.frames, 5);
        assert_eq!(c.processes, 3);
        assert_eq!(c.frame.output, "zoom");
        assert_eq!(c.renderer, Some(PathBuf::from("/opt/mandel")));
        assert!(c.in_process);
    }

    #[test]
    fn movie_rejects_zero_counts() {
        assert!(movie(&["-i", "0"]).is_err());
        assert!(movie(&["-p", "0"]).is_err());
    }
}
