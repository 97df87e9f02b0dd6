//! Soma Cube Solver
//!
//! Reads figure files and prints the ways the seven Soma pieces fill each
//! figure. By default only the first solution is printed, and rotated or
//! mirrored copies of earlier solutions are skipped.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{debug, warn};

use soma::figure::FigureSpec;
use soma::{DepthStatistics, PieceOrder, SolverConfig, Soma, StepMask};

const LONG_ABOUT: &str = "\
Solves Soma cube figures of 27 cubicles.

A figure file draws the figure as Z slices, top slice first, separated by
blank lines. Each slice is drawn as lines of characters, top line first:
'.' or space is no cubicle, one of 'cpnztl3' is a cubicle holding that
pre-placed piece, anything else (conventionally 'o') is a free cubicle.
'#' comments out the rest of a line. Use '-' to read standard input.

The search places pieces in the order given by -P, one per step 1 to 7.
-O, -D and -S take a list of steps (e.g. \"17\", or \"0\" for none):
  -O  after placing these pieces, reject empty cubicles no piece can fill
  -D  after placing these pieces, reject rotations or mirror images of
      partial figures already tried (7 checks complete solutions)
  -S  before placing these pieces, skip cubicles symmetric to earlier ones
The defaults find each distinct solution once.";

/// Solves Soma cube figures.
#[derive(Parser, Debug)]
#[command(name = "soma")]
#[command(author, version, about, long_about = LONG_ABOUT)]
struct Cli {
    /// Figure files ("-" for standard input).
    #[arg(required = true)]
    files: Vec<String>,

    /// Print all solutions, not only the first.
    #[arg(short, long)]
    all: bool,

    /// Include rotated and mirrored copies of solutions.
    #[arg(short, long)]
    rotations: bool,

    /// Only count solutions (implies --all).
    #[arg(short, long)]
    count: bool,

    /// Print the solving time.
    #[arg(short, long)]
    time: bool,

    /// Print each file name before its solutions.
    #[arg(short, long)]
    names: bool,

    /// Write to FILE instead of standard output.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Steps with orphan checks.
    #[arg(short = 'O', value_name = "STEPS", default_value = "123456")]
    orphans: StepMask,

    /// Steps with duplicate checks.
    #[arg(short = 'D', value_name = "STEPS", default_value = "17")]
    duplicates: StepMask,

    /// Steps with symmetry checks.
    #[arg(short = 'S', value_name = "STEPS", default_value = "0")]
    symmetries: StepMask,

    /// Piece placement order.
    #[arg(short = 'P', value_name = "ORDER", default_value = "ztcpnl3")]
    order: PieceOrder,

    /// Print placement statistics per step.
    #[arg(short, long)]
    stats: bool,

    /// Read coordinate-list files, and print coordinates of solutions.
    #[arg(long)]
    coords: bool,
}

impl Cli {
    fn config(&self) -> SolverConfig {
        let config = SolverConfig {
            orphans: self.orphans,
            duplicates: self.duplicates,
            symmetries: self.symmetries,
            piece_order: self.order,
        };
        if self.rotations {
            config.with_all_rotations()
        } else {
            config
        }
    }

    fn all_solutions(&self) -> bool {
        self.all || self.count
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(err) => {
                eprintln!("Failed to open {}: {}", path.display(), err);
                return ExitCode::from(2);
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Solves every file named on the command line.
fn run(cli: &Cli, out: &mut impl Write) -> soma::Result<()> {
    let config = cli.config();
    if cli.all_solutions() {
        for warning in config.warnings() {
            warn!("{}", warning);
        }
    }

    let mut soma = Soma::new(config);
    for name in &cli.files {
        let text = match read_figure(name) {
            Ok(text) => text,
            Err(err) => {
                debug!("reading {}: {}", name, err);
                writeln!(out, "Can't open file {} for input", name)?;
                if !cli.count {
                    writeln!(out)?;
                }
                continue;
            }
        };
        if cli.names {
            writeln!(out, "{}:", name)?;
        }
        solve_figure(&mut soma, &text, cli, out)?;
    }
    out.flush()?;
    Ok(())
}

fn read_figure(name: &str) -> io::Result<String> {
    let mut text = String::new();
    if name == "-" {
        io::stdin().read_to_string(&mut text)?;
    } else {
        File::open(name)?.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Loads one figure and prints its solutions. A figure that cannot be
/// loaded prints the reason and is skipped.
fn solve_figure(soma: &mut Soma, text: &str, cli: &Cli, out: &mut impl Write) -> io::Result<()> {
    let loaded = if cli.coords {
        FigureSpec::parse_coordinate_list(text).and_then(|spec| soma.load(&spec))
    } else {
        soma.load_figure(text)
    };
    if let Err(err) = loaded {
        writeln!(out, "{}", err)?;
        return Ok(());
    }

    let start = Instant::now();
    let mut found = 0u64;
    while soma.solve() {
        found += 1;
        if !cli.count {
            let solution = soma.current_solution();
            writeln!(out, "{}", solution)?;
            if cli.coords {
                writeln!(out, "{}", solution.coordinate_list())?;
            }
        }
        if !cli.all_solutions() {
            break;
        }
    }
    let elapsed = start.elapsed();

    if found == 0 {
        writeln!(out, "no solution")?;
        writeln!(out, "{}", soma.current_solution())?;
    }
    if cli.all_solutions() {
        let plural = if found == 1 { "" } else { "s" };
        writeln!(out, "{} solution{}", found, plural)?;
    }
    if cli.time {
        writeln!(out, "solved in {:.3?}", elapsed)?;
    }
    if cli.stats {
        write_statistics(&soma.statistics(), out)?;
    }
    Ok(())
}

fn write_statistics(stats: &[DepthStatistics], out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "step piece orients   valid  success  failure duplicate   orphan  primary  symdup"
    )?;
    for (depth, step) in stats.iter().enumerate() {
        let placements = &step.placements;
        writeln!(
            out,
            "{:>4} {:>5} {:>7} {:>7} {:>8} {:>8} {:>9} {:>8} {:>8} {:>7}",
            depth + 1,
            step.piece.name(),
            step.orientations,
            placements.valid_orientations,
            placements.successes,
            placements.failures,
            placements.duplicates,
            placements.orphans,
            step.statuses.primary,
            step.statuses.duplicate,
        )?;
    }
    Ok(())
}
