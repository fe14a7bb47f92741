use clap::Parser;
use log::{error, info};
use qsvk::config::KernelConfig;
use qsvk::gates::{self, control_mask, Gate};
use qsvk::instructions::parse_program;
use qsvk::runtime::QuantumState;
use qsvk::Result;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

const QSVK_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "qsvk", version = QSVK_VERSION,
    about = "qsvk - dense one- and two-qubit gate kernels for state-vector simulation.\n\
             Use 'qsvk help <command>' for more information on a specific command.",
    long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Runs a gate program on |0...0> and prints the resulting amplitudes.
    Run {
        /// Program file path
        program: String,
        /// Number of qubits in the state vector
        #[arg(long)]
        qubits: usize,
        /// JSON kernel config file
        #[arg(long)]
        config: Option<String>,
        /// Worker threads, overrides the config file
        #[arg(long)]
        threads: Option<usize>,
        /// Print the full state as JSON instead of the most likely basis states
        #[arg(long)]
        json: bool,
        /// How many basis states to print in text mode
        #[arg(long, default_value_t = 16)]
        top: usize,
    },
    /// Times repeated kernel calls on a random state.
    Bench {
        /// Number of qubits in the state vector
        #[arg(long)]
        qubits: usize,
        /// Target qubit (the high one for two-qubit gates)
        #[arg(long, default_value_t = 0)]
        target: usize,
        /// Second, low target qubit; selects the two-qubit kernel
        #[arg(long)]
        second: Option<usize>,
        /// Comma-separated control qubits
        #[arg(long, value_delimiter = ',')]
        controls: Vec<usize>,
        /// Kernel calls to time
        #[arg(long, default_value_t = 10)]
        repeat: usize,
        /// Worker threads
        #[arg(long)]
        threads: Option<usize>,
        /// Seed for the random state
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Prints the qsvk version.
    Version,
}

fn load_config(path: Option<&str>, threads: Option<usize>) -> Result<KernelConfig> {
    let mut cfg = match path {
        Some(p) => KernelConfig::load(p)?,
        None => KernelConfig::default(),
    };
    if threads.is_some() {
        cfg.threads = threads;
    }
    Ok(cfg)
}

fn basis_label(index: usize, num_qubits: usize) -> String {
    format!("|{:0width$b}>", index, width = num_qubits.max(1))
}

fn run_program(
    path: &str,
    qubits: usize,
    config: KernelConfig,
    json: bool,
    top: usize,
) -> Result<()> {
    let src = fs::read_to_string(path)?;
    let program = parse_program(&src)?;
    info!("parsed {} instructions from {}", program.len(), path);

    let mut state = QuantumState::new(qubits)?.with_config(config)?;
    let start = Instant::now();
    state.execute(&program)?;
    info!(
        "applied {} gates to {} amplitudes in {:.3?}",
        program.len(),
        state.len(),
        start.elapsed()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &state.snapshot())?;
        writeln!(out)?;
        return Ok(());
    }

    let probs = state.probabilities();
    let mut order: Vec<usize> = (0..probs.len()).filter(|&i| probs[i] > 0.0).collect();
    order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]).then(a.cmp(&b)));
    for &i in order.iter().take(top) {
        let amp = state.amplitudes()[i];
        writeln!(
            out,
            "{}  {:+.6} {:+.6}i  p={:.6}",
            basis_label(i, qubits),
            amp.re,
            amp.im,
            probs[i]
        )?;
    }
    Ok(())
}

fn bench(
    qubits: usize,
    target: usize,
    second: Option<usize>,
    controls: &[usize],
    repeat: usize,
    config: KernelConfig,
    seed: u64,
) -> Result<()> {
    let mut state = QuantumState::random(qubits, seed)?.with_config(config)?;

    let gate = match second {
        Some(low) => Gate::two(target, low, gates::kron(&gates::rx(0.3), &gates::ry(1.1))),
        None => Gate::single(target, gates::rx(0.3)),
    };
    state.check_gate(&gate, controls)?;
    info!(
        "benchmarking {:?} on {} qubits, control mask {:#b}, {} repeats",
        gate.targets(),
        qubits,
        control_mask(controls),
        repeat
    );

    let start = Instant::now();
    for _ in 0..repeat {
        state.apply(&gate, controls)?;
    }
    let elapsed = start.elapsed();
    let per_call = elapsed / repeat.max(1) as u32;
    let throughput = state.len() as f64 * repeat as f64 / elapsed.as_secs_f64().max(f64::MIN_POSITIVE);
    println!(
        "{} calls in {:.3?} ({:.3?} per call, {:.3e} amplitudes/s)",
        repeat, elapsed, per_call, throughput
    );
    Ok(())
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            program,
            qubits,
            config,
            threads,
            json,
            top,
        } => {
            let cfg = load_config(config.as_deref(), threads)?;
            run_program(&program, qubits, cfg, json, top)
        }
        Commands::Bench {
            qubits,
            target,
            second,
            controls,
            repeat,
            threads,
            seed,
        } => {
            let cfg = load_config(None, threads)?;
            bench(qubits, target, second, &controls, repeat, cfg, seed)
        }
        Commands::Version => {
            println!("qsvk {}", QSVK_VERSION);
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}
