use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use parastar::domains::generator::{MazeOptions, generate_maze, generate_puzzle};
use parastar::domains::{EightPuzzle, Maze, NumberLink, PuzzleInstance};
use parastar::search::{self, ParallelConfig, SearchConfig, SearchResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "parastar")]
#[command(about = "parastar - parallel A* puzzle solver")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Enable informational logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an 8-puzzle instance
    Puzzle(SolveArgs),
    /// Solve a maze instance
    Maze(SolveArgs),
    /// Solve a number link instance
    Numberlink(SolveArgs),
    /// Generate a random instance
    Generate {
        #[command(subcommand)]
        kind: GenerateKind,
    },
}

#[derive(ClapArgs)]
struct SolveArgs {
    /// Instance file
    file: PathBuf,
    /// Number of worker threads (0 = sequential search)
    #[arg(short = 'n', long, default_value = "0")]
    workers: usize,
    /// Stop at the first solution found (parallel search only)
    #[arg(short = 'p', long)]
    first: bool,
    /// Report statistics as a single CSV line
    #[arg(short = 'r', long, conflicts_with = "json")]
    csv: bool,
    /// Report statistics as JSON
    #[arg(long)]
    json: bool,
    /// Print the solution path
    #[arg(short = 's', long)]
    show_solution: bool,
    /// Timeout in seconds for the search
    #[arg(long)]
    timeout: Option<u64>,
    /// Maximum number of distinct states to store
    #[arg(long)]
    max_states: Option<usize>,
    /// Maximum number of search nodes to create
    #[arg(long)]
    max_nodes: Option<usize>,
}

#[derive(Subcommand)]
enum GenerateKind {
    /// Shuffle the solved 8-puzzle with random blank moves
    Puzzle {
        /// Number of random moves
        #[arg(long, default_value = "100")]
        moves: usize,
        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Carve a random maze
    Maze {
        /// Maze width in cells; even values round up to the next odd width
        #[arg(long, default_value = "21")]
        width: usize,
        /// Maze height in cells; even values round up to the next odd height
        #[arg(long, default_value = "21")]
        height: usize,
        /// Extra interior walls to remove, creating loops
        #[arg(long, default_value = "0")]
        remove_walls: usize,
        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl SolveArgs {
    fn search_config(&self) -> SearchConfig {
        let mut config =
            SearchConfig::default().with_timeout_option(self.timeout.map(Duration::from_secs));
        config.max_states = self.max_states;
        config.max_nodes = self.max_nodes;
        config
    }

    fn parallel_config(&self) -> Option<ParallelConfig> {
        (self.workers > 0).then(|| {
            ParallelConfig::default()
                .with_workers(self.workers)
                .with_stop_on_first_solution(self.first)
        })
    }
}

// --- Solving ---

fn solve_instance<P: PuzzleInstance>(args: &SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let instance = P::load(&args.file)?;
    let initial = instance.initial_state();
    let goal = instance.goal_state();

    let search_config = args.search_config();
    let parallel_config = args.parallel_config();
    match &parallel_config {
        Some(config) => info!(
            "solving {} instance {} with {} workers",
            P::NAME,
            args.file.display(),
            config.num_workers
        ),
        None => info!(
            "solving {} instance {} sequentially",
            P::NAME,
            args.file.display()
        ),
    }

    let result = search::solve(
        &instance,
        &initial,
        goal.as_deref(),
        &search_config,
        parallel_config.as_ref(),
    )?;

    print_report(&instance, &result, args)
}

fn print_report<P: PuzzleInstance>(
    instance: &P,
    result: &SearchResult,
    args: &SolveArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.csv {
        println!("{}", result.csv_line());
    } else if args.json {
        println!("{}", result.to_json()?);
    } else {
        print!("{}", result.format_summary());
    }

    if args.show_solution {
        match &result.solution {
            Some(solution) => {
                println!("Solution ({} steps):", solution.steps());
                print!("{}", instance.render_solution(&solution.path));
            }
            None => println!("No solution to show"),
        }
    }
    Ok(())
}

// --- Generation ---

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    }
}

fn write_output(text: &str, output: Option<&PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn generate(kind: &GenerateKind) -> Result<(), Box<dyn std::error::Error>> {
    match kind {
        GenerateKind::Puzzle {
            moves,
            seed,
            output,
        } => {
            let text = generate_puzzle(*moves, &mut seeded_rng(*seed));
            write_output(&text, output.as_ref())
        }
        GenerateKind::Maze {
            width,
            height,
            remove_walls,
            seed,
            output,
        } => {
            let options = MazeOptions::default()
                .with_size(width / 2, height / 2)
                .with_remove_walls(*remove_walls);
            let text = generate_maze(&options, &mut seeded_rng(*seed));
            write_output(&text, output.as_ref())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let outcome = match &args.command {
        Commands::Puzzle(solve) => solve_instance::<EightPuzzle>(solve),
        Commands::Maze(solve) => solve_instance::<Maze>(solve),
        Commands::Numberlink(solve) => solve_instance::<NumberLink>(solve),
        Commands::Generate { kind } => generate(kind),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
