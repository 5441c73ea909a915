use mazebench::observer::SimulationAdapter;
use mazebench::prelude::*;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }

    let result = match args.get(1).map(String::as_str) {
        None | Some("compare") => run_compare(),
        Some("run") => match args.get(2) {
            Some(name) => run_single(name, args.get(3).map(String::as_str)),
            None => {
                eprintln!("run needs a strategy name");
                print_help();
                std::process::exit(2);
            }
        },
        Some("list") => {
            list();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("mazebench (maze strategy comparison)");
    println!("usage:");
    println!("  cargo run");
    println!("  cargo run -- compare");
    println!("  cargo run -- run <strategy> [given|surprise]");
    println!("  cargo run -- list");
    println!("  cargo run -- --help");
}

fn list() {
    let registry = StrategyRegistry::with_builtins();
    for e in registry.entries() {
        println!("  {:<22} {}", e.name, e.description);
    }
}

fn run_compare() -> Result<(), Box<dyn std::error::Error>> {
    let mazes = builtin::all()?;
    let registry = StrategyRegistry::with_builtins();
    let report = compare(&registry, &mazes, &HarnessConfig::default())?;

    for maze in &mazes {
        println!(
            "maze={} size={} dead_ends={} par={} budget={}",
            maze.name(),
            maze.size(),
            maze.total_dead_ends(),
            maze.min_steps(),
            maze.max_steps()
        );
    }
    println!();
    print!("{}", report.render_table());
    Ok(())
}

fn run_single(name: &str, maze_name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let maze_name = maze_name.unwrap_or(builtin::GIVEN);
    let maze = builtin::by_name(maze_name).ok_or_else(|| format!("unknown maze: {maze_name}"))??;
    let registry = StrategyRegistry::with_builtins();
    let strategy = registry.create(name, &StrategyOptions::default())?;

    let mut sim = Simulation::new(&maze, strategy);
    let cap = maze.max_steps() * 2;
    let mut iterations = 0;
    while !sim.is_finished() && iterations < cap {
        for f in sim.advance(1) {
            println!(
                "step={:4} pos={:3} facing={} walls={} move={:<7} {}",
                f.step,
                f.pos,
                f.facing.letter(),
                f.sensors.bits(),
                f.mv.as_str(),
                f.explanation
            );
        }
        iterations += 1;
    }
    let trace = sim.run(cap);
    println!(
        "status={} steps={} dead_ends={}/{} score={:.3}/{}",
        trace.status,
        trace.steps,
        trace.dead_ends_found(),
        maze.total_dead_ends(),
        trace.score,
        maze.max_score()
    );
    let snap = SimulationAdapter::new(&sim).snapshot();
    println!(
        "coverage={:.1}% strategy: {}",
        snap.coverage * 100.0,
        snap.strategy.detail
    );
    Ok(())
}
