use clap::{ArgAction, Parser, Subcommand};
use rayon::prelude::*;
use std::path::PathBuf;

use vmm::{
    MemorySwap, PolicyKind, SimConfig, SimError, Simulator, Statistics, VirtualAddress,
};

mod console;
mod trace;

use console::Console;
use trace::TraceRecord;

#[derive(Parser)]
#[command(name = "vmsim")]
#[command(about = "Demand paging simulator driven by memory reference traces")]
struct Args {
    /// Increase log verbosity (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a trace through one replacement policy
    Run {
        #[command(flatten)]
        machine: MachineArgs,

        /// Replacement policy (fifo, lru, clock or opt)
        #[arg(short = 'a', long)]
        policy: PolicyKind,

        /// Print the page table after the run
        #[arg(long)]
        dump: bool,

        /// Treat freshly zero-filled pages as dirty
        #[arg(long)]
        zero_fill_dirty: bool,
    },
    /// Replay a trace through every replacement policy side by side
    Compare {
        #[command(flatten)]
        machine: MachineArgs,
    },
}

#[derive(clap::Args)]
struct MachineArgs {
    /// Memory reference trace file
    #[arg(short = 'f', long)]
    trace: PathBuf,

    /// Number of physical frames
    #[arg(short = 'm', long)]
    frames: usize,

    /// Number of swap slots
    #[arg(short = 's', long, value_parser = parse_swap_slots)]
    swap_slots: usize,
}

fn parse_swap_slots(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("swap must have at least one slot".to_string()),
        Ok(slots) => Ok(slots),
        Err(err) => Err(err.to_string()),
    }
}

/// Replays `records` through a fresh simulator running `kind`.
fn simulate(
    config: SimConfig,
    kind: PolicyKind,
    swap_slots: usize,
    records: &[TraceRecord],
) -> Result<Simulator<MemorySwap>, SimError> {
    let future: Vec<VirtualAddress> = if kind.needs_future() {
        records.iter().map(|record| record.address).collect()
    } else {
        Vec::new()
    };

    let mut sim = Simulator::new(
        config,
        kind.build(config.frames, &future),
        MemorySwap::new(swap_slots),
    )?;
    sim.run(records.iter().map(|record| (record.address, record.kind)))?;
    Ok(sim)
}

fn load_trace(machine: &MachineArgs) -> Result<Vec<TraceRecord>, Box<dyn std::error::Error>> {
    let records = trace::load(&machine.trace)?;
    log::info!(
        "loaded {} references from {}",
        records.len(),
        machine.trace.display()
    );
    Ok(records)
}

fn run(
    machine: MachineArgs,
    policy: PolicyKind,
    dump: bool,
    zero_fill_dirty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_trace(&machine)?;
    let config = SimConfig::new(machine.frames).with_zero_fill_dirty(zero_fill_dirty);
    let sim = simulate(config, policy, machine.swap_slots, &records)?;

    if dump {
        print!("{}", sim.page_directory());
    }

    let swap = sim.swap();
    println!("Policy: {}", policy);
    println!(
        "Memory: {} frames ({} bytes)",
        config.frames,
        config.memory_size()
    );
    println!(
        "Swap: {} of {} slots used, {} pageouts, {} pageins",
        swap.used_slots(),
        swap.capacity(),
        swap.pageouts(),
        swap.pageins()
    );
    println!("{}", sim.statistics());
    Ok(())
}

fn compare(machine: MachineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_trace(&machine)?;
    let config = SimConfig::new(machine.frames);

    let results = PolicyKind::ALL
        .par_iter()
        .map(|&kind| {
            let sim = simulate(config, kind, machine.swap_slots, &records)?;
            Ok((kind, *sim.statistics()))
        })
        .collect::<Result<Vec<(PolicyKind, Statistics)>, SimError>>()?;

    println!(
        "{} references, {} frames",
        records.len(),
        config.frames
    );
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "policy", "hits", "misses", "clean", "dirty", "hit rate"
    );
    for (kind, stats) in results {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>10} {:>9.4}%",
            kind.name(),
            stats.hits(),
            stats.misses(),
            stats.evict_clean(),
            stats.evict_dirty(),
            stats.hit_rate()
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    Console::init(Console::level_for(args.verbose))?;

    match args.command {
        Command::Run {
            machine,
            policy,
            dump,
            zero_fill_dirty,
        } => run(machine, policy, dump, zero_fill_dirty),
        Command::Compare { machine } => compare(machine),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use vmm::AccessKind;

    fn records(raw: &[(AccessKind, usize)]) -> Vec<TraceRecord> {
        raw.iter()
            .map(|&(kind, address)| TraceRecord {
                kind,
                address: VirtualAddress::new(address),
            })
            .collect()
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_run_options() {
        let args = Args::try_parse_from([
            "vmsim", "run", "-f", "trace.txt", "-m", "8", "-s", "64", "-a", "clock", "--dump",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Run {
                machine,
                policy,
                dump,
                zero_fill_dirty,
            } => {
                assert_eq!(machine.frames, 8);
                assert_eq!(machine.swap_slots, 64);
                assert_eq!(policy, PolicyKind::Clock);
                assert!(dump);
                assert!(!zero_fill_dirty);
            }
            Command::Compare { .. } => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn rejects_empty_swap_and_unknown_policy() {
        assert!(
            Args::try_parse_from(["vmsim", "compare", "-f", "t", "-m", "4", "-s", "0"]).is_err()
        );
        assert!(
            Args::try_parse_from(["vmsim", "run", "-f", "t", "-m", "4", "-s", "8", "-a", "rand"])
                .is_err()
        );
    }

    #[test]
    fn simulate_builds_opt_from_trace() {
        let trace = records(&[
            (AccessKind::Load, 0x1000),
            (AccessKind::Load, 0x2000),
            (AccessKind::Load, 0x3000),
            (AccessKind::Load, 0x1000),
        ]);
        let sim = simulate(SimConfig::new(2), PolicyKind::Opt, 8, &trace).unwrap();

        // Page 2 is never used again, so page 1 survives the third fault.
        assert_eq!(sim.statistics().hits(), 1);
        assert_eq!(sim.statistics().misses(), 3);
    }

    #[test]
    fn simulate_rejects_zero_frames() {
        let trace = records(&[(AccessKind::Load, 0x1000)]);
        assert_eq!(
            simulate(SimConfig::new(0), PolicyKind::Fifo, 8, &trace).err(),
            Some(SimError::InvalidFrameCount(0))
        );
    }
}
