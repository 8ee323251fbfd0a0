//! CRDT benchmark plotting CLI entry point.

fn main() {
    if let Err(e) = crdt_bench_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
