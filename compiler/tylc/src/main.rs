//! tylc: type layout explorer CLI.

use tylc::{build_reports, init_tracing, parse_args, render, render_list, Catalogue, Entry};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    let (options, names) = match parse_args(args.iter().skip(2).map(String::as_str)) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(1);
        }
    };

    let catalogue = Catalogue::builtin();

    match command {
        "list" => print!("{}", render_list(catalogue.entries())),
        "show" => {
            if names.is_empty() {
                eprintln!("Usage: tylc show <name|topic>... [options]");
                std::process::exit(1);
            }

            let mut selected: Vec<&Entry> = Vec::new();
            for name in &names {
                let hits = catalogue.lookup(name);
                if hits.is_empty() {
                    eprintln!("error: no catalogue type or topic named `{name}`");
                    eprintln!("Run `tylc list` to see what is available.");
                    std::process::exit(1);
                }
                for hit in hits {
                    if !selected.iter().any(|e| e.ty == hit.ty) {
                        selected.push(hit);
                    }
                }
            }
            print_reports(&catalogue, &selected, &options);
        }
        "all" => {
            let all: Vec<&Entry> = catalogue.entries().iter().collect();
            print_reports(&catalogue, &all, &options);
        }
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_reports(catalogue: &Catalogue, entries: &[&Entry], options: &tylc::Options) {
    let reports = build_reports(catalogue.pool(), entries, options);
    match render(&reports, options) {
        Ok(text) => print!("{text}"),
        Err(err) => {
            eprintln!("error: cannot render reports: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("tylc - type layout explorer");
    println!();
    println!("Usage: tylc <command> [options]");
    println!();
    println!("Commands:");
    println!("  list                  List catalogue types by topic");
    println!("  show <name|topic>...  Show layout and classification of the named types");
    println!("  all                   Show every catalogue type");
    println!("  help                  Show this message");
    println!();
    println!("Options:");
    println!("  --target=<model>      Target model: lp64 (default), ilp32");
    println!("  --reuse-tail-padding  Place members in the tail padding of non-POD bases");
    println!("  --format=<format>     Output format: text (default), json");
    println!();
    println!("Set RUST_LOG=tyl_layout=debug to trace the layout engine.");
}
