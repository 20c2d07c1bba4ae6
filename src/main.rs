use clap::{Arg, ArgAction, Command};
use color_eyre::eyre::{eyre, Result};
use fasim::checker::{self, check_all};
use fasim::fa::FA;
use fasim::loader::{load_automaton, AutomatonKind, Description};
use fasim::visualizer;
use std::io::{self, BufRead};
use std::path::PathBuf;

fn verdict_line(fa: &dyn FA, input: &str) -> String {
    let input = input.trim_end_matches(['\r', '\n']);
    let verdict = if fa.accept(input) {
        "accepted"
    } else {
        "rejected"
    };
    format!("Line {} is {}", input, verdict)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Command::new("fasim")
                        .version("1.0")
                        .author("Nagendra Kumar Jamadagni")
                        .about("Runs deterministic and nondeterministic finite automata described by transition tables")
                        .arg(
                            Arg::new("file")
                                .short('f')
                                .long("file")
                                .help("The automaton description. Files ending in .json are read as saved JSON, anything else as a transition table")
                                .value_name("DESCRIPTION FILE")
                                .value_parser(clap::value_parser!(PathBuf))
                                .required(true)
                        )
                        .arg(
                            Arg::new("automaton")
                                .short('a')
                                .long("automaton")
                                .help("Which engine to build the description into")
                                .value_name("DFA, NFA")
                                .default_value("DFA")
                                .value_parser(clap::value_parser!(String))
                                .num_args(1)
                        )
                        .arg(
                            Arg::new("check")
                                .short('k')
                                .long("check")
                                .help("Check whether every string of length K is accepted. May be repeated")
                                .value_name("K")
                                .action(ArgAction::Append)
                                .value_parser(clap::value_parser!(usize))
                        )
                        .arg(
                            Arg::new("string")
                                .short('s')
                                .long("string")
                                .help("Report whether the string is accepted. May be repeated")
                                .value_name("STRING")
                                .action(ArgAction::Append)
                                .value_parser(clap::value_parser!(String))
                        )
                        .arg(
                            Arg::new("lines")
                                .short('l')
                                .long("lines")
                                .help("Read strings from standard input, one per line, and report whether each is accepted")
                                .action(ArgAction::SetTrue)
                        )
                        .arg(
                            Arg::new("save-json")
                                .short('j')
                                .long("save-json")
                                .help("Save the loaded automaton as JSON")
                                .value_name("JSON FILE")
                                .value_parser(clap::value_parser!(PathBuf))
                        )
                        .arg(
                            Arg::new("save-dot")
                                .short('d')
                                .long("save-dot")
                                .help("Save a Graphviz rendering of the automaton as NAME.dot and NAME.jpg")
                                .value_name("NAME")
                                .value_parser(clap::value_parser!(String))
                        )
                        .arg(
                            Arg::new("visualize")
                                .short('v')
                                .long("visualize")
                                .help("Visualize the automaton inside an interactive window that allows for zooming, panning and clicking of elements")
                                .action(ArgAction::SetTrue)
                        )
                        .get_matches();

    let file_path = args
        .get_one::<PathBuf>("file")
        .ok_or_else(|| eyre!("Error: Description file not provided!"))?;

    let kind = match args.get_one::<String>("automaton") {
        Some(str) if str.eq_ignore_ascii_case("nfa") => AutomatonKind::NFA,
        Some(str) if str.eq_ignore_ascii_case("dfa") => AutomatonKind::DFA,
        None => AutomatonKind::DFA,
        Some(str) => return Err(eyre!("automaton should be one of DFA | NFA, found {}", str)),
    };

    let fa = load_automaton(file_path, kind)?;

    if let Some(json_path) = args.get_one::<PathBuf>("save-json") {
        Description::from_fa(fa.as_ref()).save_json(json_path)?;
        println!("{} saved as {}", fa.kind(), json_path.display());
    }

    if let Some(name) = args.get_one::<String>("save-dot") {
        fa.show_fa(name)?;
    }

    let mut queried = false;

    if let Some(strings) = args.get_many::<String>("string") {
        queried = true;
        for string in strings {
            println!("{}", verdict_line(fa.as_ref(), string));
        }
    }

    if let Some(ks) = args.get_many::<usize>("check") {
        queried = true;
        for k in ks {
            let report = check_all(fa.as_ref(), *k)?;
            println!("{}", report.verdict(fa.kind()));
        }
    }

    if args.get_flag("lines") {
        queried = true;
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            println!("{}", verdict_line(fa.as_ref(), &line));
        }
    }

    if args.get_flag("visualize") {
        visualizer::visualize(fa.as_ref())?;
    } else if !queried {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        checker::run_interactive(fa.as_ref(), stdin.lock(), &mut stdout)?;
    }

    Ok(())
}
