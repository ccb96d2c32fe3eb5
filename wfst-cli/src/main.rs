//! A small driver binary around `wfst-core`/`wfst-regex`, in the shape of
//! the teacher's `mixtec_fst` binary: load a script, compile it to an FST,
//! optionally run an extra determinize/minimize pass, dump AT&T text, and
//! check it against a CSV table of expected input/output pairs.

mod script;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use itertools::enumerate;
use wfst_core::Fst;

#[derive(Parser)]
#[command(about = "Compile a regex/variable script into a WFST and inspect it")]
struct Args {
    /// Script path, or "-" to read from stdin. See `script` module for the
    /// `name = expr;` / bare-expression grammar.
    script: PathBuf,

    /// Write the AT&T text dump here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// CSV file of `input,output` pairs to check against the compiled FST.
    #[arg(short, long)]
    test: Option<PathBuf>,

    /// Skip the extra minimize pass after script compilation (the script
    /// compiler already trims/pushes/minimizes once per `spec.md` §4.9;
    /// this controls only the CLI's *additional* pass).
    #[arg(long)]
    no_min: bool,

    /// Use DFA-style determinization (`determinize_as_dfa`) for the extra
    /// pass instead of the default weighted determinize.
    #[arg(long)]
    dfa: bool,

    /// Print this many cheapest accepted paths (via `words_nbest`) instead
    /// of (or in addition to) the AT&T dump.
    #[arg(long)]
    nbest: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
struct Entry {
    input: String,
    output: String,
}

fn read_script(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Does `fst` map `input` to `output` on some path? Exhaustive over the
/// first `LIMIT` cheapest paths, which is sufficient for acyclic test
/// transducers; cyclic ones should be trimmed/bounded by the caller.
fn accepts_pair(fst: &Fst, input: &str, output: &str) -> bool {
    const LIMIT: usize = 50_000;
    for (_, labels) in fst.words_cheapest().take(LIMIT) {
        let got_in: String = labels.iter().map(|l| l.0[0].as_ref()).collect();
        let got_out: String = labels.iter().map(|l| l.last().as_ref()).collect();
        if got_in == input && got_out == output {
            return true;
        }
    }
    false
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let source = read_script(&args.script)?;
    println!("Parsing script...");
    let (defined, final_expr) = script::parse_script(&source)?;

    println!("Compiling {} definition(s) and the top-level expression...", defined.len());
    let mut fst = wfst_regex::regex(&final_expr, &defined, &std::collections::HashMap::new())
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if !args.no_min {
        println!("{}", "Running extra minimize pass...".dimmed());
        fst = if args.dfa { fst.determinize_as_dfa() } else { fst.determinize_unweighted() };
        fst = fst.minimize();
    }

    println!("Compiled FST: {} states, {} final.", fst.num_states(), fst.finals.len());

    if let Some(n) = args.nbest {
        for (i, (cost, labels)) in enumerate(fst.words_nbest(n)) {
            let rendered: Vec<String> = labels
                .iter()
                .map(|l| format!("({})", l.0.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(":")))
                .collect();
            let cost_str = format!("{cost:?}");
            println!("{}. {} {}", i + 1, cost_str.as_str().dimmed(), rendered.join(" "));
        }
    }

    match &args.out {
        Some(path) => {
            fst.write_att(path)?;
            println!("Wrote AT&T dump to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout();
            write!(stdout, "{fst}")?;
        }
    }

    if let Some(testfile) = &args.test {
        let mut reader = csv::Reader::from_path(testfile)?;
        let mut failures = 0usize;
        let mut total = 0usize;
        for record in reader.deserialize() {
            let entry: Entry = record?;
            total += 1;
            if accepts_pair(&fst, &entry.input, &entry.output) {
                println!("{} -> {} {}", entry.input, entry.output, "OK".green());
            } else {
                println!("{} -> {} {}", entry.input, entry.output, "FAILED".red());
                failures += 1;
            }
        }
        println!("{}/{} test cases passed", total - failures, total);
        if failures > 0 {
            let mut log = File::create("wfst-test-failures.log")?;
            writeln!(log, "{failures} of {total} cases failed")?;
        }
    }

    Ok(())
}
