//! Command line front end: reads boards, words or candidate boards from
//! standard input (one per line) and writes one result per line to
//! standard output.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use wordgrid_solver::{
    dedup_solutions, generate_board, generate_simple_board, Board, Config, Error,
    GenerationMethod, RuleSet, SolutionAnalysis, Solver, Validator,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("wordgrid", String::as_str);
    if args.len() < 3 {
        bail!("Usage: {} config-file command options", program);
    }

    let config = Config::from_file(&args[1])?;
    let command = args[2].as_str();

    match command {
        "score" => {
            if args.len() != 4 {
                bail!("Usage: {} config-file score {{game-type}}", program);
            }
            let rules = config.rule_set(&args[3])?;
            score_boards(&rules)
        }
        "solve" | "solve-dups" => {
            if args.len() < 4 || args.len() > 7 {
                bail!(
                    "Usage: {} config-file solve {{game-type}} [format [prefix [suffix]]]",
                    program
                );
            }
            let rules = config.rule_set(&args[3])?;
            let fmt = arg_or_preference(&args, 4, &rules, "SolutionFormat");
            let prefix = arg_or_preference(&args, 5, &rules, "SolutionPrefix");
            let suffix = arg_or_preference(&args, 6, &rules, "SolutionSuffix");
            solve_boards(&rules, &fmt, command == "solve-dups", &prefix, &suffix)
        }
        "analyze" => {
            if args.len() < 4 || args.len() > 6 {
                bail!(
                    "Usage: {} config-file analyze {{game-type}} [format] [dump-words]",
                    program
                );
            }
            let rules = config.rule_set(&args[3])?;
            let fmt = arg_or_preference(&args, 4, &rules, "AnalysisFormat");
            let dump_words = args.get(5).map_or(false, |arg| arg == "dump-words");
            analyze_boards(&rules, &fmt, dump_words)
        }
        "create" => {
            if args.len() < 4 || args.len() > 8 {
                bail!(
                    "Usage: {} config-file create {{game-type}} [boards [min-words [min-score [minimize]]]]",
                    program
                );
            }
            let rules = config.rule_set(&args[3])?;
            let boards = parse_count(&args, 4, 1)?;
            let min_words = parse_count(&args, 5, 0)?;
            let min_score = parse_count(&args, 6, 0)?;
            let reverse_target = args.get(7).map_or(false, |arg| arg == "minimize");
            create_boards(&rules, boards, min_words, min_score, reverse_target)
        }
        "check-word" | "check-board" => {
            if args.len() < 4 || args.len() > 5 {
                bail!(
                    "Usage: {} config-file {} {{game-type}} [stats{}]",
                    program,
                    command,
                    if command == "check-word" { "|verbose" } else { "" }
                );
            }
            let rules = config.rule_set(&args[3])?;
            let verbosity = match args.get(4).map(String::as_str) {
                None => 0,
                Some("stats") => 1,
                Some("verbose") if command == "check-word" => 2,
                Some(option) => bail!("Unknown verbosity option '{}'", option),
            };
            check_candidates(&rules, command == "check-word", verbosity)
        }
        _ => bail!("'{}' is not a valid command", command),
    }
}

/// Command line argument `index` if given, else the named preference.
fn arg_or_preference(args: &[String], index: usize, rules: &RuleSet, key: &str) -> String {
    match args.get(index) {
        Some(arg) => arg.clone(),
        None => String::from(rules.preferences.preference(key)),
    }
}

fn parse_count(args: &[String], index: usize, default: usize) -> Result<usize> {
    match args.get(index) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("'{}' is not a valid count", arg)),
        None => Ok(default),
    }
}

/// Load the game dictionary into a fresh solver.
fn load_solver(rules: &RuleSet) -> Result<Solver> {
    let wordfile = rules
        .wordfile
        .ok_or_else(|| Error::MissingDictionary(rules.name.clone()))?;
    Ok(Solver::from_wordfile(wordfile)?)
}

/// Interpret `\t`, `\n` and `\\` escapes in a prefix or suffix argument.
fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('\\') => result.push('\\'),
            Some(other) => result.push(other),
            None => break,
        }
    }
    result
}

fn score_boards(rules: &RuleSet) -> Result<()> {
    let mut solver = load_solver(rules)?;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let board = Board::parse(&line, rules.grid);
        let mut solutions = solver.solve(&board, rules.scoring);
        solutions.sort();
        dedup_solutions(&mut solutions);

        let words = solutions.len();
        let points: u64 = solutions.iter().map(|s| s.score() as u64).sum();
        println!("{} {}", words, points);
    }
    Ok(())
}

fn solve_boards(
    rules: &RuleSet,
    fmt: &str,
    solve_dups: bool,
    prefix: &str,
    suffix: &str,
) -> Result<()> {
    let mut solver = load_solver(rules)?;
    let prefix = unescape(prefix);
    let suffix = unescape(suffix);

    for line in io::stdin().lock().lines() {
        let line = line?;
        let board = Board::parse(&line, rules.grid);
        let mut solutions = solver.solve(&board, rules.scoring);
        solutions.sort();
        if !solve_dups {
            dedup_solutions(&mut solutions);
        }

        print!("{}", prefix);
        for (i, solution) in solutions.iter().enumerate() {
            print!("{}", solution.format(fmt, i + 1 != solutions.len()));
        }
        print!("{}", suffix);
    }
    Ok(())
}

fn analyze_boards(rules: &RuleSet, fmt: &str, dump_words: bool) -> Result<()> {
    let mut solver = load_solver(rules)?;
    let mut word_counts: BTreeMap<String, u64> = BTreeMap::new();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let board = Board::parse(&line, rules.grid);
        let mut solutions = solver.solve(&board, rules.scoring);
        solutions.sort();
        let analysis = SolutionAnalysis::new(&board, &solutions);
        print!("{}", analysis.format(fmt, 0));

        if dump_words {
            dedup_solutions(&mut solutions);
            for solution in &solutions {
                *word_counts.entry(String::from(solution.word())).or_default() += 1;
            }
        }
    }

    if dump_words {
        for (word, count) in &word_counts {
            eprintln!("{} {}", word, count);
        }
    }
    Ok(())
}

fn create_boards(
    rules: &RuleSet,
    boards: usize,
    min_words: usize,
    min_score: usize,
    reverse_target: bool,
) -> Result<()> {
    let mut rng = StdRng::from_entropy();

    if min_words == 0 && min_score == 0 && !reverse_target {
        // no target: plain rolls, no dictionary needed
        for _ in 0..boards {
            println!("{}", generate_simple_board(rules, &mut rng)?);
        }
        return Ok(());
    }

    if rules.letters.and_then(|letters| letters.method) == Some(GenerationMethod::WordList) {
        bail!("Minimum word/score board generation is not supported for word list games");
    }

    let mut solver = load_solver(rules)?;
    for _ in 0..boards {
        let letters = generate_board(rules, &mut solver, min_words, min_score, reverse_target, &mut rng)?;
        let board = Board::parse(&letters, rules.grid);
        let mut solutions = solver.solve(&board, rules.scoring);
        solutions.sort();
        let analysis = SolutionAnalysis::new(&board, &solutions);
        println!("{}", analysis.format("%B %W %S", 0));
    }
    Ok(())
}

fn check_candidates(rules: &RuleSet, check_words: bool, verbosity: u32) -> Result<()> {
    let mut validator = Validator::new();
    validator.set_debug(verbosity == 2);

    for line in io::stdin().lock().lines() {
        let line = line?;
        let valid = if check_words {
            validator.validate_word(rules, &line)
        } else {
            validator.validate_board(rules, &line)
        };
        println!("{}{}", if valid { "+" } else { "-" }, line);
    }

    if verbosity > 0 {
        eprintln!("{}", validator.stats());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\tb\\nc"), "a\tb\nc");
        assert_eq!(unescape("\\\\x\\q"), "\\xq");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_parse_count() {
        let args: Vec<String> = vec![String::from("5")];
        assert_eq!(parse_count(&args, 0, 1).unwrap(), 5);
        assert_eq!(parse_count(&args, 1, 1).unwrap(), 1);
        let bad: Vec<String> = vec![String::from("five")];
        assert!(parse_count(&bad, 0, 1).is_err());
    }
}
