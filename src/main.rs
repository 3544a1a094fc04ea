// Builds a weighted automaton from a word list, optionally simplifies it into a trie,
// scores test words and saves the result.
//
// Input files hold one `word<TAB>weight` entry per line; a missing weight means 1.

extern crate anyhow;
extern crate clap;
extern crate kdam;
extern crate rusty_wfsa;
extern crate serde;
extern crate serde_json;
extern crate tracing_subscriber;

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kdam::tqdm;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rusty_wfsa::config::SimplifyConfig;
use rusty_wfsa::distribution::DiscreteDistribution;
use rusty_wfsa::io::Save;
use rusty_wfsa::weight::{LogWeight, Weight};
use rusty_wfsa::{Builder, StringAutomaton};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long)]
    train_path: String,
    #[arg(long)]
    test_path: Option<String>,
    #[arg(long)]
    save_path: Option<String>,
    #[arg(long)]
    results_path: Option<String>,

    // Rewrite the word list into a trie before scoring.
    #[arg(long, default_value_t = false)]
    simplify: bool,
    // Overrides `prune_log_weight_threshold` from the config file.
    #[arg(long)]
    prune_log_weight: Option<f64>,
    // JSON file holding a `SimplifyConfig`.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Serialize, Debug)]
struct WordScore {
    word: String,
    log_value: f64,
}

#[derive(Serialize, Debug, Default)]
struct Report {
    train_words: usize,
    initial_states: usize,
    initial_transitions: usize,
    simplified: bool,
    states: usize,
    transitions: usize,
    log_normalizer: Option<f64>,
    scores: Vec<WordScore>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Error loading config: {}", path))?;
            serde_json::from_str::<SimplifyConfig>(&raw)
                .with_context(|| format!("Invalid config: {}", path))?
        }
        None => SimplifyConfig::default(),
    };
    if args.prune_log_weight.is_some() {
        config.prune_log_weight_threshold = args.prune_log_weight;
    }

    let train = read_word_list(&args.train_path)?;
    info!(words = train.len(), "Loaded train words");

    let mut builder: Builder<DiscreteDistribution<char>, LogWeight> = Builder::new();
    let start = builder.start_state();
    for (word, weight) in tqdm!(train.iter()) {
        let chars: Vec<char> = word.chars().collect();
        let end = builder.add_transitions_for_sequence(start, &chars);
        builder.set_end_weight(end, LogWeight::from_value(*weight));
    }
    let mut automaton: StringAutomaton = builder.get_automaton()?;

    let mut report = Report {
        train_words: train.len(),
        initial_states: automaton.state_count(),
        initial_transitions: automaton.transition_count(),
        ..Default::default()
    };
    println!(
        "Built automaton: {} states, {} transitions",
        report.initial_states, report.initial_transitions
    );

    if args.simplify {
        report.simplified = automaton.simplify_with(&config)?;
        println!(
            "Simplified: {} states, {} transitions",
            automaton.state_count(),
            automaton.transition_count()
        );
    }
    report.states = automaton.state_count();
    report.transitions = automaton.transition_count();
    report.log_normalizer = automaton.get_log_normalizer().ok();

    if let Some(test_path) = &args.test_path {
        let test = read_word_list(test_path)?;
        for (word, _) in tqdm!(test.iter()) {
            let chars: Vec<char> = word.chars().collect();
            report.scores.push(WordScore {
                word: word.clone(),
                log_value: automaton.get_log_value(&chars),
            });
        }
        let known = report
            .scores
            .iter()
            .filter(|score| score.log_value.is_finite())
            .count();
        println!("Scored {} test words ({} accepted)", report.scores.len(), known);
    }

    if let Some(results_path) = &args.results_path {
        let json_data = serde_json::to_string(&report)?;
        fs::write(results_path, json_data)
            .with_context(|| format!("Error writing results: {}", results_path))?;
    }

    if let Some(save_path) = &args.save_path {
        println!("Saving automaton...");
        automaton.save(save_path)?;
        println!("Successfully saved automaton to {}!", save_path);
    }
    Ok(())
}

fn read_word_list(path: &str) -> Result<Vec<(String, f64)>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Error loading {}", path))?;
    let mut entries = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if let Some(entry) = parse_line(line)
            .with_context(|| format!("{}:{}: malformed entry", path, number + 1))?
        {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Result<Option<(String, f64)>> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (word, weight) = match line.split_once('\t') {
        Some((word, weight)) => (word, weight.trim().parse::<f64>()?),
        None => (line, 1.),
    };
    if !(weight >= 0.) {
        bail!("weight must be non-negative, got {}", weight);
    }
    Ok(Some((word.to_string(), weight)))
}
