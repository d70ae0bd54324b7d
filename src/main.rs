//! Command-line interface for italian-lexicon
//!
//! Usage:
//!   lexicon [OPTIONS] <COMMAND>
//!
//! Every command loads the store, runs one pass and saves the store again.
//! `verify` exits with status 1 when a check fails.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use italian_lexicon::dictionary::{DictionaryIndex, DictionarySource};
use italian_lexicon::{
    enrich_form_of_labels, enrich_lemma_written, enrich_missing_feminine_plurals,
    fill_missing_adjective_forms, generate_participles, import_allomorphs, import_frequencies,
    import_pos, reconcile_spellings, run_all, verify, ImportOptions, LexiconStore, LogProgress,
    PartOfSpeech, PipelineConfig, ResolverChain, Rules, SecondaryLexicon, VerifyOptions,
};

#[derive(Parser, Debug)]
#[command(name = "lexicon", version, about = "Build and check the Italian lexicon database")]
struct Cli {
    /// Store file (defaults to the configured store path)
    #[arg(short = 'd', long, global = true)]
    database: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print statistics as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import lemmas and forms of one part of speech from the dictionary
    ImportDictionary {
        #[arg(long)]
        pos: PartOfSpeech,
        /// Dictionary JSONL file
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Generate gendered past participles (verbs)
    GenerateParticiples,

    /// Fill written spellings through the resolver chain
    Reconcile {
        #[arg(long)]
        pos: PartOfSpeech,
        /// Dictionary JSONL file, for form-of spellings
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
        /// Secondary lexicon file
        #[arg(long)]
        secondary: Option<PathBuf>,
    },

    /// Copy usage labels from form-of entries onto unlabelled forms
    EnrichFormOf {
        #[arg(long)]
        pos: PartOfSpeech,
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Add apocopic and elided forms under their parent lemmas
    ImportAllomorphs {
        #[arg(long)]
        pos: PartOfSpeech,
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Add the missing feminine plural of nouns with a feminine singular
    EnrichFemininePlurals,

    /// Add adjective forms listed only by the secondary lexicon
    FillAdjectiveForms {
        /// Secondary lexicon file
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Give lemmas a written spelling
    EnrichLemmas {
        #[arg(long)]
        pos: PartOfSpeech,
    },

    /// Attach corpus frequencies to lemmas
    ImportFrequency {
        #[arg(long)]
        pos: PartOfSpeech,
        /// Corpus CSV file (defaults to the configured file for the part of speech)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Run every pass
    ImportAll {
        /// Parts of speech to import (all by default)
        #[arg(long, value_delimiter = ',')]
        pos: Vec<PartOfSpeech>,
    },

    /// Print row counts
    Stats,

    /// Check the store and print a report
    Verify {
        /// List failure details and metrics
        #[arg(short = 'v', long)]
        verbose: bool,
        /// Skip the well-known word checks
        #[arg(long)]
        skip_spot_checks: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("reading configuration {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Print pass statistics, one `key: value` line per field
fn print_stats<T: Serialize>(title: &str, stats: &T, json: bool) -> Result<()> {
    let value = serde_json::to_value(stats)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{}", title);
    match value {
        serde_json::Value::Object(fields) => {
            for (key, value) in fields {
                println!("  {:<28} {}", key, value);
            }
        }
        other => println!("  {}", other),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let store_path = cli.database.clone().unwrap_or_else(|| config.store_path.clone());
    let mut store = LexiconStore::open_or_default(&store_path)
        .with_context(|| format!("opening store {}", store_path.display()))?;
    let rules = Rules::default();
    let progress = LogProgress;
    let dictionary = |input: Option<PathBuf>| {
        DictionarySource::file(input.unwrap_or_else(|| config.dictionary_path.clone()))
    };

    match cli.command {
        Command::ImportDictionary { pos, input } => {
            let source = dictionary(input);
            let options = ImportOptions::from(&config);
            let stats = import_pos(&mut store, &source, pos, &rules, &options, &progress)?;
            print_stats(&format!("Imported {}", pos.plural()), &stats, cli.json)?;
        }
        Command::GenerateParticiples => {
            let stats = generate_participles(&mut store, &progress)?;
            print_stats("Generated participles", &stats, cli.json)?;
        }
        Command::Reconcile { pos, input, secondary } => {
            let source = dictionary(input);
            let index = DictionaryIndex::build(&source, pos)?;
            let lexicon_path = secondary.unwrap_or_else(|| config.secondary_path.clone());
            let lexicon = SecondaryLexicon::from_path(&lexicon_path)
                .with_context(|| format!("reading secondary lexicon {}", lexicon_path.display()))?;
            let stats = reconcile_spellings(
                &mut store,
                pos,
                &ResolverChain::default(),
                &rules,
                Some(&lexicon),
                Some(&index),
                &progress,
            )?;
            print_stats(&format!("Reconciled {}", pos.plural()), &stats, cli.json)?;
        }
        Command::EnrichFormOf { pos, input } => {
            let index = DictionaryIndex::build(&dictionary(input), pos)?;
            let stats = enrich_form_of_labels(&mut store, pos, &index)?;
            print_stats("Form-of labels", &stats, cli.json)?;
        }
        Command::ImportAllomorphs { pos, input } => {
            let stats = import_allomorphs(&mut store, &dictionary(input), pos, &rules, &progress)?;
            print_stats("Allomorphs", &stats, cli.json)?;
        }
        Command::EnrichFemininePlurals => {
            let stats = enrich_missing_feminine_plurals(&mut store, &rules, &progress)?;
            print_stats("Feminine plurals", &stats, cli.json)?;
        }
        Command::FillAdjectiveForms { input } => {
            let path = input.unwrap_or_else(|| config.secondary_path.clone());
            let lexicon = SecondaryLexicon::from_path(&path)?;
            let stats = fill_missing_adjective_forms(&mut store, &lexicon, &progress)?;
            print_stats("Adjective forms", &stats, cli.json)?;
        }
        Command::EnrichLemmas { pos } => {
            let stats = enrich_lemma_written(&mut store, pos, &rules)?;
            print_stats("Lemma spellings", &stats, cli.json)?;
        }
        Command::ImportFrequency { pos, input } => {
            let path = input.unwrap_or_else(|| config.corpus.path_for(pos));
            let stats = import_frequencies(&mut store, pos, &path, &config.corpus, &rules)?;
            print_stats(&format!("Frequencies for {}", pos.plural()), &stats, cli.json)?;
        }
        Command::ImportAll { pos } => {
            let parts = if pos.is_empty() {
                PartOfSpeech::ALL.to_vec()
            } else {
                pos
            };
            let report = run_all(&mut store, &parts, &config, &rules, &progress)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for step in &report.steps {
                    print_stats(&format!("[{}] {}", step.pos, step.step), &step.stats, false)?;
                }
                for skipped in &report.skipped {
                    println!("Skipped {}", skipped);
                }
            }
        }
        Command::Stats => {
            print_stats("Store", &store.counts(), cli.json)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Verify { verbose, skip_spot_checks } => {
            let options = VerifyOptions {
                thresholds: config.thresholds.clone(),
                spot_checks: !skip_spot_checks,
            };
            let report = verify(&store, &options);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary(verbose));
            }
            return Ok(if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
    }

    store
        .save(&store_path)
        .with_context(|| format!("saving store {}", store_path.display()))?;
    Ok(ExitCode::SUCCESS)
}
