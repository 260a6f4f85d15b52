use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use serde_json::Value;
use std::io::{stdin, stdout, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vocab_core::config::PickerConfig;
use vocab_core::exchange::{self, ImportMode, VocabularyBundle};
use vocab_core::history::FieldBinding;
use vocab_core::picker::Picker;
use vocab_core::{FileStore, VocabularyManager};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PickerConfig::load().context("failed to load picker config")?;
    let store = FileStore::open_or_empty(&config.store.path);
    info!(path = %store.path().display(), "using vocabulary store");
    let manager = VocabularyManager::new(store);

    let mut records: Vec<Value> = Vec::new();
    let mut picker = Picker::new(&manager, config.display.default_key.as_str());
    let mut status = String::new();

    loop {
        print_ui(&picker, &status, config.display.max_candidates)?;
        status.clear();

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim_end_matches(['\r', '\n']);
        let (cmd, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd {
            ":quit" | ":q" => break,
            ":key" if !rest.is_empty() => {
                picker = Picker::new(&manager, rest);
                picker.set_history(FieldBinding::same_name(rest).values(&records));
            }
            ":add" => match picker.add_current_query() {
                Ok(value) => status = format!("Added '{}'", value),
                Err(e) => status = e.to_string(),
            },
            ":rm" => match parse_row(rest).map(|row| picker.remove(row)) {
                Some(Ok(value)) => status = format!("Removed '{}'", value),
                Some(Err(e)) => status = e.to_string(),
                None => status = "usage: :rm <row>".to_string(),
            },
            ":mv" => {
                let rows: Vec<usize> = rest.split_whitespace().filter_map(parse_row).collect();
                status = match rows.as_slice() {
                    [from, to] => match picker.drag(*from, *to) {
                        Ok(()) => "Order saved".to_string(),
                        Err(e) => e.to_string(),
                    },
                    _ => "usage: :mv <from> <to>".to_string(),
                };
            }
            ":pick" => {
                match parse_pick(rest) {
                    Ok(Some(row)) => {
                        if let Err(e) = picker.select(row) {
                            status = e.to_string();
                        }
                    }
                    Ok(None) => {}
                    Err(usage) => status = usage.to_string(),
                }
                if status.is_empty() {
                    status = match picker.commit() {
                        Some(value) => format!("Committed '{}'", value),
                        None => "Nothing to commit".to_string(),
                    };
                }
            }
            ":clear" => picker.clear_query(),
            ":load" => match load_records(Path::new(rest)) {
                Ok(loaded) => {
                    records = loaded;
                    let key = picker.key().as_str().to_string();
                    picker.set_history(FieldBinding::same_name(&key).values(&records));
                    status = format!("Loaded {} records", records.len());
                }
                Err(e) => status = format!("{:#}", e),
            },
            ":export" => {
                let bundle = exchange::export_all(&manager);
                status = match bundle.write_file(Path::new(rest)) {
                    Ok(()) => format!("Exported {} vocabularies", bundle.vocabularies.len()),
                    Err(e) => e.to_string(),
                };
            }
            ":import" => {
                let result = VocabularyBundle::read_file(Path::new(rest))
                    .and_then(|bundle| exchange::import(&manager, &bundle, ImportMode::Merge));
                match result {
                    Ok(count) => {
                        status = format!("Imported {} vocabularies", count);
                        picker.refresh();
                    }
                    Err(e) => status = e.to_string(),
                }
            }
            s if s.starts_with(':') => status = format!("Unknown command '{}'", s),
            _ => picker.set_query(line),
        }
    }

    println!("\nVocabulary saved to '{}'", manager.store().path().display());
    Ok(())
}

/// Rows are shown 1-based.
fn parse_row(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&n| n > 0).map(|n| n - 1)
}

/// `:pick` takes an optional row; without one the typed text is committed.
fn parse_pick(rest: &str) -> Result<Option<usize>, &'static str> {
    if rest.is_empty() {
        return Ok(None);
    }
    parse_row(rest).map(Some).ok_or("usage: :pick <row>")
}

fn load_records(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read records from {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))?;
    Ok(records)
}

fn print_ui<S: vocab_core::KeyValueStore>(
    picker: &Picker<'_, S>,
    status: &str,
    max_candidates: usize,
) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Field Vocabulary Picker".bold());
    println!("---------------------------------------------------------------");
    println!("Type to filter. :add  :pick <n>  :rm <n>  :mv <from> <to>  :clear");
    println!(":key <field>  :load <records.json>  :export <file>  :import <file>  :quit\n");

    println!("Field: {}", picker.key().as_str().cyan());
    println!("Query: [{}]", picker.query());

    let candidates = picker.candidates();
    if candidates.is_empty() {
        println!("\n{}", "(no options)".dark_grey());
    } else {
        println!();
        for (i, value) in candidates.iter().take(max_candidates).enumerate() {
            println!("{:>3}. {}", i + 1, value);
        }
        if candidates.len() > max_candidates {
            println!("     ... {} more", candidates.len() - max_candidates);
        }
    }
    if picker.offers_add() {
        println!("\n{} '{}'", ":add to save".green(), picker.query().trim());
    }
    if picker.is_filtering() {
        println!("{}", "Reordering is disabled while filtering.".dark_grey());
    }
    if !status.is_empty() {
        println!("\n{}", status.yellow());
    }

    print!("\n> ");
    out.flush()?;
    Ok(())
}
