use std::io::{self, BufRead, Write as _};

use clap::Parser;

use catalog_search::config::Cli;
use catalog_search::jsonl_source::JsonlDocumentSource;
use catalog_search::merge::KWayMerger;
use catalog_search::ranker::Bm25Ranker;
use catalog_search::reader::IndexReader;
use catalog_search::spimi::SpimiIndexer;
use catalog_search::stats::CollectionStats;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.index {
        run_index(&cli)?;
    } else if cli.search {
        run_search(&cli)?;
    } else {
        eprintln!("specify either --index or --search");
        std::process::exit(2);
    }

    Ok(())
}

fn run_index(cli: &Cli) -> anyhow::Result<()> {
    let input = cli.input.as_ref().ok_or_else(|| anyhow::anyhow!("--index requires --input"))?;
    let source = JsonlDocumentSource::from_dir(input)?;

    let indexer = SpimiIndexer::new(cli.block_dir.clone(), cli.block_size_limit_bytes());
    let report = indexer.build(source, &|| false)?;
    log::info!(
        "build finished: {} documents across {} blocks",
        report.stats.n,
        report.block_count
    );

    KWayMerger::merge(&cli.block_dir, &cli.final_index_path, &cli.lexicon_path)?;
    log::info!(
        "merge finished, final index at {:?}, lexicon at {:?}",
        cli.final_index_path,
        cli.lexicon_path
    );

    Ok(())
}

fn run_search(cli: &Cli) -> anyhow::Result<()> {
    let reader = IndexReader::open(&cli.final_index_path, &cli.lexicon_path)?;
    let stats = CollectionStats::load(&cli.metadata_path())?;
    let ranker = Bm25Ranker::new(cli.k1, cli.b);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\nEnter query (or 'exit'): ");
        stdout.flush()?;

        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let query_tokens: Vec<String> =
            query.split_whitespace().map(|w| w.to_lowercase()).collect();

        let mut postings_by_term = std::collections::HashMap::new();
        for term in &query_tokens {
            if postings_by_term.contains_key(term) {
                continue;
            }
            let postings = reader.get_postings(term)?;
            postings_by_term.insert(term.clone(), postings);
        }

        let results = ranker.rank(&query_tokens, &postings_by_term, &stats, cli.top_k);
        if results.is_empty() {
            println!("no results");
        } else {
            for (rank, (doc_id, score)) in results.iter().enumerate() {
                println!("{}. [{}] (score: {:.4})", rank + 1, doc_id, score);
            }
        }
    }

    Ok(())
}
