use mysfits_core::{DynamoStore, MysfitStore, seed};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let table =
        std::env::var("MYSFITS_TABLE").unwrap_or_else(|_| "MysfitsTable".to_string());

    let file = match parse_file_arg(std::env::args().skip(1)) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: seed-mysfits [--file <catalog.json>]");
            std::process::exit(1);
        }
    };

    let catalog = match file {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {path}: {e}"))
            .and_then(|json| seed::parse_catalog(&json).map_err(|e| e.to_string())),
        None => seed::default_catalog().map_err(|e| e.to_string()),
    };

    let mysfits = match catalog {
        Ok(mysfits) => mysfits,
        Err(e) => {
            eprintln!("Invalid catalog: {e}");
            std::process::exit(1);
        }
    };

    let store = DynamoStore::new(&table).await;

    for mysfit in &mysfits {
        if let Err(e) = store.put_mysfit(mysfit).await {
            eprintln!("Failed to store mysfit {} in {table}: {e}", mysfit.mysfit_id);
            std::process::exit(1);
        }
        tracing::info!(mysfit_id = %mysfit.mysfit_id, name = %mysfit.name, "seeded");
    }

    println!("Seeded {} mysfits into {table}", mysfits.len());
}

/// Parse `--file <path>` from CLI arguments (program name already skipped).
fn parse_file_arg(args: impl IntoIterator<Item = String>) -> Result<Option<String>, String> {
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--file" {
            return match iter.next() {
                Some(path) if !path.starts_with("--") => Ok(Some(path)),
                _ => Err("--file requires a path".to_string()),
            };
        }
    }
    Ok(None)
}
