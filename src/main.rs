use bank_ledger::bank::{self, Registry, RegistryConfig};
use tokio::sync::mpsc;
use tracing::warn;

/// The size of the channel for processing operations.
const CHANNEL_SIZE: usize = 100;

#[tokio::main]
async fn main() {
    bank_ledger::init_tracing();

    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <operations_csv_file> [config_json_file]", args[0]);
        std::process::exit(1);
    }
    let input_file = &args[1];

    let config = match args.get(2) {
        Some(path) => RegistryConfig::load(path).unwrap_or_else(|err| {
            eprintln!("Failed to load configuration {path}: {err}");
            std::process::exit(1);
        }),
        None => RegistryConfig::default(),
    };

    let (sender, receiver) = mpsc::channel(CHANNEL_SIZE);
    let mut state = bank::State::new(Registry::new(config), receiver);

    let handle = tokio::spawn(async move {
        state.run().await;
        state
    });

    let file = std::fs::File::open(input_file).expect("Failed to read CSV file");
    let mut reader = bank::operation_reader(file);

    for (line, record) in reader.deserialize::<bank::Operation>().enumerate() {
        match record {
            Ok(operation) => {
                if let Err(err) = sender.send(operation).await {
                    eprintln!("Error sending operation: {err}");
                }
            }
            Err(err) => warn!(row = line + 1, "skipping malformed operation: {err}"),
        }
    }

    drop(sender); // Close the sender to signal no more operations will be sent
    let state = handle
        .await
        .expect("Failed to join the state handling task");

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for summary in state.registry().summaries() {
        if let Err(err) = writer.serialize(summary) {
            eprintln!("Error writing account: {err}");
        }
    }
    if let Err(err) = writer.flush() {
        eprintln!("Error flushing output: {err}");
    }
}
