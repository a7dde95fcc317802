use clap::Parser;
use dicometa_core::cli::report::{FieldList, TextReport};
use dicometa_core::cli::{Cli, Command, OutputFormat};
use dicometa_core::config::AppConfig;
use dicometa_core::server::{start_server, AppState};
use dicometa_core::{storage, FieldFilter, MetadataExtractor};
use log::{error, info};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = cli.backend.apply(&mut config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // The field list needs no backend
    if let Command::Fields { format } = cli.command {
        output_fields(format);
        return;
    }

    let backend = match storage::connect(&config.backend).await {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to set up storage backend: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let extractor = MetadataExtractor::new(backend);

    match cli.command {
        Command::Extract {
            path,
            fields,
            format,
        } => {
            let filter = fields.as_deref().map(FieldFilter::parse_list);
            match extractor.extract(&path, filter.as_ref()).await {
                Ok(metadata) => match format {
                    OutputFormat::Text => print!("{}", TextReport::new(&metadata)),
                    OutputFormat::Json => match serde_json::to_string_pretty(&metadata) {
                        Ok(json) => println!("{}", json),
                        Err(e) => {
                            eprintln!("Error: failed to serialize metadata: {}", e);
                            process::exit(1);
                        }
                    },
                },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let state = AppState::new(extractor, &config.auth);
            if let Err(e) = start_server(&config.server, state).await {
                error!("Server error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
            info!("Server stopped");
        }
        Command::Fields { .. } => {}
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn output_fields(format: OutputFormat) {
    let fields = MetadataExtractor::common_fields();
    match format {
        OutputFormat::Text => print!("{}", FieldList::new(fields)),
        OutputFormat::Json => match serde_json::to_string_pretty(fields) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize fields: {}", e);
                process::exit(1);
            }
        },
    }
}
