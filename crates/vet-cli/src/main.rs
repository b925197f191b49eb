//! `vet-cli` - run `cue vet` / `vela def vet` diagnostics from the command line.
//!
//! A headless host for the validator pipeline: every file is opened as a document, validated
//! by each provider, and the resulting diagnostics are printed as
//! `path:line:column: error[source]: message` (one-based) or as JSON lines.
//!
//! ## Usage
//! ```sh
//! # Validate two definitions once (exit code 1 when any diagnostic is published)
//! vet-cli traits/scaler.cue components/webservice.cue
//!
//! # Only run `vela def vet`, print JSON
//! vet-cli --only vela --json traits/scaler.cue
//!
//! # Revalidate whenever a file changes on disk (polls every 500ms)
//! vet-cli --watch 500 traits/scaler.cue
//! ```
//!
//! Validator binaries come from `VET_CUE_CMD` / `VET_VELA_CMD` (and `*_SUBCOMMAND`); logging is
//! controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};
use vet_core::{CollectionChangeType, Diagnostic, Document, TextDocument};
use vet_core_validators::{
    CueVetProvider, DiagnosticsOrchestrator, DocumentEvent, StagingConfig, ValidatorConfig,
    ValidatorKind, ValidatorProvider, VelaVetProvider,
};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(300);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Validator {
    /// `cue vet` on a staged copy with mock context
    Cue,
    /// `vela def vet` on the saved file
    Vela,
}

#[derive(Parser, Debug)]
#[command(
    name = "vet-cli",
    version,
    about = "Validate CUE definitions with cue vet / vela def vet"
)]
struct Args {
    /// Definition files to validate
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print diagnostics as JSON lines
    #[arg(long)]
    json: bool,

    /// Keep running and revalidate changed files, polling every MILLIS
    #[arg(long, value_name = "MILLIS")]
    watch: Option<u64>,

    /// Run a single validator
    #[arg(long, value_enum)]
    only: Option<Validator>,

    /// Log pipeline steps (default filter `debug` instead of `warn`)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut orchestrator = DiagnosticsOrchestrator::new(providers(args.only))
        .with_span(tracing::info_span!("vet-cli"));
    orchestrator
        .activate()
        .context("failed to activate validators")?;

    let mut documents = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let document = TextDocument::open(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        orchestrator.handle_event(DocumentEvent::Opened, Arc::new(document.clone()));
        documents.push(document);
    }

    let paths = Paths(
        documents
            .iter()
            .map(|document| (document.uri(), document.path().to_path_buf()))
            .collect(),
    );
    let code = match args.watch {
        Some(millis) => watch(&mut orchestrator, documents, &paths, millis, args.json),
        None => check_once(&mut orchestrator, &paths, args.json),
    };

    orchestrator.shutdown(SHUTDOWN_TIMEOUT);
    code
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn providers(only: Option<Validator>) -> Vec<Arc<dyn ValidatorProvider>> {
    let mut providers: Vec<Arc<dyn ValidatorProvider>> = Vec::new();
    if only.is_none_or(|v| v == Validator::Cue) {
        providers.push(Arc::new(CueVetProvider::new(
            ValidatorConfig::cue_vet_from_env(),
            StagingConfig::default(),
        )));
    }
    if only.is_none_or(|v| v == Validator::Vela) {
        providers.push(Arc::new(VelaVetProvider::new(
            ValidatorConfig::vela_def_vet_from_env(),
        )));
    }
    providers
}

/// Document URI -> the path it was opened with on the command line.
struct Paths(HashMap<String, PathBuf>);

impl Paths {
    fn display(&self, uri: &str) -> String {
        match self.0.get(uri) {
            Some(path) => path.display().to_string(),
            None => uri.to_string(),
        }
    }
}

fn check_once(
    orchestrator: &mut DiagnosticsOrchestrator,
    paths: &Paths,
    json: bool,
) -> Result<ExitCode> {
    if !orchestrator.wait_idle(SETTLE_TIMEOUT) {
        anyhow::bail!(
            "{} validation run(s) did not finish within {:?}",
            orchestrator.pending(),
            SETTLE_TIMEOUT
        );
    }

    let mut found = false;
    for collection in orchestrator.collections() {
        for (uri, diagnostics) in collection.iter() {
            for diagnostic in diagnostics {
                print_diagnostic(paths, uri, diagnostic, json)?;
                found = true;
            }
        }
    }

    Ok(if found {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn watch(
    orchestrator: &mut DiagnosticsOrchestrator,
    mut documents: Vec<TextDocument>,
    paths: &Paths,
    millis: u64,
    json: bool,
) -> Result<ExitCode> {
    let changes = Arc::new(Mutex::new(Vec::new()));
    for kind in [ValidatorKind::CueVet, ValidatorKind::VelaDefVet] {
        if let Some(collection) = orchestrator.collection_mut(kind) {
            let sink = Arc::clone(&changes);
            collection.subscribe(move |change| {
                if let Ok(mut sink) = sink.lock() {
                    sink.push((kind, change.change_type.clone()));
                }
            });
        }
    }

    let interval = Duration::from_millis(millis.max(1));
    loop {
        orchestrator.pump();
        let settled = match changes.lock() {
            Ok(mut changes) => std::mem::take(&mut *changes),
            Err(_) => anyhow::bail!("change log poisoned"),
        };
        for (kind, change) in settled {
            report_change(orchestrator, paths, kind, change, json)?;
        }

        thread::sleep(interval);

        for document in &mut documents {
            let text = match fs::read_to_string(document.path()) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(path = %document.path().display(), error = %err, "re-read failed");
                    continue;
                }
            };
            if text != document.text() {
                *document = document.with_text(&text);
                orchestrator.handle_event(DocumentEvent::Changed, Arc::new(document.clone()));
            }
        }
    }
}

fn report_change(
    orchestrator: &DiagnosticsOrchestrator,
    paths: &Paths,
    kind: ValidatorKind,
    change: CollectionChangeType,
    json: bool,
) -> Result<()> {
    match change {
        CollectionChangeType::Set { uri } => {
            if let Some(collection) = orchestrator.collection(kind) {
                for diagnostic in collection.get(&uri) {
                    print_diagnostic(paths, &uri, diagnostic, json)?;
                }
            }
        }
        CollectionChangeType::Deleted { uri } => {
            if json {
                let line = serde_json::json!({ "uri": uri, "source": kind.label(), "clean": true });
                println!("{line}");
            } else {
                println!("{}: ok [{}]", paths.display(&uri), kind);
            }
        }
        CollectionChangeType::Cleared => {}
    }
    Ok(())
}

fn print_diagnostic(paths: &Paths, uri: &str, diagnostic: &Diagnostic, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(&serde_json::json!({
            "uri": uri,
            "diagnostic": diagnostic,
        }))
        .context("failed to serialize diagnostic")?;
        println!("{line}");
    } else {
        let start = diagnostic.range.start;
        println!(
            "{}:{}:{}: error[{}]: {}",
            paths.display(uri),
            start.line + 1,
            start.column + 1,
            diagnostic.source,
            diagnostic.message
        );
    }
    Ok(())
}
