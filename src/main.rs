use std::error::Error;
use std::path::PathBuf;

use structmesh::{
    assemble, classify, load_obj, render_summary, Config, Credentials, LoadKind, SolverClient,
    UpAxis, UreqTransport,
};
use tracing::info;

const USAGE: &str = "\
usage: structmesh <mesh.obj> [options]

options:
  --config FILE          read extraction and service settings from a JSON file
  --output FILE          where to write the project (default: <mesh>.json)
  --default-load KIND    load for untagged faces: wind or live
  --y-up                 the mesh file uses Y as its vertical axis
  --submit               upload the project to the solver service
  --solve                ask the service to solve after uploading (implies --submit)
  -h, --help             print this message

Faces in objects or groups named wind* or live* carry that load.
Credentials for --submit come from STRUCTMESH_API_USERNAME and STRUCTMESH_API_KEY.";

/// Command line options.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    /// Mesh file to read.
    mesh: PathBuf,
    /// Optional configuration file.
    config: Option<PathBuf>,
    /// Optional output path for the project JSON.
    output: Option<PathBuf>,
    /// Load for untagged faces, overriding the configuration.
    default_load: Option<LoadKind>,
    /// Vertical axis of the mesh file.
    up: UpAxis,
    /// Upload after extraction.
    submit: bool,
    /// Solve after upload.
    solve: bool,
}

/// Outcome of reading the command line.
#[derive(Debug, PartialEq)]
enum Command {
    /// Convert (and maybe submit) a mesh.
    Run(CliArgs),
    /// Print usage and exit.
    Help,
}

/// Parse arguments, excluding the program name.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();
    let mut mesh = None;
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("{flag} needs a value\n\n{USAGE}"))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => parsed.config = Some(value("--config")?.into()),
            "--output" => parsed.output = Some(value("--output")?.into()),
            "--default-load" => {
                let kind = value("--default-load")?;
                parsed.default_load = Some(kind.parse().map_err(|e| format!("{e}"))?);
            }
            "--y-up" => parsed.up = UpAxis::Y,
            "--submit" => parsed.submit = true,
            "--solve" => {
                parsed.submit = true;
                parsed.solve = true;
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option {flag}\n\n{USAGE}"));
            }
            path if mesh.is_none() => mesh = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument {extra}\n\n{USAGE}")),
        }
    }
    parsed.mesh = mesh.ok_or_else(|| format!("missing mesh file\n\n{USAGE}"))?;
    Ok(Command::Run(parsed))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "structmesh=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Run(args) => args,
    };

    // Settings come from the file first, then the environment, then the flags.
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_overrides(|name| std::env::var(name).ok());
    if args.default_load.is_some() {
        config.extract.default_load = args.default_load;
    }
    config.service.solve |= args.solve;

    // The mesh is an explicit input; nothing is read from a live editor session.
    let mesh = load_obj(&args.mesh, args.up)?;
    let classification = classify(&mesh, &config.extract)?;
    let project = assemble(&mesh, &classification, &config.extract);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.mesh.with_extension("json"));
    std::fs::write(&output, project.to_json_pretty()?)?;
    info!(path = %output.display(), "project written");

    print!("{}", render_summary(&classification, &project));

    if args.submit {
        let credentials = Credentials::from_env()?;
        let client = SolverClient::new(UreqTransport::new(), &config.service, credentials);
        let receipt = client.submit(&project)?;
        println!("Submitted: {}", receipt.message);
        if let Some(session) = receipt.session_id {
            println!("Session: {session}");
        }
    }

    Ok(())
}
