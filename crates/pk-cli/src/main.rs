//! Paramak command line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use pk_cad::CadKernel;
use pk_core::{ReactorDesign, ReactorError};

const USAGE: &str = "\
Usage:
  paramak build <design.ron> [--out DIR]   build a reactor design and export it
  paramak template <ball|submersion>       print a starter design";

#[derive(Debug, PartialEq)]
enum Command {
    Build {
        design: PathBuf,
        output_dir: Option<PathBuf>,
    },
    Template {
        kind: String,
    },
    Help,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args.first().map(String::as_str) {
        Some("build") => {
            let mut design = None;
            let mut output_dir = None;
            let mut rest = args[1..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--out" | "-o" => {
                        let dir = rest.next().ok_or("--out needs a directory")?;
                        output_dir = Some(PathBuf::from(dir));
                    }
                    flag if flag.starts_with('-') => {
                        return Err(format!("unknown option '{}'", flag));
                    }
                    path if design.is_none() => design = Some(PathBuf::from(path)),
                    extra => return Err(format!("unexpected argument '{}'", extra)),
                }
            }
            let design = design.ok_or("build needs a design file")?;
            Ok(Command::Build { design, output_dir })
        }
        Some("template") => match &args[1..] {
            [kind] => Ok(Command::Template { kind: kind.clone() }),
            _ => Err("template needs exactly one reactor kind".to_string()),
        },
        Some("help" | "--help" | "-h") | None => Ok(Command::Help),
        Some(other) => Err(format!("unknown command '{}'", other)),
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Project(#[from] pk_core::ProjectError),
    #[error(transparent)]
    Reactor(#[from] ReactorError),
}

fn build(design_path: PathBuf, output_dir: Option<PathBuf>) -> Result<(), CliError> {
    let mut design = ReactorDesign::load(&design_path)?;
    if let Some(dir) = output_dir {
        design.output.output_dir = dir;
    }
    tracing::info!("Loaded design {} from {}", design.name, design_path.display());

    let kernel = design.kernel();
    let reactor = design.reactor()?;
    for (name, volume) in reactor.volumes(&kernel)? {
        tracing::info!("{:<24} {:>16.1} cm3", name, volume);
    }

    let summary = reactor.export(&kernel, &design.output)?;
    tracing::info!(
        "Wrote {} STL files to {} with kernel {}",
        summary.stl_files.len(),
        design.output.output_dir.display(),
        kernel.name()
    );
    if let Some(path) = summary.neutronics_description {
        tracing::info!("Neutronics description: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pk_cli=info,pk_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Template { kind } => ReactorDesign::template(&kind)
            .and_then(|design| design.to_ron())
            .map(|text| println!("{}", text))
            .map_err(CliError::from),
        Command::Build { design, output_dir } => build(design, output_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_build() {
        assert_eq!(
            parse_args(&args(&["build", "ball.ron", "--out", "out"])),
            Ok(Command::Build {
                design: PathBuf::from("ball.ron"),
                output_dir: Some(PathBuf::from("out")),
            })
        );
        assert_eq!(
            parse_args(&args(&["build", "ball.ron"])),
            Ok(Command::Build {
                design: PathBuf::from("ball.ron"),
                output_dir: None,
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["build"])).is_err());
        assert!(parse_args(&args(&["build", "a.ron", "--out"])).is_err());
        assert!(parse_args(&args(&["build", "a.ron", "b.ron"])).is_err());
        assert!(parse_args(&args(&["template"])).is_err());
        assert!(parse_args(&args(&["render"])).is_err());
    }

    #[test]
    fn test_parse_template_and_help() {
        assert_eq!(
            parse_args(&args(&["template", "ball"])),
            Ok(Command::Template {
                kind: "ball".to_string()
            })
        );
        assert_eq!(parse_args(&[]), Ok(Command::Help));
    }
}
