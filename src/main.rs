use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use xml2json_batch::{config::PipelineConfig, item::json::SeparatorStyle, pipeline};

/// Convert the record elements of an XML document into a JSON array
#[derive(Parser, Debug)]
#[command(name = "xml2json")]
#[command(version)]
struct Cli {
    /// TOML configuration file; command line values take precedence
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// XML document to read
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// JSON file to create
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Element whose closing tag completes a record
    #[arg(short = 'e', long = "element")]
    element: Option<String>,

    /// Required field names (comma-separated)
    #[arg(long = "schema", value_delimiter = ',')]
    schema: Option<Vec<String>>,

    /// Field name that rejects a record (repeatable)
    #[arg(long = "invalid-key", action = clap::ArgAction::Append)]
    invalid_keys: Vec<String>,

    /// Child element gathered into a list (repeatable)
    #[arg(long = "collect", action = clap::ArgAction::Append)]
    collect: Vec<String>,

    /// Follow every record with a comma, including the last one
    #[arg(long = "trailing-comma")]
    trailing_comma: bool,

    /// Pretty-print each record
    #[arg(long = "pretty")]
    pretty: bool,

    /// Records read before each write
    #[arg(long = "chunk-size")]
    chunk_size: Option<u16>,

    /// Read buffer size in bytes
    #[arg(long = "capacity")]
    capacity: Option<usize>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(element) = self.element {
            config.end_element = element;
        }
        if let Some(schema) = self.schema {
            config.schema = schema;
        }
        if !self.invalid_keys.is_empty() {
            config.invalid_value_keys = self.invalid_keys;
        }
        if !self.collect.is_empty() {
            config.collect = self.collect;
        }
        if self.trailing_comma {
            config.separator = SeparatorStyle::Trailing;
        }
        if self.pretty {
            config.pretty = true;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }

        Ok(config)
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config()?;
    let execution = pipeline::run(&config).with_context(|| {
        format!(
            "converting {} to {}",
            config.input_path.display(),
            config.output_path.display()
        )
    })?;

    info!(
        "Wrote {} of {} records to {}",
        execution.write_count,
        execution.read_count,
        config.output_path.display()
    );
    Ok(())
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    exit_code(run(Cli::parse()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xml2json").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_gives_defaults() {
        let config = parse(&[]).into_config().unwrap();

        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn flags_fill_every_field() {
        let config = parse(&[
            "-i",
            "in.xml",
            "-o",
            "out.json",
            "-e",
            "Note",
            "--schema",
            "From,Message",
            "--invalid-key",
            "script",
            "--invalid-key",
            "style",
            "--collect",
            "To",
            "--collect",
            "Cc",
            "--trailing-comma",
            "--pretty",
            "--chunk-size",
            "5",
            "--capacity",
            "64",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.xml"));
        assert_eq!(config.output_path, PathBuf::from("out.json"));
        assert_eq!(config.end_element, "Note");
        assert_eq!(config.schema, vec!["From", "Message"]);
        assert_eq!(config.invalid_value_keys, vec!["script", "style"]);
        assert_eq!(config.collect, vec!["To", "Cc"]);
        assert_eq!(config.separator, SeparatorStyle::Trailing);
        assert!(config.pretty);
        assert_eq!(config.chunk_size, 5);
        assert_eq!(config.capacity, 64);
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
end_element = "Entry"
output_path = "from-file.json"
invalid_value_keys = ["onclick"]
chunk_size = 3
"#,
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&["-c", path, "-e", "Note", "-o", "from-cli.json"])
            .into_config()
            .unwrap();

        assert_eq!(config.end_element, "Note");
        assert_eq!(config.output_path, PathBuf::from("from-cli.json"));
        assert_eq!(config.invalid_value_keys, vec!["onclick"]);
        assert_eq!(config.chunk_size, 3);
        assert_eq!(config.schema, vec!["From", "Message"]);
    }

    #[test]
    fn unreadable_config_file_is_an_error() {
        let result = parse(&["-c", "/does/not/exist.toml"]).into_config();

        assert!(result.is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["xml2json", "--bogus"]).is_err());
    }

    #[test]
    fn failed_conversion_exits_with_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.xml");
        let output = dir.path().join("out.json");

        let result = run(parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]));

        let message = format!("{:#}", result.as_ref().unwrap_err());
        assert!(message.contains("missing.xml"));
        assert_eq!(exit_code(result), ExitCode::FAILURE);
        assert!(!output.exists());
    }

    #[test]
    fn successful_conversion_exits_with_success() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.xml");
        let output = dir.path().join("out.json");
        fs::write(
            &input,
            "<Messages><Message><From>a</From><Message>hi</Message></Message></Messages>",
        )
        .unwrap();

        let result = run(parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]));

        assert_eq!(exit_code(result), ExitCode::SUCCESS);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            r#"[{"From":"a","Message":"hi"}]"#
        );
    }
}
