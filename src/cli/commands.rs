//! CLI command implementations
//!
//! Every command loads the configuration first, applies its log level,
//! then loads schema tables from the configured directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::observability::{CheckMetrics, CheckSnapshot, Event, Logger};
use crate::record::Record;
use crate::schema::{SchemaError, SchemaLoader};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult, RequestError};
use super::io::{read_requests, write_error_to, write_response, write_response_to, CheckRequest};

/// Run the CLI with parsed arguments
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a specific command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::List { config } => list(&config),
        Command::Describe { config, object } => describe(&config, &object),
        Command::Add { config, file } => add(&config, &file),
        Command::Check { config } => check(&config),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity());
    Logger::info(
        Event::ConfigLoaded.as_str(),
        &[
            ("path", &config_path.display().to_string()),
            ("schema_dir", &config.schema_dir),
        ],
    );
    Ok(config)
}

/// Load every schema table under the configured directory.
pub fn load_schemas(config: &Config) -> CliResult<SchemaLoader> {
    let schema_dir = config.schema_path();
    if !schema_dir.exists() {
        return Err(CliError::not_initialized());
    }

    let mut loader = SchemaLoader::new(schema_dir);
    if let Err(e) = loader.load_all() {
        Logger::fatal(
            Event::SchemaLoadFailed.as_str(),
            &[("code", e.code().code()), ("message", e.message())],
        );
        return Err(CliError::schema_load_failed(&e));
    }
    Ok(loader)
}

/// `init`: create the schema directory
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let schema_dir = config.schema_path();

    if schema_dir.exists() {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(schema_dir).map_err(|e| {
        CliError::io_error(format!("Failed to create schema directory: {}", e))
    })?;

    Logger::info(
        Event::SchemaDirCreated.as_str(),
        &[("schema_dir", &config.schema_dir)],
    );

    write_response(json!({
        "initialized": true,
        "schema_dir": config.schema_dir,
    }))
}

/// `list`: print registered object names
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let loader = load_schemas(&config)?;

    let objects: Vec<&str> = loader.object_names().collect();
    write_response(json!({
        "count": objects.len(),
        "objects": objects,
    }))
}

/// `describe`: print one schema table
pub fn describe(config_path: &Path, object: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let loader = load_schemas(&config)?;

    let table = loader
        .require(object)
        .map_err(|e| CliError::unknown_object(&e))?;

    write_response(serde_json::to_value(&*table)?)
}

/// `add`: write the tables in `file` into the schema directory
///
/// Every table must pass structural validation and must not collide with a
/// registered object or an existing file. Nothing is written otherwise.
pub fn add(config_path: &Path, file: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let mut loader = load_schemas(&config)?;

    let tables = SchemaLoader::read_schema_file(file).map_err(|e| CliError::schema_rejected(&e))?;

    let mut targets: Vec<PathBuf> = Vec::with_capacity(tables.len());
    for table in &tables {
        loader
            .register(table.clone())
            .map_err(|e| CliError::schema_rejected(&e))?;

        let target = loader.schema_file_path(table.name());
        if target.exists() || targets.contains(&target) {
            return Err(CliError::schema_rejected(&SchemaError::duplicate_object(
                table.name(),
            )));
        }
        targets.push(target);
    }

    let mut added = Vec::with_capacity(tables.len());
    for table in &tables {
        let path = loader
            .save_schema(table)
            .map_err(|e| CliError::schema_rejected(&e))?;
        Logger::info(
            Event::SchemaAdded.as_str(),
            &[
                ("object", table.name()),
                ("path", &path.display().to_string()),
            ],
        );
        added.push(table.name());
    }

    write_response(json!({
        "added": added,
        "count": added.len(),
    }))
}

/// `check`: validate records read from stdin
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let loader = load_schemas(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    check_requests(&loader, &config, stdin.lock(), &mut stdout.lock())?;
    Ok(())
}

/// Validate each request line and write one response per line.
///
/// A failing request is reported inline and never stops the batch. Only
/// read and write failures end it early.
pub fn check_requests<R: BufRead, W: Write>(
    loader: &SchemaLoader,
    config: &Config,
    input: R,
    out: &mut W,
) -> CliResult<CheckSnapshot> {
    let metrics = CheckMetrics::new();
    Logger::info(
        Event::CheckBegin.as_str(),
        &[("objects", &loader.schema_count().to_string())],
    );

    for (index, line) in read_requests(input).enumerate() {
        let line = line?;
        let line_no = (index + 1).to_string();

        match check_line(loader, config, &line) {
            Ok((data, complete)) => {
                metrics.record_accepted(complete);
                Logger::trace(
                    Event::RecordAccepted.as_str(),
                    &[("line", &line_no), ("complete", &complete.to_string())],
                );
                write_response_to(out, data)?;
            }
            Err(e) => {
                if matches!(e, RequestError::Malformed(_)) {
                    metrics.request_malformed();
                    Logger::warn(Event::RequestMalformed.as_str(), &[("line", &line_no)]);
                } else {
                    metrics.record_rejected();
                    Logger::warn(
                        Event::RecordRejected.as_str(),
                        &[("code", e.code()), ("line", &line_no)],
                    );
                }
                write_error_to(out, e.code(), &e.to_string())?;
            }
        }
    }

    let snapshot = metrics.snapshot();
    Logger::info(
        Event::CheckComplete.as_str(),
        &[
            ("accepted", &snapshot.accepted.to_string()),
            ("checked", &snapshot.checked.to_string()),
            ("incomplete", &snapshot.incomplete.to_string()),
            ("malformed", &snapshot.malformed.to_string()),
            ("rejected", &snapshot.rejected.to_string()),
        ],
    );
    Ok(snapshot)
}

fn check_line(
    loader: &SchemaLoader,
    config: &Config,
    line: &str,
) -> Result<(Value, bool), RequestError> {
    let request: CheckRequest =
        serde_json::from_str(line).map_err(|e| RequestError::Malformed(e.to_string()))?;

    let schema = loader.require(&request.object)?;
    let record = Record::from_json_fields(schema, &request.fields, &request.extensibles)?;

    let complete = record.is_complete();
    if config.reject_incomplete && !complete {
        return Err(RequestError::Incomplete {
            object: record.schema().name().to_string(),
            min_fields: record.schema().min_fields(),
        });
    }

    let missing: Vec<String> = record
        .missing_required()
        .into_iter()
        .map(str::to_string)
        .collect();
    if config.reject_missing_required && !missing.is_empty() {
        return Err(RequestError::MissingRequired {
            object: record.schema().name().to_string(),
            fields: missing,
        });
    }

    let mut data = record.to_json();
    data["complete"] = json!(complete);
    data["missing_required"] = json!(missing);
    Ok((data, complete))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, SchemaTable};
    use tempfile::TempDir;

    fn setup() -> (TempDir, SchemaLoader, Config) {
        let temp = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp.path());
        loader
            .register(
                SchemaTable::new(
                    "OutdoorAir:Node",
                    vec![
                        FieldDescriptor::node("Name").required(),
                        FieldDescriptor::real("Height Above Ground")
                            .with_default(-1.0)
                            .unit("m"),
                    ],
                    vec![],
                )
                .with_min_fields(1),
            )
            .unwrap();

        let config = Config::from_json(&format!(
            r#"{{"schema_dir": {}}}"#,
            serde_json::to_string(&temp.path().display().to_string()).unwrap()
        ))
        .unwrap();

        (temp, loader, config)
    }

    fn responses(out: &[u8]) -> Vec<Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_check_accepts_valid_record() {
        let (_temp, loader, config) = setup();
        let input = r#"{"object":"OutdoorAir:Node","fields":{"Name":"OA Inlet"}}"#;
        let mut out = Vec::new();

        let snapshot = check_requests(&loader, &config, input.as_bytes(), &mut out).unwrap();
        assert_eq!(snapshot.accepted, 1);

        let resp = &responses(&out)[0];
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["data"]["fields"]["Name"], "OA Inlet");
        assert_eq!(resp["data"]["fields"]["Height Above Ground"], -1.0);
        assert_eq!(resp["data"]["complete"], true);
    }

    #[test]
    fn test_check_isolates_failures() {
        let (_temp, loader, config) = setup();
        let input = [
            "not json",
            r#"{"object":"Zone"}"#,
            r#"{"object":"OutdoorAir:Node","fields":{"Depth":1}}"#,
            r#"{"object":"OutdoorAir:Node"}"#,
            r#"{"object":"OutdoorAir:Node","fields":{"Name":"N1"}}"#,
        ]
        .join("\n");
        let mut out = Vec::new();

        let snapshot = check_requests(&loader, &config, input.as_bytes(), &mut out).unwrap();
        let resp = responses(&out);

        assert_eq!(resp.len(), 5);
        assert_eq!(resp[0]["code"], "IDF_CLI_BAD_REQUEST");
        assert_eq!(resp[1]["code"], "IDF_UNKNOWN_OBJECT");
        assert_eq!(resp[2]["code"], "IDF_UNKNOWN_FIELD");
        assert_eq!(resp[3]["code"], "IDF_INCOMPLETE_RECORD");
        assert_eq!(resp[4]["status"], "ok");

        assert_eq!(snapshot.malformed, 1);
        assert_eq!(snapshot.rejected, 3);
        assert_eq!(snapshot.accepted, 1);
    }

    #[test]
    fn test_incomplete_allowed_when_configured() {
        let (_temp, loader, mut config) = setup();
        config.reject_incomplete = false;
        let mut out = Vec::new();

        let snapshot =
            check_requests(&loader, &config, &b"{\"object\":\"outdoorair:node\"}"[..], &mut out)
                .unwrap();
        assert_eq!(snapshot.incomplete, 1);

        let resp = &responses(&out)[0];
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["data"]["complete"], false);
        assert_eq!(resp["data"]["missing_required"], json!(["Name"]));
    }

    #[test]
    fn test_missing_required_rejected_when_configured() {
        let (_temp, loader, mut config) = setup();
        config.reject_incomplete = false;
        config.reject_missing_required = true;
        let mut out = Vec::new();

        check_requests(&loader, &config, &b"{\"object\":\"OutdoorAir:Node\"}"[..], &mut out)
            .unwrap();
        assert_eq!(responses(&out)[0]["code"], "IDF_MISSING_REQUIRED");
    }

    #[test]
    fn test_invalid_value_reported() {
        let (_temp, loader, config) = setup();
        let input =
            r#"{"object":"OutdoorAir:Node","fields":{"Name":"N","Height Above Ground":"tall"}}"#;
        let mut out = Vec::new();

        check_requests(&loader, &config, input.as_bytes(), &mut out).unwrap();
        let resp = &responses(&out)[0];
        assert_eq!(resp["code"], "IDF_INVALID_VALUE");
        assert!(resp["message"]
            .as_str()
            .unwrap()
            .contains("Height Above Ground"));
    }

    #[test]
    fn test_check_same_field_under_two_spellings() {
        let (_temp, loader, config) = setup();
        let input = r#"{"object":"OutdoorAir:Node","fields":{"Name":"A","name":"B"}}"#;
        let mut out = Vec::new();

        let snapshot = check_requests(&loader, &config, input.as_bytes(), &mut out).unwrap();
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(responses(&out)[0]["code"], "IDF_DUPLICATE_FIELD");
    }

    #[test]
    fn test_check_rejects_groups_without_template() {
        let (_temp, loader, config) = setup();
        let input = r#"{"object":"OutdoorAir:Node","fields":{"Name":"N"},"extensibles":[[]]}"#;
        let mut out = Vec::new();

        check_requests(&loader, &config, input.as_bytes(), &mut out).unwrap();
        assert_eq!(responses(&out)[0]["code"], "IDF_ARITY_MISMATCH");
    }

    #[test]
    fn test_load_schemas_requires_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent");
        let config = Config::from_json(&format!(
            r#"{{"schema_dir": {}}}"#,
            serde_json::to_string(&missing.display().to_string()).unwrap()
        ))
        .unwrap();

        let err = load_schemas(&config).unwrap_err();
        assert_eq!(err.code_str(), "IDF_CLI_NOT_INITIALIZED");
    }
}
