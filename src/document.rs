//! Loading weights documents from YAML (and JSON) sources.

use std::fs;
use std::path::Path;

use mw_options::BUILTIN_GAME;
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::GenerateError;
use crate::version::GENERATOR_VERSION;
use crate::weights::Document;

const BOM: char = '\u{feff}';

/// A parsed source file and the digest of its raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub documents: Vec<Document>,
    pub digest: String,
}

/// Read every document of a YAML stream at `path`.
pub fn read_documents(path: &Path) -> Result<Vec<Document>, GenerateError> {
    read_source(path).map(|source| source.documents)
}

/// Read every document of `path` together with the SHA-256 of the file.
pub fn read_source(path: &Path) -> Result<SourceFile, GenerateError> {
    let bytes = fs::read(path).map_err(|source| GenerateError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = sha256_hex(&bytes);
    let text = String::from_utf8(bytes)
        .map_err(|e| GenerateError::DocumentParse(format!("Invalid UTF-8: {}", e)))?;
    Ok(SourceFile {
        documents: read_documents_str(&text)?,
        digest,
    })
}

/// Parse every non-empty document of a YAML stream.
pub fn read_documents_str(text: &str) -> Result<Vec<Document>, GenerateError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut documents = Vec::new();

    for (index, stream_doc) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = serde_yaml::Value::deserialize(stream_doc).map_err(|e| syntax_error(text, e))?;
        match yaml_to_json(value) {
            Value::Null => continue,
            Value::Object(map) => documents.push(map),
            other => {
                return Err(GenerateError::DocumentParse(format!(
                    "Document {} is a {}, expected a mapping of options",
                    index + 1,
                    kind_name(&other)
                )))
            }
        }
    }
    Ok(documents)
}

fn syntax_error(text: &str, err: serde_yaml::Error) -> GenerateError {
    let Some(location) = err.location() else {
        return GenerateError::DocumentParse(err.to_string());
    };
    let message = err.to_string();
    let problem = match message.find(" at line ") {
        Some(pos) => message[..pos].to_string(),
        None => message,
    };
    let line = location.line();
    let context = text
        .lines()
        .nth(line.saturating_sub(1))
        .unwrap_or_default()
        .to_string();
    GenerateError::DocumentSyntax {
        problem,
        line,
        context,
        pointer: format!("{}^", " ".repeat(location.column().saturating_sub(1))),
    }
}

/// Convert a YAML value into the engine's tree.
///
/// Mapping keys become strings: null is `""`, booleans and numbers use
/// their textual form. Tags are dropped.
pub fn yaml_to_json(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (key_text(k), yaml_to_json(v)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn key_text(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Tagged(tagged) => key_text(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Parse a JSON player configuration given inline or as a path to a file.
pub fn load_json_config(source: &str) -> Result<Value, GenerateError> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).map_err(|e| GenerateError::JsonConfig(e.to_string()));
    }
    let path = Path::new(source);
    let text = fs::read_to_string(path).map_err(|source| GenerateError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(text.trim_start_matches(BOM))
        .map_err(|e| GenerateError::JsonConfig(e.to_string()))
}

/// Build a weights document for the built-in game from a JSON configuration.
///
/// Game options come from `options`, or from a key named after the game.
pub fn json_to_document(config: &Value) -> Result<Document, GenerateError> {
    let config = config
        .as_object()
        .ok_or_else(|| GenerateError::JsonConfig("expected a JSON object".to_string()))?;

    let options = config
        .get("options")
        .or_else(|| config.get(BUILTIN_GAME))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    if !options.is_object() {
        return Err(GenerateError::JsonConfig("options must be an object".to_string()));
    }

    let mut requires = Map::new();
    requires.insert("version".to_string(), Value::from(GENERATOR_VERSION));

    let mut document = Document::new();
    document.insert(
        "name".to_string(),
        config.get("name").cloned().unwrap_or_else(|| Value::from("Player1")),
    );
    document.insert(
        "description".to_string(),
        config
            .get("description")
            .cloned()
            .unwrap_or_else(|| Value::from("Generated configuration")),
    );
    document.insert("game".to_string(), Value::from(BUILTIN_GAME));
    document.insert("requires".to_string(), Value::Object(requires));
    document.insert(BUILTIN_GAME.to_string(), options);
    Ok(document)
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
