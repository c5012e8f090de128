//! Raw page description validation.
//!
//! Walks a `serde_json::Value` and builds a [`PageSchema`], failing on the
//! first field that does not fit. Error paths use the field names as they
//! appear in page descriptions (`anchorLink`, `sectionContent`, ...).

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaErrorKind};
use crate::types::{
    CodeRef, Codeblock, GenericSection, PageSchema, Resource, ResourceSection, Section,
    SectionKind, Tab,
};

static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_+.#-]*$").unwrap());

/// Label used for errors about the document itself.
const ROOT: &str = "(root)";

type Object = Map<String, Value>;

/// Validate a raw page description.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found, with the field path and the
/// section index when the field belongs to a section.
pub fn validate(raw: &Value) -> Result<PageSchema, SchemaError> {
    let root = as_object(raw, ROOT)?;

    let id = required_str(root, "", "id")?;
    let title = required_str(root, "", "title")?;
    let description = optional_str(root, "", "description")?.unwrap_or_default();

    let sections = non_empty_array(root, "", "sections")?
        .iter()
        .enumerate()
        .map(|(i, value)| {
            validate_section(value, &item("sections", i)).map_err(|e| e.in_section(i))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PageSchema {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        sections,
    })
}

/// Whether `anchor` can be used as a URL fragment.
pub fn is_valid_anchor(anchor: &str) -> bool {
    !anchor.is_empty() && !anchor.contains(|c: char| c.is_whitespace() || c == '#')
}

/// Whether `language` looks like a highlighting grammar identifier.
///
/// ```
/// use pagedoc_schema::is_valid_language;
///
/// assert!(is_valid_language("tsx"));
/// assert!(is_valid_language("c++"));
/// assert!(!is_valid_language("type script"));
/// ```
pub fn is_valid_language(language: &str) -> bool {
    LANGUAGE_RE.is_match(language)
}

fn validate_section(value: &Value, path: &str) -> Result<Section, SchemaError> {
    let obj = as_object(value, path)?;

    let tag = match obj.get("type") {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(wrong_type(&field(path, "type"), "string", other));
        }
        None => {
            return Err(SchemaError::new(
                field(path, "type"),
                SchemaErrorKind::Missing,
            ));
        }
    };
    let kind = SectionKind::from_tag(tag).ok_or_else(|| {
        SchemaError::new(
            field(path, "type"),
            SchemaErrorKind::UnknownSectionKind(tag.clone()),
        )
    })?;

    let anchor = required_str(obj, path, "anchorLink")?;
    if !is_valid_anchor(anchor) {
        return Err(SchemaError::new(
            field(path, "anchorLink"),
            SchemaErrorKind::InvalidAnchor(anchor.to_owned()),
        ));
    }
    let anchor = anchor.to_owned();
    let title = required_str(obj, path, "title")?.to_owned();

    match kind {
        SectionKind::Generic => {
            let content = optional_str(obj, path, "sectionContent")?
                .filter(|text| !text.trim().is_empty())
                .map(str::to_owned);
            let codeblock = match obj.get("codeblock") {
                None | Some(Value::Null) => None,
                Some(value) => Some(validate_codeblock(value, &field(path, "codeblock"))?),
            };
            if content.is_none() && codeblock.is_none() {
                return Err(SchemaError::new(path, SchemaErrorKind::NoContent));
            }
            Ok(Section::Generic(GenericSection {
                anchor,
                title,
                content,
                codeblock,
            }))
        }
        SectionKind::Resource => {
            let resources_path = field(path, "resources");
            let resources = non_empty_array(obj, path, "resources")?
                .iter()
                .enumerate()
                .map(|(i, value)| validate_resource(value, &item(&resources_path, i)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Section::Resource(ResourceSection {
                anchor,
                title,
                resources,
            }))
        }
    }
}

fn validate_resource(value: &Value, path: &str) -> Result<Resource, SchemaError> {
    let obj = as_object(value, path)?;
    Ok(Resource {
        name: required_str(obj, path, "name")?.to_owned(),
        url: required_str(obj, path, "url")?.trim().to_owned(),
    })
}

fn validate_codeblock(value: &Value, path: &str) -> Result<Codeblock, SchemaError> {
    let obj = as_object(value, path)?;
    let title = required_str(obj, path, "title")?.to_owned();

    let tabs_path = field(path, "tabs");
    let tabs = non_empty_array(obj, path, "tabs")?
        .iter()
        .enumerate()
        .map(|(i, value)| validate_tab(value, &item(&tabs_path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Codeblock { title, tabs })
}

fn validate_tab(value: &Value, path: &str) -> Result<Tab, SchemaError> {
    let obj = as_object(value, path)?;
    let title = required_str(obj, path, "title")?.to_owned();

    let code_path = field(path, "code");
    let code = match obj.get("code") {
        None | Some(Value::Null) => {
            return Err(SchemaError::new(code_path, SchemaErrorKind::Missing));
        }
        Some(Value::String(code)) if code.trim().is_empty() => {
            return Err(SchemaError::new(code_path, SchemaErrorKind::Empty));
        }
        Some(Value::String(code)) => CodeRef::from_code_string(code),
        Some(Value::Object(code)) => code_ref_object(code, &code_path)?,
        Some(_) => {
            return Err(SchemaError::new(code_path, SchemaErrorKind::InvalidCodeRef));
        }
    };

    let language = required_str(obj, path, "language")?;
    if !is_valid_language(language) {
        return Err(SchemaError::new(
            field(path, "language"),
            SchemaErrorKind::InvalidLanguage(language.to_owned()),
        ));
    }

    Ok(Tab {
        title,
        code,
        language: language.to_owned(),
    })
}

/// `{"file": "..."}` or `{"inline": "..."}`.
fn code_ref_object(obj: &Object, path: &str) -> Result<CodeRef, SchemaError> {
    match (obj.get("file"), obj.get("inline")) {
        (Some(_), None) => {
            let file = required_str(obj, path, "file")?;
            Ok(CodeRef::File(PathBuf::from(file)))
        }
        (None, Some(_)) => {
            let inline = required_str(obj, path, "inline")?;
            Ok(CodeRef::Inline(inline.to_owned()))
        }
        _ => Err(SchemaError::new(path, SchemaErrorKind::InvalidCodeRef)),
    }
}

fn field(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

fn item(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::new(
        path,
        SchemaErrorKind::WrongType {
            expected,
            found: type_name(found),
        },
    )
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| wrong_type(path, "object", value))
}

/// Required string that is not blank.
fn required_str<'a>(obj: &'a Object, path: &str, key: &str) -> Result<&'a str, SchemaError> {
    let value = optional_str(obj, path, key)?
        .ok_or_else(|| SchemaError::new(field(path, key), SchemaErrorKind::Missing))?;
    if value.trim().is_empty() {
        return Err(SchemaError::new(field(path, key), SchemaErrorKind::Empty));
    }
    Ok(value)
}

/// Optional string; `null` counts as absent.
fn optional_str<'a>(
    obj: &'a Object,
    path: &str,
    key: &str,
) -> Result<Option<&'a str>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_type(&field(path, key), "string", other)),
    }
}

fn non_empty_array<'a>(
    obj: &'a Object,
    path: &str,
    key: &str,
) -> Result<&'a [Value], SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(SchemaError::new(
            field(path, key),
            SchemaErrorKind::Missing,
        )),
        Some(Value::Array(items)) if items.is_empty() => {
            Err(SchemaError::new(field(path, key), SchemaErrorKind::Empty))
        }
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(wrong_type(&field(path, key), "array", other)),
    }
}
