use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value;
use storyadmin_client::{
    media::Media,
    resource::id_text,
    schema::{self, Field, FieldKind},
    ApiError, Payload,
};
use storyadmin_common::time::{format_timestamp, parse_timestamp, DateShift};

/// One editable value, in the shape the form layer works with.
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    /// Text, choice tokens, `"true"`/`"false"` flags and numbers being typed
    Text(String),
    /// Local, already shifted, date
    Date(NaiveDateTime),
    List(Vec<String>),
    Media(Media),
    /// Server value outside the schema, never submitted
    Raw(Value),
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

/// Local editable state of one entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, FormValue>,
}

impl FormState {
    /// Starting point of a create form. Date fields start at `now` (UTC),
    /// shifted like a loaded server date so submit sends `now` back.
    pub fn defaults(fields: &[Field], shift: DateShift, now: NaiveDateTime) -> Self {
        let local = shift.to_local(now);
        let values = fields
            .iter()
            .filter_map(|field| default_value(field, local).map(|value| (field.name.to_string(), value)))
            .collect();

        Self { values }
    }

    /// Edit form seeded from a detail payload, server dates shifted to local.
    ///
    /// Keys the schema does not know are kept as [`FormValue::Raw`] so nothing
    /// the server sent is lost, they are dropped again on submit.
    pub fn seed(fields: &[Field], raw: &Payload, shift: DateShift, now: NaiveDateTime) -> Self {
        let mut state = Self::defaults(fields, shift, now);

        for (key, value) in raw {
            if schema::find(fields, key).is_none() {
                state.values.insert(key.clone(), FormValue::Raw(value.clone()));
            }
        }

        for field in fields {
            if let Some(value) = seed_value(field, raw, shift, now) {
                state.values.insert(field.name.to_string(), value);
            }
        }

        state
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FormValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn set(&mut self, name: &str, value: FormValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Stores operator input, read the way the field's kind expects.
    pub fn input(&mut self, fields: &[Field], name: &str, input: &str) -> Result<(), ApiError> {
        let value = match schema::find(fields, name).map(|field| field.kind) {
            Some(FieldKind::Timestamp) => FormValue::Date(
                parse_timestamp(input).map_err(|err| invalid(name, &err.to_string()))?,
            ),
            Some(FieldKind::Refs { .. }) => FormValue::List(split_ids(input)),
            _ => FormValue::Text(input.to_string()),
        };

        self.set(name, value);

        Ok(())
    }

    /// Builds the submit payload: allowed fields only, flags as booleans,
    /// numbers as numbers and dates shifted back and formatted.
    pub fn to_payload(&self, fields: &[Field], shift: DateShift) -> Result<Payload, ApiError> {
        let mut payload = Payload::new();

        for field in fields {
            let value = match self.values.get(field.name) {
                Some(value) => value,
                None if field.required => return Err(required(field)),
                None => continue,
            };

            if let Some(json) = submit_value(field, value, shift)? {
                payload.insert(field.name.to_string(), json);
            }
        }

        Ok(payload)
    }
}

fn default_value(field: &Field, local: NaiveDateTime) -> Option<FormValue> {
    match field.kind {
        FieldKind::Text
        | FieldKind::Choice(_)
        | FieldKind::Flag
        | FieldKind::Integer
        | FieldKind::Embedded { .. } => Some(FormValue::Text(field.default.to_string())),
        FieldKind::Timestamp => Some(FormValue::Date(local)),
        FieldKind::Refs { .. } => Some(FormValue::List(Vec::new())),
        FieldKind::Media => None,
    }
}

fn seed_value(field: &Field, raw: &Payload, shift: DateShift, now: NaiveDateTime) -> Option<FormValue> {
    let value = raw.get(field.name);

    match (field.kind, value) {
        (FieldKind::Embedded { object, key }, _) => raw
            .get(object)
            .and_then(|embedded| embedded.get(key))
            .and_then(id_text)
            .or_else(|| value.and_then(id_text))
            .map(FormValue::Text),
        (_, None | Some(Value::Null)) => None,
        (FieldKind::Timestamp, Some(Value::String(text))) if text.trim().is_empty() => {
            Some(FormValue::Date(shift.to_local(now)))
        }
        (FieldKind::Timestamp, Some(Value::String(text))) => match parse_timestamp(text) {
            Ok(server) => Some(FormValue::Date(shift.to_local(server))),
            Err(err) => {
                tracing::warn!(field = field.name, err = %err, "unreadable server date, using now");

                Some(FormValue::Date(shift.to_local(now)))
            }
        },
        (FieldKind::Refs { key }, Some(Value::Array(items))) => Some(FormValue::List(
            items
                .iter()
                .filter_map(|item| id_text(item).or_else(|| item.get(key).and_then(id_text)))
                .collect(),
        )),
        (FieldKind::Media, Some(Value::Object(object))) => object
            .get("file_id")
            .and_then(id_text)
            .map(|file_id| {
                FormValue::Media(Media {
                    file_id,
                    path: object
                        .get("path")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
            }),
        (_, Some(Value::String(text))) => Some(FormValue::Text(text.clone())),
        (_, Some(Value::Bool(flag))) => Some(FormValue::Text(flag.to_string())),
        (_, Some(Value::Number(number))) => Some(FormValue::Text(number.to_string())),
        (_, Some(other)) => Some(FormValue::Raw(other.clone())),
    }
}

fn submit_value(field: &Field, value: &FormValue, shift: DateShift) -> Result<Option<Value>, ApiError> {
    let json = match (field.kind, value) {
        (_, FormValue::Raw(raw)) => raw.clone(),
        (FieldKind::Text | FieldKind::Embedded { .. }, FormValue::Text(text)) => {
            if field.required && text.trim().is_empty() {
                return Err(required(field));
            }

            Value::String(text.clone())
        }
        (FieldKind::Choice(options), FormValue::Text(token)) => {
            if !options.iter().any(|option| option == token) {
                return Err(invalid(field.name, &format!("expected one of {}", options.join(", "))));
            }

            Value::String(token.clone())
        }
        (FieldKind::Flag, FormValue::Text(token)) => match token.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(invalid(field.name, "expected `true` or `false`")),
        },
        (FieldKind::Integer, FormValue::Text(number)) => {
            let number = number.trim();

            if number.is_empty() {
                if field.required {
                    return Err(required(field));
                }

                return Ok(None);
            }

            let parsed = number
                .parse::<i64>()
                .map_err(|_| invalid(field.name, "expected a whole number"))?;

            Value::from(parsed)
        }
        (FieldKind::Timestamp, FormValue::Date(local)) => {
            Value::String(format_timestamp(shift.to_server(*local)))
        }
        (FieldKind::Timestamp, FormValue::Text(text)) => {
            let local = parse_timestamp(text).map_err(|err| invalid(field.name, &err.to_string()))?;

            Value::String(format_timestamp(shift.to_server(local)))
        }
        (FieldKind::Refs { .. }, FormValue::List(ids)) => {
            Value::Array(ids.iter().cloned().map(Value::String).collect())
        }
        (FieldKind::Refs { .. }, FormValue::Text(text)) => {
            Value::Array(split_ids(text).into_iter().map(Value::String).collect())
        }
        (FieldKind::Media, FormValue::Media(media)) => Value::String(media.file_id.clone()),
        (FieldKind::Media, FormValue::Text(reference)) => Value::String(reference.clone()),
        _ => return Err(invalid(field.name, "holds an unexpected kind of value")),
    };

    Ok(Some(json))
}

fn split_ids(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(field: &Field) -> ApiError {
    ApiError::Validation(format!("`{}` is required", field.name))
}

fn invalid(name: &str, reason: &str) -> ApiError {
    ApiError::Validation(format!("`{}`: {}", name, reason))
}
