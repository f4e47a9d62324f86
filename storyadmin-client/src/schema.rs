/// How a field is edited and how it goes back on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Text limited to a fixed set of tokens
    Choice(&'static [&'static str]),
    /// Edited as `"true"`/`"false"`, sent as a JSON boolean
    Flag,
    /// Edited as text, sent as a JSON number
    Integer,
    /// Edited as a shifted local date, sent as `YYYY-MM-DD HH:mm:ss`
    Timestamp,
    /// List of ids; server values may be objects carrying the id under `key`
    Refs { key: &'static str },
    /// Id seeded from an embedded object, e.g. `author.author_id`
    Embedded {
        object: &'static str,
        key: &'static str,
    },
    /// Uploaded file, sent as its `file_id`
    Media,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Form default for text-like kinds
    pub default: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: "",
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Choice(options)).with_default(options[0])
    }

    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self::new(name, FieldKind::Flag).with_default(if default { "true" } else { "false" })
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer).with_default("0")
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn with_default(self, default: &'static str) -> Self {
        Self { default, ..self }
    }
}

/// Looks a field up by name.
pub fn find<'f>(fields: &'f [Field], name: &str) -> Option<&'f Field> {
    fields.iter().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_defaults_to_first_option() {
        const STATUS: Field = Field::choice("status", &["draft", "published"]);

        assert_eq!(STATUS.default, "draft");
        assert!(!STATUS.required);
    }

    #[test]
    fn builders_compose() {
        const ORDERED: Field = Field::integer("ordered").required();

        assert_eq!(ORDERED.kind, FieldKind::Integer);
        assert_eq!(ORDERED.default, "0");
        assert!(ORDERED.required);
    }

    #[test]
    fn find_by_name() {
        let fields = [Field::text("title"), Field::flag("is_hot", false)];

        assert_eq!(find(&fields, "is_hot").map(|f| f.default), Some("false"));
        assert!(find(&fields, "missing").is_none());
    }
}
