use {
    crate::value::Value,
    indexmap::IndexMap,
    itertools::Itertools,
    std::borrow::Cow,
    tap::{Pipe, Tap},
    tracing::instrument,
};

pub mod format;
pub mod path;

pub use path::{PathStyle, Segment};

const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Path -> rendered scalar. Equality ignores insertion order.
pub type FlatMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unsupported value on path ({path}) of type ({kind})")]
    UnsupportedKind { path: String, kind: &'static str },
    #[error("unknown value on path ({path}) of type ({kind})")]
    UnknownKind { path: String, kind: &'static str },
}

impl Error {
    pub fn path(&self) -> &str {
        match self {
            Error::UnsupportedKind { path, .. } | Error::UnknownKind { path, .. } => path,
        }
    }
}

/// Every error of a flattening pass along with the entries that could still be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.iter().join("; "))]
pub struct PartialError {
    pub partial: FlatMap,
    pub errors: Vec<Error>,
}

/// Outcome of a flattening pass. Entries are always populated, even when some leaves failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub entries: FlatMap,
    pub errors: Vec<Error>,
}

impl Flattened {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<FlatMap, PartialError> {
        match self.errors.is_empty() {
            true => Ok(self.entries),
            false => Err(PartialError {
                partial: self.entries,
                errors: self.errors,
            }),
        }
    }

    fn merge(&mut self, other: Flattened) {
        self.entries.extend(other.entries);
        self.errors.extend(other.errors);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattener {
    pub path_style: PathStyle,
    pub float_precision: usize,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            path_style: PathStyle::default(),
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

impl Flattener {
    pub fn with_path_style(self, path_style: PathStyle) -> Self {
        self.tap_mut(|f| f.path_style = path_style)
    }

    pub fn with_float_precision(self, float_precision: usize) -> Self {
        self.tap_mut(|f| f.float_precision = float_precision)
    }

    /// Flattens `value` into `path -> string` entries rooted at `prefix`.
    ///
    /// A failing leaf is reported in [`Flattened::errors`] and skipped; its siblings are
    /// still rendered.
    #[instrument(level = "trace", skip(self, value), fields(kind = value.kind()))]
    pub fn flatten(&self, value: &Value, prefix: &str) -> Flattened {
        self.flatten_at(value, prefix)
            .tap(|out| tracing::trace!(entries = out.entries.len(), errors = out.errors.len(), "flattened"))
    }

    fn flatten_at(&self, value: &Value, prefix: &str) -> Flattened {
        let mut out = Flattened::default();
        match value {
            Value::Null => {
                out.entries.insert(prefix.to_owned(), "null".to_owned());
            }
            Value::Mapping(map) => map.iter().for_each(|(key, value)| {
                self.path_style
                    .join(prefix, Segment::Field(Cow::Borrowed(key)))
                    .pipe(|path| self.assign(&mut out, path, value))
            }),
            Value::Sequence(items) => items.iter().enumerate().for_each(|(idx, value)| {
                self.path_style
                    .join(prefix, Segment::Idx(idx))
                    .pipe(|path| self.assign(&mut out, path, value))
            }),
            other => self.assign(&mut out, prefix.to_owned(), other),
        }
        out
    }

    fn assign(&self, out: &mut Flattened, path: String, value: &Value) {
        let rendered = match value {
            Value::Display(display) => display.to_string(),
            Value::Null => "null".to_owned(),
            Value::Bool(v) => v.to_string(),
            Value::Signed(v) => v.to_string(),
            Value::Unsigned(v) => v.to_string(),
            Value::Float(v) => format::format_float(*v, self.float_precision),
            Value::String(v) => v.clone(),
            Value::Sequence(_) | Value::Mapping(_) => return out.merge(self.flatten_at(value, &path)),
            Value::Unsupported(kind) => {
                tracing::debug!(%path, %kind, "skipping unsupported value");
                return out.errors.push(Error::UnsupportedKind { path, kind: kind.name() });
            }
            Value::Unknown(kind) => {
                tracing::debug!(%path, %kind, "skipping unknown value");
                return out.errors.push(Error::UnknownKind { path, kind: *kind });
            }
        };
        out.entries.insert(path, rendered);
    }
}

/// [`Flattener::flatten`] with bracketed paths and six fractional digits for floats.
pub fn flatten(value: &Value, prefix: &str) -> Flattened {
    Flattener::default().flatten(value, prefix)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::value::UnsupportedKind,
        serde_json::json,
        std::{
            collections::{BTreeMap, HashMap},
            fmt,
        },
    };

    fn flat(entries: &[(&str, &str)]) -> FlatMap {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn complete(value: impl Into<Value>, prefix: &str) -> FlatMap {
        flatten(&value.into(), prefix)
            .into_result()
            .unwrap_or_else(|e| panic!("flattening failed: {e}"))
    }

    #[test]
    fn test_null_root() {
        assert_eq!(complete(Value::Null, ""), flat(&[("", "null")]));
        assert_eq!(complete(Value::Null, r#"anything["x"]"#), flat(&[(r#"anything["x"]"#, "null")]));
    }

    #[test]
    fn test_scalars_at_root() {
        assert_eq!(complete(true, ""), flat(&[("", "true")]));
        assert_eq!(complete(42i8, ""), flat(&[("", "42")]));
        assert_eq!(complete(-42i64, ""), flat(&[("", "-42")]));
        assert_eq!(complete(42u16, ""), flat(&[("", "42")]));
        assert_eq!(complete(u64::MAX, ""), flat(&[("", "18446744073709551615")]));
        assert_eq!(complete(4.2f32, ""), flat(&[("", "4.2")]));
        assert_eq!(complete(4.2f64, ""), flat(&[("", "4.2")]));
        assert_eq!(complete(4.0f64, ""), flat(&[("", "4")]));
        assert_eq!(complete("foo", "p"), flat(&[("p", "foo")]));
    }

    #[test]
    fn test_strings_are_verbatim() {
        assert_eq!(complete("say \"hi\"\n", ""), flat(&[("", "say \"hi\"\n")]));
    }

    #[test]
    fn test_map_of_strings() {
        let value = BTreeMap::from([("foo", "foo text"), ("bar", "bar text")]);
        assert_eq!(
            complete(value, ""),
            flat(&[(r#"["bar"]"#, "bar text"), (r#"["foo"]"#, "foo text")])
        );
    }

    #[test]
    fn test_hash_map_order_is_irrelevant() {
        let value = (0..32).map(|i| (format!("k{i}"), i)).collect::<HashMap<_, _>>();
        let got = complete(value, "m");
        assert_eq!(got.len(), 32);
        assert_eq!(
            got,
            (0..32)
                .rev()
                .map(|i| (format!(r#"m["k{i}"]"#), i.to_string()))
                .collect::<FlatMap>()
        );
    }

    #[test]
    fn test_map_of_maps() {
        let value = Value::from(json!({
            "foo": {"bar": "baz"},
            "qux": {"quux": "corge", "grault": "garply"}
        }));
        assert_eq!(
            complete(value, ""),
            flat(&[
                (r#"["foo"]["bar"]"#, "baz"),
                (r#"["qux"]["quux"]"#, "corge"),
                (r#"["qux"]["grault"]"#, "garply"),
            ])
        );
    }

    #[test]
    fn test_sequences_are_one_based() {
        assert_eq!(complete(vec![9, 99, 999], ""), flat(&[("[1]", "9"), ("[2]", "99"), ("[3]", "999")]));
        assert_eq!(
            complete(["foo", "bar", "baz"], "strings"),
            flat(&[("strings[1]", "foo"), ("strings[2]", "bar"), ("strings[3]", "baz")])
        );
    }

    #[test]
    fn test_nesting_composes() {
        assert_eq!(
            complete(json!({"a": [1, 2]}), ""),
            flat(&[(r#"["a"][1]"#, "1"), (r#"["a"][2]"#, "2")])
        );
        assert_eq!(
            complete(vec![vec![1, 2], vec![3, 4]], ""),
            flat(&[("[1][1]", "1"), ("[1][2]", "2"), ("[2][1]", "3"), ("[2][2]", "4")])
        );
        assert_eq!(
            complete(json!([{"name": "foo"}, {"name": "bar"}]), ""),
            flat(&[(r#"[1]["name"]"#, "foo"), (r#"[2]["name"]"#, "bar")])
        );
    }

    #[test]
    fn test_empty_containers_contribute_nothing() {
        assert_eq!(complete(json!({"a": [], "b": {}, "c": 1}), ""), flat(&[(r#"["c"]"#, "1")]));
    }

    #[test]
    fn test_nested_null() {
        assert_eq!(
            complete(json!({"a": null, "b": [null]}), ""),
            flat(&[(r#"["a"]"#, "null"), (r#"["b"][1]"#, "null")])
        );
    }

    #[test]
    fn test_display_takes_precedence() {
        struct Celsius(f64);
        impl fmt::Display for Celsius {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.1}°C", self.0)
            }
        }

        assert_eq!(complete(Value::display(Celsius(21.0)), ""), flat(&[("", "21.0°C")]));
        let value: Value = [("temp", Value::display(Celsius(-3.24)))].into_iter().collect();
        assert_eq!(complete(value, "t"), flat(&[(r#"t["temp"]"#, "-3.2°C")]));
    }

    #[test_log::test]
    fn test_unsupported_leaf_keeps_siblings() {
        let value: Value = [
            ("name", Value::from("bob")),
            ("f", Value::Unsupported(UnsupportedKind::Function)),
            ("list", Value::from(vec![Value::from(1), Value::Unknown("interface"), Value::from(3)])),
        ]
        .into_iter()
        .collect();

        let out = flatten(&value, "");
        assert!(!out.is_complete());
        assert_eq!(
            out.entries,
            flat(&[(r#"["name"]"#, "bob"), (r#"["list"][1]"#, "1"), (r#"["list"][3]"#, "3")])
        );
        assert_eq!(
            out.errors,
            vec![
                Error::UnsupportedKind {
                    path: r#"["f"]"#.into(),
                    kind: "func"
                },
                Error::UnknownKind {
                    path: r#"["list"][2]"#.into(),
                    kind: "interface"
                },
            ]
        );

        let err = out.into_result().unwrap_err();
        assert_eq!(err.partial.len(), 3);
        assert_eq!(
            err.to_string(),
            r#"unsupported value on path (["f"]) of type (func); unknown value on path (["list"][2]) of type (interface)"#
        );
    }

    #[test]
    fn test_unsupported_root() {
        let out = flatten(&Value::Unsupported(UnsupportedKind::Complex), "z");
        assert!(out.entries.is_empty());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].path(), "z");
    }

    #[test]
    fn test_dotted_style() {
        let value = Value::from(json!({"name": "bob", "children": [{"age": 5}]}));
        let out = Flattener::default()
            .with_path_style(PathStyle::Dotted)
            .flatten(&value, "");
        assert_eq!(out.entries, flat(&[("name", "bob"), ("children[1].age", "5")]));

        let out = Flattener::default()
            .with_path_style(PathStyle::Dotted)
            .flatten(&value, "root");
        assert_eq!(out.entries, flat(&[("root.name", "bob"), ("root.children[1].age", "5")]));
    }

    #[test]
    fn test_float_precision() {
        let out = Flattener::default()
            .with_float_precision(2)
            .flatten(&Value::from(vec![1.0 / 3.0, 2.5]), "");
        assert_eq!(out.entries, flat(&[("[1]", "0.33"), ("[2]", "2.5")]));
    }

    #[test]
    fn test_deep_nesting() {
        let value = (0..64).fold(Value::from("leaf"), |inner, _| Value::from(vec![inner]));
        let out = complete(value, "");
        assert_eq!(out.len(), 1);
        assert_eq!(out.keys().next().map(String::len), Some(64 * 3));
    }
}
