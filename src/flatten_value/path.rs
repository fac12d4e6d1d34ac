use {
    serde::{Deserialize, Serialize},
    std::borrow::Cow,
};

/// How child segments are appended to their parent's path.
///
/// `Bracketed` renders `["user"]["tags"][1]`, `Dotted` renders `user.tags[1]`.
/// Indices are always 1-based and bracketed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    #[default]
    Bracketed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment<'a> {
    /// 0-based position in a sequence.
    Idx(usize),
    Field(Cow<'a, str>),
}

impl PathStyle {
    pub fn join(self, parent: &str, segment: Segment<'_>) -> String {
        match (self, segment) {
            (_, Segment::Idx(idx)) => format!("{parent}[{}]", idx + 1),
            (PathStyle::Bracketed, Segment::Field(key)) => format!("{parent}[\"{key}\"]"),
            (PathStyle::Dotted, Segment::Field(key)) if parent.is_empty() => key.into_owned(),
            (PathStyle::Dotted, Segment::Field(key)) => format!("{parent}.{key}"),
        }
    }
}
