//! Chain configuration (spec.md §1.3): which tokenizer a filter falls back to
//! parenting when its registration arguments don't name one explicitly.
//!
//! Grounded on each filter's `xCreate` in the original source, where an
//! omitted/absent parent argument resolves to a fixed default rather than an
//! error — `snowball.c` defaults to `"stopwords"`, while `phrases.c` and
//! `synonyms.c` chain onto each other down to `"unicode61"`.

/// A parent tokenizer reference, as it appears in a filter's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Name the registrar resolves via the host's `xFindTokenizer`.
    Named(String),
    /// No name given; use this filter's hardcoded default parent.
    Default,
}

impl ParentRef {
    /// Resolves `args`' first element as a parent name, or [`ParentRef::Default`]
    /// if `args` is empty — the shared argument-parsing rule every filter's
    /// `xCreate` follows (parent name, if present, always comes first, except
    /// for `snowball`'s language-list-then-parent-name order; see
    /// [`resolve_stemmer_args`] for that one inversion).
    #[must_use]
    pub fn from_args(args: &[String]) -> (Self, &[String]) {
        match args.split_first() {
            Some((name, rest)) => (ParentRef::Named(name.clone()), rest),
            None => (ParentRef::Default, args),
        }
    }

    #[must_use]
    pub fn resolve(&self, default_name: &'static str) -> &str {
        match self {
            ParentRef::Named(name) => name,
            ParentRef::Default => default_name,
        }
    }
}

/// The default parent each filter falls back to when unconfigured.
#[must_use]
pub const fn default_parent_for(filter_name: &str) -> &'static str {
    match filter_name.as_bytes() {
        b"synonyms" => "phrases",
        b"phrases" => "stopwords",
        b"snowball" => "stopwords",
        _ => "unicode61",
    }
}

/// Splits `snowball`'s argument list into (parent, languages): the last
/// argument is the parent name, everything before it is a language — the
/// convention spec.md §4.4 specifies directly. `snowball.c` itself doesn't
/// use a "last positional arg is the parent" rule at all: it resolves
/// `SNOWBALL_DEFAULT_LANGUAGE`/`SNOWBALL_DEFAULT_PARENT_TOKENIZER` as two
/// independent constants, validating languages via a front-scan
/// (`process_list_languages`) and checking for a parent name separately.
#[must_use]
pub fn resolve_stemmer_args(args: &[String]) -> (ParentRef, Vec<String>) {
    match args.split_last() {
        Some((parent, languages)) => (ParentRef::Named(parent.clone()), languages.to_vec()),
        None => (ParentRef::Default, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parent_chain_matches_spec() {
        assert_eq!(default_parent_for("synonyms"), "phrases");
        assert_eq!(default_parent_for("phrases"), "stopwords");
        assert_eq!(default_parent_for("snowball"), "stopwords");
        assert_eq!(default_parent_for("stopwords"), "unicode61");
    }

    #[test]
    fn parent_ref_from_args_front_loaded() {
        let args = vec!["mystopwords".to_string(), "other".to_string()];
        let (parent, rest) = ParentRef::from_args(&args);
        assert_eq!(parent, ParentRef::Named("mystopwords".into()));
        assert_eq!(rest, ["other".to_string()]);
    }

    #[test]
    fn parent_ref_from_empty_args_is_default() {
        let (parent, rest) = ParentRef::from_args(&[]);
        assert_eq!(parent, ParentRef::Default);
        assert!(rest.is_empty());
    }

    #[test]
    fn stemmer_args_put_parent_last() {
        let args = vec!["english".to_string(), "french".to_string(), "myparent".to_string()];
        let (parent, languages) = resolve_stemmer_args(&args);
        assert_eq!(parent, ParentRef::Named("myparent".into()));
        assert_eq!(languages, vec!["english".to_string(), "french".to_string()]);
    }

    #[test]
    fn stemmer_args_empty_is_default_parent_no_languages() {
        let (parent, languages) = resolve_stemmer_args(&[]);
        assert_eq!(parent, ParentRef::Default);
        assert!(languages.is_empty());
    }
}
