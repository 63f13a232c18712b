use std::path::Path;

use crate::lister::PathEntry;

/// Result of one completion request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Exactly one entry matched; `text` is its full name.
    Resolved {
        /// Replacement text.
        text: String,
        /// The matched entry.
        entry: PathEntry,
    },
    /// Several entries matched; `text` is extended to their longest common
    /// prefix (it may equal the input when no further progress is possible).
    Extended {
        /// Replacement text.
        text: String,
        /// Number of entries still matching.
        candidates: usize,
    },
    /// Nothing starts with the typed text; the text is left unchanged.
    NoMatch,
}

impl Completion {
    /// Replacement text, `None` when nothing matched.
    pub fn text(&self) -> Option<&str> {
        match self {
            Completion::Resolved { text, .. } | Completion::Extended { text, .. } => Some(text),
            Completion::NoMatch => None,
        }
    }

    /// The directory to navigate into when the match is unique and a directory.
    pub fn directory_candidate(&self) -> Option<&Path> {
        match self {
            Completion::Resolved { entry, .. } if entry.is_dir() => Some(entry.path()),
            _ => None,
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Completion::Resolved { .. } => "resolved",
            Completion::Extended { .. } => "extended",
            Completion::NoMatch => "no_match",
        }
    }
}

/// Shell-style completion of typed text against a directory listing.
///
/// Completion is a pure function of the text and the entries: no cycling
/// state is kept, and applying it to its own output changes nothing.
/// Matching is case-insensitive; names that differ only by case stay
/// ambiguous until the typed text narrows them to one entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionEngine;

impl CompletionEngine {
    /// Resolve or extend `typed` toward the entries whose names start with it.
    ///
    /// When several entries match, the typed characters are kept as written
    /// and extended with the shared remainder taken from the first match in
    /// listing order.
    pub fn complete(&self, typed: &str, entries: &[PathEntry]) -> Completion {
        let matches: Vec<&PathEntry> = entries
            .iter()
            .filter(|e| starts_with_case_insensitive(e.name(), typed))
            .collect();

        match matches.as_slice() {
            [] => Completion::NoMatch,
            [only] => Completion::Resolved {
                text: only.name().to_string(),
                entry: (*only).clone(),
            },
            [first, rest @ ..] => {
                let shared = rest
                    .iter()
                    .map(|other| common_prefix_chars(first.name(), other.name()))
                    .min()
                    .unwrap_or(0);
                let typed_chars = typed.chars().count();
                let mut text = typed.to_string();
                text.extend(
                    first
                        .name()
                        .chars()
                        .skip(typed_chars)
                        .take(shared.saturating_sub(typed_chars)),
                );
                Completion::Extended {
                    text,
                    candidates: matches.len(),
                }
            }
        }
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn starts_with_case_insensitive(name: &str, prefix: &str) -> bool {
    let mut it_name = name.chars();
    prefix.chars().all(|pc| {
        it_name
            .next()
            .is_some_and(|nc| chars_eq_ignore_case(nc, pc))
    })
}

/// Length in chars of the case-insensitive common prefix.
fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(ca, cb)| chars_eq_ignore_case(*ca, *cb))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(name: &str) -> PathEntry {
        PathEntry::new(name, PathBuf::from("/docs").join(name), false)
    }

    fn dir(name: &str) -> PathEntry {
        PathEntry::new(name, PathBuf::from("/docs").join(name), true)
    }

    #[test]
    fn unique_match_resolves_to_full_name() {
        let entries = [dir("img"), file("notes.txt"), file("Notes2.txt")];
        let c = CompletionEngine.complete("IM", &entries);
        assert_eq!(c.text(), Some("img"));
        assert_eq!(c.directory_candidate(), Some(Path::new("/docs/img")));
    }

    #[test]
    fn several_matches_extend_to_longest_common_prefix() {
        let entries = [dir("img"), file("notes.txt"), file("Notes2.txt")];
        let c = CompletionEngine.complete("no", &entries);
        assert_eq!(
            c,
            Completion::Extended {
                text: "notes".into(),
                candidates: 2
            }
        );
        assert_eq!(c.directory_candidate(), None);
    }

    #[test]
    fn typed_characters_keep_their_case() {
        let entries = [file("notes.txt"), file("Notes2.txt")];
        let c = CompletionEngine.complete("NO", &entries);
        assert_eq!(c.text(), Some("NOtes"));
    }

    #[test]
    fn no_match_leaves_text_alone() {
        let entries = [file("notes.txt")];
        assert_eq!(CompletionEngine.complete("x", &entries), Completion::NoMatch);
        assert_eq!(CompletionEngine.complete("", &[]), Completion::NoMatch);
    }

    #[test]
    fn case_only_collisions_stay_ambiguous() {
        let entries = [file("README"), file("readme")];
        let c = CompletionEngine.complete("readme", &entries);
        assert_eq!(
            c,
            Completion::Extended {
                text: "readme".into(),
                candidates: 2
            }
        );
    }

    #[test]
    fn completing_the_output_again_is_a_fixpoint() {
        let entries = [
            dir("notes"),
            file("notes.txt"),
            file("Notes2.txt"),
            file("zeta.md"),
        ];
        for typed in ["", "n", "NOT", "notes.", "z", "q"] {
            let first = CompletionEngine.complete(typed, &entries);
            let text = first.text().unwrap_or(typed).to_string();
            let second = CompletionEngine.complete(&text, &entries);
            assert_eq!(second.text().unwrap_or(&text), text, "typed {typed:?}");
        }
    }

    #[test]
    fn multibyte_names_are_split_on_char_boundaries() {
        let entries = [file("été-1.txt"), file("ÉTÉ-2.txt")];
        let c = CompletionEngine.complete("é", &entries);
        assert_eq!(c.text(), Some("été-"));
    }
}
