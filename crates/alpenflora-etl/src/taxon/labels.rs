//! Localized names and shortened summaries.

use alpenflora_core::model::{Language, LocalizedEntry, TaxonEntity};

use crate::taxon::SummarySource;

/// Page title used for `lang`: the sitelink, then a non-empty label,
/// then the Latin query itself.
pub fn display_title<'a>(entity: &'a TaxonEntity, lang: Language, latin: &'a str) -> &'a str {
    entity
        .sitelink(&lang.wiki_key())
        .or_else(|| entity.label(lang.code()).filter(|label| !label.is_empty()))
        .unwrap_or(latin)
}

fn is_sentence_start(c: char) -> bool {
    c.is_ascii_uppercase() || "ÄÖÜÀÂÉÈÊÎÔÙÇ".contains(c)
}

/// Keep the first `n` sentences of `text`, joined by single spaces.
///
/// A boundary is `.`, `!` or `?` followed by whitespace and an uppercase
/// letter. Text without any boundary is returned whole (trimmed).
pub fn first_sentences(text: &str, n: usize) -> String {
    let text = text.trim();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && is_sentence_start(chars[j].1) {
                sentences.push(&text[start..pos + c.len_utf8()]);
                start = chars[j].0;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Build the [`LocalizedEntry`] for one language.
///
/// A missing page yields an empty description. Every other summary
/// failure, transient or not, is logged and also yields an empty
/// description; it never propagates to the caller. Knowledge-graph errors
/// are unaffected and still propagate from the resolver.
pub async fn localize<S>(
    summaries: &S,
    entity: &TaxonEntity,
    lang: Language,
    latin: &str,
    sentences: usize,
) -> LocalizedEntry
where
    S: SummarySource + ?Sized,
{
    let title = display_title(entity, lang, latin);
    let summary = match summaries.summary(lang, title).await {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            log::warn!("Summary for {:?} ({}) unavailable: {}", title, lang, e);
            String::new()
        }
    };
    LocalizedEntry::new(title, first_sentences(&summary, sentences))
}
