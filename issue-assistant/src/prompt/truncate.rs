//! Character-budget truncation for issue text.

use std::borrow::Cow;

/// Appended to any text cut down to its budget.
pub const TRUNCATION_MARKER: &str = "\n[... truncated]";

/// Smallest budget accepted; leaves room for the marker plus some text.
pub const MIN_BUDGET: usize = 64;

/// Cuts `text` so that, marker included, it holds at most `budget` characters.
///
/// Characters are Unicode scalar values, so multi-byte text is never split
/// inside a code point. Text already within budget is returned unchanged.
#[must_use]
pub fn truncate_to_budget(text: &str, budget: usize) -> Cow<'_, str> {
    if text.chars().count() <= budget {
        return Cow::Borrowed(text);
    }

    let keep = budget.saturating_sub(TRUNCATION_MARKER.chars().count());
    let cut = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(index, _)| index);
    Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut]))
}
