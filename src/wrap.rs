use crate::model::Word;
use crate::style::LineStyles;

/// One wrapped visual row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubLine<'a> {
    pub words: Vec<&'a Word>,
    pub max_size: f64,
}

impl SubLine<'_> {
    pub fn indices(&self) -> Vec<i64> {
        self.words.iter().map(|word| word.index).collect()
    }
}

/// Greedy single pass. A word opens a new row when it is strictly larger
/// than the row's running maximum, or when the row already holds the active
/// count limit. Limits are consumed one per wrap; once exhausted, rows are
/// bounded by size only.
pub fn wrap_words<'a>(
    words: impl IntoIterator<Item = &'a Word>,
    styles: &LineStyles,
    line_limits: &[usize],
) -> Vec<SubLine<'a>> {
    let mut rows = Vec::new();
    let mut current: Vec<&'a Word> = Vec::new();
    let mut current_max = 0.0_f64;
    let mut limit_index = 0;

    for word in words {
        let size = styles.size_of(word.index);
        let limit = line_limits.get(limit_index).copied();
        let exceeds_size = size > current_max;
        let exceeds_count = limit.is_some_and(|limit| current.len() >= limit);

        if current.is_empty() || !(exceeds_size || exceeds_count) {
            current.push(word);
            current_max = current_max.max(size);
            continue;
        }

        rows.push(SubLine {
            words: std::mem::take(&mut current),
            max_size: current_max,
        });
        limit_index += 1;
        current.push(word);
        current_max = size;
    }

    if !current.is_empty() {
        rows.push(SubLine {
            words: current,
            max_size: current_max,
        });
    }
    rows
}
