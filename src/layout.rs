use crate::types::{LayoutBlock, Line, PageChars, PdfChar, Word};

/// Rebuild reading-order blocks from the positioned characters of a page.
///
/// Characters become words (split on spaces and horizontal gaps), words on
/// one baseline become lines, two-column pages are split at the gutter so
/// the left column is read before the right one, and vertically adjacent
/// overlapping lines are merged into blocks.
pub fn group_page(page: &PageChars) -> Vec<LayoutBlock> {
    if page.chars.is_empty() {
        return Vec::new();
    }
    let words = group_words(&page.chars, mean_char_width(&page.chars));
    let lines = group_lines(words);
    let lines = reflow_columns(lines, page.width);
    group_blocks(lines)
}

fn mean_char_width(chars: &[PdfChar]) -> f32 {
    let (sum, n) = chars
        .iter()
        .filter(|c| c.width > 0.0)
        .fold((0.0, 0usize), |(sum, n), c| (sum + c.width, n + 1));
    if n == 0 { 5.0 } else { sum / n as f32 }
}

fn group_words(chars: &[PdfChar], mean_width: f32) -> Vec<Word> {
    let gap_threshold = mean_width * 0.3;
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    let mut prev_right = f32::MIN;

    for ch in chars {
        if ch.ch.is_whitespace() {
            words.extend(current.take());
            prev_right = ch.x + ch.width;
            continue;
        }
        let continues = current.as_ref().is_some_and(|w| {
            ch.x - prev_right <= gap_threshold && (ch.y - w.y).abs() <= ch.font_size * 0.5
        });
        if let Some(word) = current.as_mut().filter(|_| continues) {
            word.text.push(ch.ch);
            word.width = (ch.x + ch.width - word.x).max(word.width);
        } else {
            words.extend(current.take());
            current = Some(Word {
                text: ch.ch.to_string(),
                x: ch.x,
                y: ch.y,
                width: ch.width,
                font_size: ch.font_size,
            });
        }
        prev_right = ch.x + ch.width;
    }
    words.extend(current);
    words
}

fn group_lines(words: Vec<Word>) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for word in words {
        // Only look back a few lines; superscripts and subscripts still join.
        let lookback = lines.len().saturating_sub(5);
        let target = lines[lookback..]
            .iter()
            .rposition(|line| (word.y - line.y).abs() < word.font_size * 0.5)
            .map(|i| i + lookback);
        if let Some(idx) = target {
            let line = &mut lines[idx];
            line.x_start = line.x_start.min(word.x);
            line.x_end = line.x_end.max(word.x + word.width);
            line.words.push(word);
        } else {
            lines.push(Line {
                y: word.y,
                x_start: word.x,
                x_end: word.x + word.width,
                font_size: word.font_size,
                words: vec![word],
            });
        }
    }

    for line in &mut lines {
        line.words.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    // PDF y grows upwards: top of the page first.
    lines.sort_by(|a, b| b.y.total_cmp(&a.y));
    lines
}

fn reflow_columns(lines: Vec<Line>, page_width: f32) -> Vec<Line> {
    let Some(gutter) = find_gutter(&lines, page_width) else {
        return lines;
    };

    let mut left = Vec::new();
    let mut right = Vec::new();
    for line in lines {
        let (l, r): (Vec<Word>, Vec<Word>) = line
            .words
            .into_iter()
            .partition(|w| w.x + w.width / 2.0 < gutter);
        left.extend(line_from_words(l, line.y, line.font_size));
        right.extend(line_from_words(r, line.y, line.font_size));
    }
    left.extend(right);
    left
}

/// X position of an empty vertical strip in the middle 30-70% of the page
/// with text on both sides, if the page has two columns.
fn find_gutter(lines: &[Line], page_width: f32) -> Option<f32> {
    const BUCKETS: usize = 200;
    if lines.is_empty() || page_width <= 0.0 {
        return None;
    }
    let bucket_of = |x: f32| (((x / page_width) * BUCKETS as f32) as usize).min(BUCKETS - 1);
    let mut coverage = vec![0u32; BUCKETS];
    for word in lines.iter().flat_map(|l| &l.words) {
        for bucket in &mut coverage[bucket_of(word.x)..=bucket_of(word.x + word.width)] {
            *bucket += 1;
        }
    }

    let (lo, hi) = (BUCKETS * 30 / 100, BUCKETS * 70 / 100);
    let sparse = (lines.len() / 10) as u32;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for i in lo..hi {
        if coverage[i] <= sparse {
            let start = *run_start.get_or_insert(i);
            let len = i - start + 1;
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((start, len));
            }
        } else {
            run_start = None;
        }
    }

    let (start, len) = best?;
    let has_left = coverage[..start].iter().any(|&c| c > sparse);
    let has_right = coverage[start + len..].iter().any(|&c| c > sparse);
    if !(has_left && has_right) {
        return None;
    }
    Some((start as f32 + len as f32 / 2.0) * page_width / BUCKETS as f32)
}

fn line_from_words(words: Vec<Word>, y: f32, font_size: f32) -> Option<Line> {
    let x_start = words.iter().map(|w| w.x).reduce(f32::min)?;
    let x_end = words.iter().map(|w| w.x + w.width).reduce(f32::max)?;
    Some(Line { words, y, x_start, x_end, font_size })
}

fn group_blocks(lines: Vec<Line>) -> Vec<LayoutBlock> {
    let mut blocks: Vec<LayoutBlock> = Vec::new();

    for line in lines {
        let joins = blocks.last().and_then(|b| b.lines.last()).is_some_and(|prev| {
            let gap = (prev.y - line.y).abs();
            let overlaps = line.x_start < prev.x_end && line.x_end > prev.x_start;
            gap < line.font_size * 1.5 && overlaps
        });
        if let Some(block) = blocks.last_mut().filter(|_| joins) {
            let right = (block.x + block.width).max(line.x_end);
            block.x = block.x.min(line.x_start);
            block.width = right - block.x;
            block.height = block.y - line.y + block.font_size;
            block.lines.push(line);
        } else {
            blocks.push(LayoutBlock {
                x: line.x_start,
                y: line.y,
                width: line.x_end - line.x_start,
                height: line.font_size,
                font_size: line.font_size,
                lines: vec![line],
            });
        }
    }
    blocks
}
