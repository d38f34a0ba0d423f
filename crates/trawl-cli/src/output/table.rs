//! Plain aligned tables for terminal output.

const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Header row, a dashed divider, then one line per row. Missing cells render as `-`.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = column_widths(headers, rows);
    shrink_to_fit(&mut widths, headers, options.max_width);

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(title, width)| pad(&clip(title, *width), *width, false))
        .collect::<Vec<_>>()
        .join(GAP);
    let divider = "-".repeat(display_len(&header));

    let mut lines = vec![header, divider];
    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let text = clip(row.get(index).map_or("-", String::as_str), *width);
                let right = is_count(&text);
                let text = if options.color {
                    paint_status(&text)
                } else {
                    text
                };
                pad(&text, *width, right)
            })
            .collect::<Vec<_>>();
        lines.push(cells.join(GAP));
    }
    lines.join("\n")
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, title)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .fold(title.chars().count().max(MIN_COLUMN), usize::max)
        })
        .collect()
}

/// Narrow the widest column one step at a time until the row fits.
fn shrink_to_fit(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();

    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > headers[*index].chars().count().max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
    }
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(width.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

fn is_count(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

fn pad(value: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(display_len(value)));
    if right {
        format!("{fill}{value}")
    } else {
        format!("{value}{fill}")
    }
}

/// Outcome statuses in green, yellow or red.
fn paint_status(value: &str) -> String {
    let code = match value {
        "success" | "true" => "32",
        "empty" => "33",
        "timeout" | "transport_error" | "upstream_error" | "false" => "31",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}

/// Visible width, ignoring SGR escape sequences.
fn display_len(value: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for ch in value.chars() {
        match (in_escape, ch) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => len += 1,
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn columns_align_and_counts_right_justify() {
        let rows = vec![
            vec!["a".to_string(), "success".to_string(), "12".to_string()],
            vec!["bb".to_string(), "timeout".to_string(), "0".to_string()],
        ];
        let table = render_table(&["source", "status", "items"], &rows, TableOptions::default());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|ch| ch == '-'));
        assert_eq!(lines[2], "a       success     12");
        assert_eq!(lines[3], "bb      timeout      0");
    }

    #[test]
    fn wide_cells_are_clipped_to_max_width() {
        let rows = vec![vec!["k".to_string(), "x".repeat(80)]];
        let table = render_table(
            &["key", "title"],
            &rows,
            TableOptions {
                max_width: Some(30),
                color: false,
            },
        );
        assert!(table.lines().all(|line| line.chars().count() <= 30));
        assert!(table.contains('…'));
    }

    #[test]
    fn color_does_not_change_visible_width() {
        let painted = paint_status("timeout");
        assert_ne!(painted, "timeout");
        assert_eq!(display_len(&painted), "timeout".len());
        assert_eq!(paint_status("dune"), "dune");
    }
}
