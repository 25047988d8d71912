//! Plain-text table of extracted records for the terminal.

use crate::record::Record;

const NAME_HEADER: &str = "Name";
const NUMBER_HEADER: &str = "Number";

/// Renders records as a two-column table with a row index.
///
/// Widths are counted in chars, so wide CJK glyphs may still misalign.
pub fn render_table(records: &[Record]) -> String {
    let rows: Vec<(String, String)> = records
        .iter()
        .map(|r| {
            (
                r.name().unwrap_or_default().to_string(),
                r.score().map(|s| s.to_string()).unwrap_or_default(),
            )
        })
        .collect();

    let index_width = rows.len().max(1).to_string().len();
    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or(NAME_HEADER.len());

    let mut out = format!(
        "{:>iw$}  {:<nw$}  {}\n",
        "#",
        NAME_HEADER,
        NUMBER_HEADER,
        iw = index_width,
        nw = name_width
    );
    for (i, (name, number)) in rows.iter().enumerate() {
        let pad = name_width - name.chars().count();
        out.push_str(&format!(
            "{:>iw$}  {}{}  {}\n",
            i + 1,
            name,
            " ".repeat(pad),
            number,
            iw = index_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Score;

    #[test]
    fn test_render_table_aligns_names() {
        let records = vec![
            Record::Complete {
                name: "Alice".to_string(),
                score: Score::Integer(42),
            },
            Record::MissingScore {
                name: "Bartholomew".to_string(),
            },
            Record::MissingName {
                score: Score::Integer(7),
            },
        ];
        let table = render_table(&records);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "#  Name         Number");
        assert_eq!(lines[1], "1  Alice        42");
        assert_eq!(lines[2], "2  Bartholomew  ");
        assert_eq!(lines[3], "3               7");
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render_table(&[]), "#  Name  Number\n");
    }
}
