/*!
 * CSV serialization of export rows
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::export::AssetRow;

/// Escape a CSV field that might contain commas, quotes, or newlines
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write the row collection to `path`, one line per row
///
/// The header row is opt-in; the default output is headerless. The file is
/// truncated, written once, and flushed before returning.
pub fn write_csv(path: &Path, rows: &[AssetRow], header: bool) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    if header {
        writeln!(writer, "asset_id,manifest")?;
    }

    for row in rows {
        writeln!(
            writer,
            "{},{}",
            escape_csv(&row.asset_id),
            escape_csv(&row.manifest)
        )?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(asset_id: &str, manifest: &str) -> AssetRow {
        AssetRow {
            asset_id: asset_id.to_string(),
            manifest: manifest.to_string(),
        }
    }

    #[test]
    fn test_write_without_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(
            &path,
            &[row("Spring promo", "promo.ism"), row("Fall promo", "fall.ism")],
            false,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Spring promo,promo.ism\nFall promo,fall.ism\n");
    }

    #[test]
    fn test_write_with_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &[row("a", "a.ism")], true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "asset_id,manifest\na,a.ism\n");
    }

    #[test]
    fn test_empty_rows_produce_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &[], false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_rewrite_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &[row("one", "1.ism"), row("two", "2.ism")], false).unwrap();
        write_csv(&path, &[row("one", "1.ism")], false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "one,1.ism\n");
    }
}
