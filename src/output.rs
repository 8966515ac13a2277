//! Result Rendering
//!
//! Text form of a [`RankedResult`], written to stdout and optionally
//! appended to the results file.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use tracing::debug;

use crate::error::{Error, Result};
use crate::vector::RankedResult;

/// Write the header and one `word - Cosine Similarity: score` line per match
pub fn render<W: Write>(result: &RankedResult, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Top {} similar words for: {}",
        result.len(),
        result.query
    )?;
    for m in result.iter() {
        writeln!(out, "{} - Cosine Similarity: {}", m.word, m.score)?;
    }
    Ok(())
}

/// Append a timestamped rendering of `result` to `path`
pub fn append_to_file(result: &RankedResult, path: &Path) -> Result<()> {
    let to_error = |source: io::Error| Error::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;
    write_entry(result, BufWriter::new(file)).map_err(to_error)?;

    debug!(path = %path.display(), matches = result.len(), "Results written");
    Ok(())
}

fn write_entry<W: Write>(result: &RankedResult, mut writer: W) -> io::Result<()> {
    writeln!(writer, "# {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    render(result, &mut writer)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::ScoredWord;
    use tempfile::tempdir;

    fn sample() -> RankedResult {
        RankedResult {
            query: "king".to_string(),
            requested: 2,
            matches: vec![
                ScoredWord {
                    word: "queen".to_string(),
                    score: 0.5,
                },
                ScoredWord {
                    word: "man".to_string(),
                    score: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_render() {
        let mut buf = Vec::new();
        render(&sample(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Top 2 similar words for: king\n\
             queen - Cosine Similarity: 0.5\n\
             man - Cosine Similarity: 0\n"
        );
    }

    #[test]
    fn test_append_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");

        append_to_file(&sample(), &path).unwrap();
        append_to_file(&sample(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Top 2 similar words for: king").count(), 2);
        assert!(contents.starts_with("# "));
        assert!(contents.contains("queen - Cosine Similarity: 0.5\n"));
    }

    #[test]
    fn test_append_to_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");
        assert!(matches!(
            append_to_file(&sample(), &path),
            Err(Error::Output { .. })
        ));
    }
}
