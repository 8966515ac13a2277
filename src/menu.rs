//! Interactive Menu
//!
//! Numbered-option command loop over any line reader and writer. The loop
//! only dispatches to [`Session`]; every command failure is printed as one
//! line and the loop continues. Only `0`/`quit`/`exit` or end of input stop
//! it.

use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;

use tracing::debug;

use crate::config::DEFAULT_OUTPUT_PATH;
use crate::output;
use crate::session::Session;
use crate::vector::RankedResult;

/// A menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    LoadEmbeddings,
    SetOutput,
    EnterText,
    TopMatches,
    Statistics,
    Quit,
}

impl MenuOption {
    /// Parse a menu selection, returning `None` for anything unrecognised
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            return Some(MenuOption::Quit);
        }

        match input.parse::<u8>().ok()? {
            1 => Some(MenuOption::LoadEmbeddings),
            2 => Some(MenuOption::SetOutput),
            3 => Some(MenuOption::EnterText),
            4 => Some(MenuOption::TopMatches),
            5 => Some(MenuOption::Statistics),
            0 => Some(MenuOption::Quit),
            _ => None,
        }
    }
}

/// Parse a match count. Negative counts mean "no matches".
pub fn parse_count(input: &str) -> Option<usize> {
    let n = input.trim().parse::<i64>().ok()?;
    Some(usize::try_from(n).unwrap_or(0))
}

type Step = io::Result<ControlFlow<()>>;

/// Command loop bound to a session
pub struct Menu<'a, R, W> {
    session: &'a Session,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(session: &'a Session, input: R, out: W) -> Self {
        Self {
            session,
            input,
            out,
        }
    }

    /// Run until the user quits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            let step = match MenuOption::parse(&line) {
                Some(MenuOption::LoadEmbeddings) => self.load_embeddings()?,
                Some(MenuOption::SetOutput) => self.set_output()?,
                Some(MenuOption::EnterText) => self.enter_text()?,
                Some(MenuOption::TopMatches) => self.top_matches()?,
                Some(MenuOption::Statistics) => self.statistics()?,
                Some(MenuOption::Quit) => ControlFlow::Break(()),
                None => {
                    writeln!(self.out, "Invalid option")?;
                    ControlFlow::Continue(())
                }
            };
            if step.is_break() {
                break;
            }
        }

        writeln!(self.out, "Goodbye!")?;
        self.out.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        write!(
            self.out,
            r#"
************************************************************
*                                                          *
*          Similarity Search with Word Embeddings          *
*                                                          *
************************************************************
(1) Specify Embedding File
(2) Specify an Output File (default: {DEFAULT_OUTPUT_PATH})
(3) Enter a Word or Text
(4) Number of matches
(5) Session Statistics
(0) Quit
Select Option [0-5]> "#
        )?;
        self.out.flush()
    }

    /// Read one trimmed line, `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        writeln!(self.out, "{message}")?;
        self.out.flush()?;
        self.read_line()
    }

    fn load_embeddings(&mut self) -> Step {
        let Some(path) = self.prompt("Enter the path for the word embeddings file:")? else {
            return Ok(ControlFlow::Break(()));
        };

        match self.session.load_embeddings(&path) {
            Ok(store) => writeln!(
                self.out,
                "Word embeddings file loaded successfully ({} words, {} dimensions).",
                store.len(),
                store.dimension()
            )?,
            Err(e) => writeln!(self.out, "Error loading word embeddings file: {e}")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn set_output(&mut self) -> Step {
        let message =
            format!("Enter the path for the output file (default: {DEFAULT_OUTPUT_PATH}):");
        let Some(path) = self.prompt(&message)? else {
            return Ok(ControlFlow::Break(()));
        };

        self.session.set_output_destination(path);
        writeln!(
            self.out,
            "Output file path set to: {}",
            self.session.output_destination().display()
        )?;
        Ok(ControlFlow::Continue(()))
    }

    fn enter_text(&mut self) -> Step {
        let Some(text) = self.prompt("Enter a word or text:")? else {
            return Ok(ControlFlow::Break(()));
        };
        self.search(&text, None)
    }

    fn top_matches(&mut self) -> Step {
        let Some(count) = self.prompt("Enter the number of high scoring matches to report:")?
        else {
            return Ok(ControlFlow::Break(()));
        };
        let Some(n) = parse_count(&count) else {
            writeln!(self.out, "Invalid number: {count}")?;
            return Ok(ControlFlow::Continue(()));
        };

        let Some(text) = self.prompt("Enter a word or text:")? else {
            return Ok(ControlFlow::Break(()));
        };
        self.search(&text, Some(n))
    }

    fn statistics(&mut self) -> Step {
        match self.session.store() {
            Some(store) => writeln!(
                self.out,
                "Embeddings: {} words, {} dimensions, loaded {} from {}",
                store.len(),
                store.dimension(),
                store.loaded_at().format("%Y-%m-%d %H:%M:%S"),
                store
                    .source()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<memory>".to_string())
            )?,
            None => writeln!(self.out, "Embeddings: not loaded")?,
        }
        writeln!(
            self.out,
            "Output file: {}",
            self.session.output_destination().display()
        )?;
        writeln!(self.out, "{}", self.session.stats())?;
        Ok(ControlFlow::Continue(()))
    }

    fn search(&mut self, text: &str, n: Option<usize>) -> Step {
        match self.session.query(text, n) {
            Ok(result) => self.show(&result)?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn show(&mut self, result: &RankedResult) -> io::Result<()> {
        writeln!(self.out, "Searching for similar words for: {}", result.query)?;
        output::render(result, &mut self.out)?;
        if let Err(e) = self.session.write_results(result) {
            debug!(error = %e, "Result file write failed");
            writeln!(self.out, "{e}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Cursor;
    use tempfile::{tempdir, NamedTempFile};

    fn run(session: &Session, input: &str) -> String {
        let mut out = Vec::new();
        Menu::new(session, Cursor::new(input.to_string()), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn embeddings_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"king, 1.0, 0.0\nqueen, 0.9, 0.1\nman, 0.0, 1.0\n",
        )
        .unwrap();
        file
    }

    fn quiet_session() -> Session {
        Session::new(Config::default().with_write_results(false))
    }

    #[test]
    fn test_parse_option() {
        assert_eq!(MenuOption::parse("1"), Some(MenuOption::LoadEmbeddings));
        assert_eq!(MenuOption::parse(" 4 "), Some(MenuOption::TopMatches));
        assert_eq!(MenuOption::parse("0"), Some(MenuOption::Quit));
        assert_eq!(MenuOption::parse("EXIT"), Some(MenuOption::Quit));
        assert_eq!(MenuOption::parse("9"), None);
        assert_eq!(MenuOption::parse("load"), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("5"), Some(5));
        assert_eq!(parse_count(" -3 "), Some(0));
        assert_eq!(parse_count("ten"), None);
    }

    #[test]
    fn test_quit_and_end_of_input() {
        let session = quiet_session();
        assert!(run(&session, "0\n").ends_with("Goodbye!\n"));
        assert!(run(&session, "").ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_errors_do_not_end_loop() {
        let session = quiet_session();
        let out = run(&session, "7\n3\nking\n1\n/no/such/file.txt\n0\n");

        assert!(out.contains("Invalid option"));
        assert!(out.contains("Embeddings not loaded. Please specify embedding file first."));
        assert!(out.contains("Error loading word embeddings file: cannot open embeddings file"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn test_load_then_query() {
        let file = embeddings_file();
        let session = quiet_session();
        let input = format!("1\n{}\n4\n2\nking\n3\nprince\n0\n", file.path().display());
        let out = run(&session, &input);

        assert!(out.contains("loaded successfully (3 words, 2 dimensions)"));
        assert!(out.contains("Top 2 similar words for: king\nqueen - Cosine Similarity: 0.99"));
        assert!(out.contains("man - Cosine Similarity: 0\n"));
        assert!(out.contains("Word not found in embeddings: prince"));
    }

    #[test]
    fn test_invalid_and_negative_count() {
        let file = embeddings_file();
        let session = quiet_session();
        session.load_embeddings(file.path()).unwrap();

        let out = run(&session, "4\nmany\n4\n-1\nking\n0\n");
        assert!(out.contains("Invalid number: many"));
        assert!(out.contains("Top 0 similar words for: king"));
    }

    #[test]
    fn test_set_output_and_write() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results.txt");
        let file = embeddings_file();
        let session = Session::default();
        session.load_embeddings(file.path()).unwrap();

        let input = format!("2\n{}\n3\nman\n0\n", results.display());
        let out = run(&session, &input);

        assert!(out.contains(&format!("Output file path set to: {}", results.display())));
        let written = std::fs::read_to_string(&results).unwrap();
        assert!(written.contains("Top 2 similar words for: man"));
    }

    #[test]
    fn test_statistics() {
        let session = quiet_session();
        let out = run(&session, "5\n0\n");
        assert!(out.contains("Embeddings: not loaded"));
        assert!(out.contains("Output file: ./out.txt"));
        assert!(out.contains("Queries: 0 (0 failed)"));
    }
}
