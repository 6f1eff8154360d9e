use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

static SUMMARY_RE: OnceLock<Regex> = OnceLock::new();

/// Element counts of a JUnit XML report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunitReport {
    /// `name` attributes of every `testsuite` element, in document order.
    pub testsuites: Vec<String>,
    pub testcases: usize,
    pub failures: usize,
}

impl JunitReport {
    /// Parses a whole document; malformed or truncated XML is an error.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut report = Self::default();
        let mut depth = 0usize;
        let mut saw_root = false;

        loop {
            match reader.read_event().context("invalid XML")? {
                Event::Start(element) => {
                    report.record(&element)?;
                    depth += 1;
                    saw_root = true;
                }
                Event::Empty(element) => {
                    report.record(&element)?;
                    saw_root = true;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            bail!("invalid XML: no root element");
        }
        if depth != 0 {
            bail!("invalid XML: {depth} unclosed element(s)");
        }
        Ok(report)
    }

    pub fn has_testsuite(&self, name: &str) -> bool {
        self.testsuites.iter().any(|suite| suite == name)
    }

    fn record(&mut self, element: &BytesStart<'_>) -> Result<()> {
        match element.local_name().as_ref() {
            b"testsuite" => {
                let name = match element
                    .try_get_attribute("name")
                    .context("invalid testsuite attribute")?
                {
                    Some(attribute) => attribute
                        .unescape_value()
                        .context("invalid testsuite name")?
                        .into_owned(),
                    None => String::new(),
                };
                self.testsuites.push(name);
            }
            b"testcase" => self.testcases += 1,
            b"failure" => self.failures += 1,
            _ => {}
        }
        Ok(())
    }
}

/// The `test cases: T | P passed | F failed` line of Catch2's console
/// reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCaseSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl TestCaseSummary {
    /// First summary line in `stdout`, if any. An all-passing run prints
    /// `All tests passed (...)` instead and yields `None`.
    pub fn find(stdout: &str) -> Option<Self> {
        let re = SUMMARY_RE.get_or_init(|| {
            Regex::new(r"test cases: (\d+) \| (\d+) passed \| (\d+) failed")
                .expect("summary regex is valid")
        });
        let captures = re.captures(stdout)?;
        let number = |index: usize| captures.get(index)?.as_str().parse::<usize>().ok();
        Some(Self {
            total: number(1)?,
            passed: number(2)?,
            failed: number(3)?,
        })
    }
}
