use std::collections::BTreeSet;

use anyhow::Context;
use ct_headers::{HeaderTreeVerifier, Violation};
use tracing::{debug, info};

use crate::{RootArgs, XtaskError, config};

pub(crate) fn run(args: &RootArgs) -> Result<(), XtaskError> {
    let (root, config) = config::load(args)?;
    let verifier = HeaderTreeVerifier::new(&root, &config.headers);
    info!(package_root = %verifier.package_root().display(), "checking convenience headers");
    let violations = verifier
        .verify()
        .with_context(|| format!("verify convenience headers under {}", root.display()))?;
    report(&violations)
}

fn report(violations: &[Violation]) -> Result<(), XtaskError> {
    if violations.is_empty() {
        println!("Everything ok");
        return Ok(());
    }
    for violation in violations {
        debug!(header = violation.header(), include = ?violation.include(), "violation");
        println!("{violation}");
    }
    let headers: BTreeSet<&str> = violations.iter().map(Violation::header).collect();
    Err(XtaskError::new(format!(
        "found {} convenience header problem(s) in {} header(s)",
        violations.len(),
        headers.len()
    )))
}

#[cfg(test)]
mod tests {
    use ct_headers::Violation;

    use super::report;

    #[test]
    fn summary_counts_problems_and_headers() {
        assert!(report(&[]).is_ok());

        let violations = vec![
            Violation::UnsortedIncludes {
                header: "catch_all.hpp".to_string(),
            },
            Violation::MissingInclude {
                header: "catch_all.hpp".to_string(),
                include: "catch2/catch_session.hpp".to_string(),
            },
            Violation::SuperfluousInclude {
                header: "catch_matchers_all.hpp".to_string(),
                include: "catch2/catch_matchers_all.hpp".to_string(),
            },
        ];
        let err = report(&violations).expect_err("violations");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "found 3 convenience header problem(s) in 2 header(s)"
        );
    }
}
