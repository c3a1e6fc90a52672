pub mod probe;
pub mod resolve;
pub mod result;

pub mod prelude {
    pub use super::probe::probe_target;
    pub use super::resolve::{DnsResolver, HostResolver};
    pub use super::result::ProbeResult;
}

use std::fmt::Write;

/// Render an error with its source chain, `outer: cause: root cause`.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let cause = src.to_string();
        if !s.ends_with(&cause) {
            let _ = write!(s, ": {}", cause);
        }
        err = src;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1
                .as_deref()
                .map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_report_joins_source_chain() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("connection refused", None))),
            ))),
        );
        assert_eq!(
            report(&err),
            "error sending request: client error (Connect): connection refused"
        );
    }

    #[test]
    fn test_report_skips_repeated_cause() {
        let err = Layer(
            "tcp connect error: connection refused",
            Some(Box::new(Layer("connection refused", None))),
        );
        assert_eq!(report(&err), "tcp connect error: connection refused");
    }
}
