#[cfg(test)]
mod appendable_tests {
    use tpl_runtime::{Appendable, BufferingAppendable, LogEvent, WriteOutcome};

    /// spec.md §8 boundary scenario 6.
    #[test]
    fn log_only_block_suppresses_its_text_and_nested_regular_text() {
        let mut out = BufferingAppendable::new();
        out.write("a");
        out.enter_block(true);
        out.write("b");
        out.enter_block(false);
        out.write("c");
        out.exit_block();
        out.write("d");
        out.exit_block();
        out.write("e");

        assert_eq!(out.output(), "ae");
        assert_eq!(
            out.events(),
            &[
                LogEvent::Enter { log_only: true },
                LogEvent::Enter { log_only: false },
                LogEvent::Exit,
                LogEvent::Exit,
            ]
        );
    }

    #[test]
    fn regular_block_inside_log_only_does_not_unsuppress() {
        let mut out = BufferingAppendable::new();
        out.enter_block(true);
        out.enter_block(false);
        out.write("x");
        out.exit_block();
        out.exit_block();
        assert_eq!(out.output(), "");
    }

    #[test]
    fn log_only_inside_regular_suppresses_only_its_own_text() {
        let mut out = BufferingAppendable::new();
        out.enter_block(false);
        out.write("x");
        out.enter_block(true);
        out.write("y");
        out.exit_block();
        out.write("z");
        out.exit_block();
        assert_eq!(out.output(), "xz");
    }

    #[test]
    fn soft_limit_reports_back_pressure() {
        let mut out = BufferingAppendable::with_soft_limit(4);
        assert_eq!(out.write("ab"), WriteOutcome::Ok);
        assert_eq!(out.write("cd"), WriteOutcome::SoftLimitReached);
    }
}
