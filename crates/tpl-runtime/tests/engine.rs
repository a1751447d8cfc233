#[cfg(test)]
mod engine_tests {
    use tpl_runtime::{
        BufferingAppendable, CancelToken, ContentProvider, DependencyTokenGen, DeferredValueProvider,
        LimitReason, ProviderState, RenderResult, ScriptedContentProvider, Value, ValueProvider,
    };

    /// spec.md §8 boundary scenario 5: resolving P1 then P2 between
    /// resumptions yields the deterministic final buffered output.
    #[test]
    fn resolve_deferred_and_rerender_reaches_done_with_expected_output() {
        let _ = env_logger::try_init();
        let tokens = DependencyTokenGen::new();
        let p1 = std::rc::Rc::new(DeferredValueProvider::new(tokens.next()));
        let p2 = std::rc::Rc::new(DeferredValueProvider::new(tokens.next()));

        struct RcProvider(std::rc::Rc<DeferredValueProvider>);
        impl ValueProvider for RcProvider {
            fn state(&self) -> ProviderState {
                self.0.state()
            }
        }

        let mut provider = ScriptedContentProvider::new()
            .write("start\n")
            .await_value(RcProvider(p1.clone()), |v| {
                format!("future1: {}\n", v.get_string().unwrap())
            })
            .await_value(RcProvider(p2.clone()), |v| {
                format!("future2: {}\nend\n", v.get_string().unwrap())
            });

        let mut out = BufferingAppendable::new();
        let result = provider.render_and_resolve(&mut out).unwrap();
        assert!(matches!(result, RenderResult::ContinueAfter(_)));
        assert_eq!(out.output(), "start\n");

        p1.resolve_with(Value::String("hello".into()));
        let result = provider.render_and_resolve(&mut out).unwrap();
        assert!(matches!(result, RenderResult::ContinueAfter(_)));
        assert_eq!(out.output(), "start\nfuture1: hello\n");

        p2.resolve_with(Value::String("goodbye".into()));
        let result = provider.render_and_resolve(&mut out).unwrap();
        assert_eq!(result, RenderResult::Done);
        assert_eq!(
            out.output(),
            "start\nfuture1: hello\nfuture2: goodbye\nend\n"
        );
        assert_eq!(provider.buffered_so_far(), out.output());
    }

    #[test]
    fn cancellation_is_observed_at_the_next_suspension_point() {
        let cancel = CancelToken::new();
        let mut provider = ScriptedContentProvider::new()
            .with_cancel(cancel.clone())
            .write("a")
            .write("b");
        cancel.cancel();
        let mut out = BufferingAppendable::new();
        let result = provider.render_and_resolve(&mut out).unwrap();
        assert_eq!(result, RenderResult::Limited(LimitReason::Cancelled));
        assert_eq!(out.output(), "");
    }
}
