#[cfg(test)]
mod provider_tests {
    use tpl_runtime::{DependencyTokenGen, DeferredValueProvider, ImmediateValueProvider, ProviderState, Value, ValueProvider};

    #[test]
    fn immediate_provider_is_always_ready() {
        let p = ImmediateValueProvider::new(Value::Int(3));
        assert!(matches!(p.state(), ProviderState::Ready(Value::Int(3))));
    }

    #[test]
    fn deferred_provider_starts_pending_then_ready() {
        let gen = DependencyTokenGen::new();
        let p = DeferredValueProvider::new(gen.next());
        assert!(matches!(p.state(), ProviderState::Pending(_)));
        p.resolve_with(Value::String("hello".into()));
        assert!(matches!(p.state(), ProviderState::Ready(_)));
    }

    #[test]
    #[should_panic(expected = "resolved more than once")]
    fn deferred_provider_rejects_double_resolution() {
        let gen = DependencyTokenGen::new();
        let p = DeferredValueProvider::new(gen.next());
        p.resolve_with(Value::Bool(true));
        p.resolve_with(Value::Bool(false));
    }
}
