#[cfg(test)]
mod message_tests {
    use tpl_runtime::{
        BufferingAppendable, ImmediateValueProvider, MessagePart, MessageRenderer,
        PlaceholderConstraint, RenderResult, Value, ValueProvider, validate_structure,
    };

    fn constraint() -> PlaceholderConstraint {
        PlaceholderConstraint {
            start: "LINK_START".into(),
            end: "LINK_END".into(),
        }
    }

    /// spec.md §8 boundary scenario 4.
    #[test]
    fn end_before_start_is_a_structure_error() {
        let parts = vec![
            MessagePart::Raw("Hello ".into()),
            MessagePart::Placeholder("LINK_END".into()),
            MessagePart::Raw("world.".into()),
            MessagePart::Placeholder("LINK_START".into()),
        ];
        let err = validate_structure(&parts, &[constraint()]).unwrap_err();
        assert_eq!(err.start, "LINK_START");
        assert_eq!(err.end, "LINK_END");
    }

    #[test]
    fn start_then_end_is_valid() {
        let parts = vec![
            MessagePart::Placeholder("LINK_START".into()),
            MessagePart::Raw("click".into()),
            MessagePart::Placeholder("LINK_END".into()),
        ];
        assert!(validate_structure(&parts, &[constraint()]).is_ok());
    }

    #[test]
    fn unmatched_start_is_a_structure_error() {
        let parts = vec![MessagePart::Placeholder("LINK_START".into())];
        assert!(validate_structure(&parts, &[constraint()]).is_err());
    }

    #[test]
    fn renders_raw_and_placeholder_parts_in_order() {
        let parts = vec![
            MessagePart::Raw("Hi ".into()),
            MessagePart::Placeholder("NAME".into()),
            MessagePart::Raw("!".into()),
        ];
        let mut providers: indexmap::IndexMap<String, Box<dyn ValueProvider>> =
            indexmap::IndexMap::new();
        providers.insert(
            "NAME".into(),
            Box::new(ImmediateValueProvider::new(Value::String("Ada".into()))),
        );
        let mut renderer = MessageRenderer::new(&parts, providers);
        let mut out = BufferingAppendable::new();
        let result = renderer.render_and_resolve(&mut out).unwrap();
        assert_eq!(result, RenderResult::Done);
        assert_eq!(out.output(), "Hi Ada!");
    }
}
