#[cfg(test)]
mod value_tests {
    use tpl_core::{ContentKind, Type};
    use tpl_runtime::Value;

    #[test]
    fn ordain_then_get_string_round_trips() {
        let v = Value::ordain_as_safe("<b>x</b>", ContentKind::Html);
        assert_eq!(v.get_string(), Some("<b>x</b>"));
        assert_eq!(v.content_kind(), Some(ContentKind::Html));
    }

    #[test]
    fn assert_type_accepts_matching_primitive() {
        assert!(Value::Int(3).assert_type(&Type::Int).is_ok());
    }

    #[test]
    fn assert_type_rejects_mismatched_primitive() {
        assert!(Value::String("x".into()).assert_type(&Type::Int).is_err());
    }

    #[test]
    fn assert_type_dynamic_accepts_anything() {
        assert!(Value::Bool(true).assert_type(&Type::Dynamic).is_ok());
    }

    #[test]
    fn assert_type_recurses_into_list_elements() {
        let list = Value::List(vec![Value::Int(1), Value::String("x".into())]);
        assert!(list.assert_type(&Type::List(Box::new(Type::Int))).is_err());
    }
}
