#[cfg(test)]
mod node_id_tests {
    use tpl_shared::NodeIdGen;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let gen = NodeIdGen::new();
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
        assert!(a.as_raw() < b.as_raw());
    }
}
