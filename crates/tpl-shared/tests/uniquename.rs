#[cfg(test)]
mod uniquename_tests {
    use tpl_shared::{ClaimError, UniqueNameGenerator};

    fn gen() -> UniqueNameGenerator {
        UniqueNameGenerator::new(vec!['.', '/'], "_")
    }

    #[test]
    fn claim_rejects_duplicates() {
        let mut g = gen();
        g.claim("x").unwrap();
        assert_eq!(g.claim("x"), Err(ClaimError::AlreadyClaimed("x".into())));
    }

    #[test]
    fn claim_rejects_disallowed_chars() {
        let mut g = gen();
        assert_eq!(
            g.claim("a.b"),
            Err(ClaimError::DisallowedCharacter("a.b".into()))
        );
    }

    #[test]
    fn claim_lenient_is_noop_on_duplicate() {
        let mut g = gen();
        g.claim_lenient("x").unwrap();
        g.claim_lenient("x").unwrap();
    }

    #[test]
    fn generate_returns_base_when_unclaimed() {
        let mut g = gen();
        assert_eq!(g.generate("tmp"), "tmp");
    }

    #[test]
    fn generate_disambiguates_with_smallest_suffix() {
        let mut g = gen();
        g.claim("tmp").unwrap();
        g.claim("tmp_1").unwrap();
        assert_eq!(g.generate("tmp"), "tmp_2");
    }

    #[test]
    fn branch_numbers_independently_of_parent_and_siblings() {
        let mut parent = gen();
        parent.claim("tmp").unwrap();

        let mut branch_a = parent.branch();
        let mut branch_b = parent.branch();

        assert_eq!(branch_a.generate("tmp"), "tmp_1");
        // branch_b forked before branch_a claimed tmp_1, so it starts fresh
        // from the parent's state, not branch_a's.
        assert_eq!(branch_b.generate("tmp"), "tmp_1");
    }
}
