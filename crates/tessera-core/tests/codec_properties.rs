//! Property-based tests for the address grammar and permission codecs
//!
//! ## Properties verified
//!
//! - `split(join(ns, id)) == (ns, id)` for all valid pairs
//! - `decode_slug(encode_slug(ns, name)) == (ns, name)`
//! - `decode_key(encode_key(ns, name)) == (ns, name)`
//! - parse/Display round-trip on `Address`

use proptest::prelude::*;
use tessera_core::{
    decode_key, decode_slug, encode_key, encode_slug, join_address, split_address, Address,
    PermissionName,
};

fn arb_namespace() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z0-9_-]{1,8}", 1..=3).prop_map(|segments| segments.join("/"))
}

fn arb_id() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./@-]{1,12}"
}

fn arb_permission_name() -> impl Strategy<Value = PermissionName> {
    "[a-zA-Z0-9]{1,12}".prop_map(|s| PermissionName::new(s).unwrap())
}

proptest! {
    /// Property: address split is the inverse of join
    #[test]
    fn prop_address_split_inverts_join(ns in arb_namespace(), id in arb_id()) {
        let joined = join_address(&ns, &id);
        let (back_ns, back_id) = split_address(&joined).unwrap();
        prop_assert_eq!(back_ns, ns);
        prop_assert_eq!(back_id, id);
    }

    /// Property: Address parse/Display round-trip loses nothing
    #[test]
    fn prop_address_display_inverts_parse(ns in arb_namespace(), id in arb_id()) {
        let addr = Address::new(ns, id).unwrap();
        let reparsed = Address::parse(&addr.to_string()).unwrap();
        prop_assert_eq!(reparsed, addr);
    }

    /// Property: slug codec is invertible over the valid domain
    #[test]
    fn prop_slug_codec_invertible(ns in arb_namespace(), name in arb_permission_name()) {
        let slug = encode_slug(&ns, &name);
        let (back_ns, back_name) = decode_slug(&slug).unwrap();
        prop_assert_eq!(back_ns, ns);
        prop_assert_eq!(back_name, name);
    }

    /// Property: key codec is invertible over the valid domain
    #[test]
    fn prop_key_codec_invertible(ns in arb_namespace(), name in arb_permission_name()) {
        let key = encode_key(&ns, &name);
        let (back_ns, back_name) = decode_key(&key).unwrap();
        prop_assert_eq!(back_ns, ns);
        prop_assert_eq!(back_name, name);
    }

    /// Property: strings with no delimiter never parse
    #[test]
    fn prop_no_delimiter_never_parses(s in "[a-z0-9/_-]{0,20}") {
        prop_assert!(Address::parse(&s).is_err());
    }
}
