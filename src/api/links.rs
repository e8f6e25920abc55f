//! `Link` header construction (spec.md §6 "Link relations"): every
//! response advertises the service description, the catalog namespace,
//! and the provenance-export namespace so a client navigator can discover
//! them without hardcoding paths.

pub const REL_CATALOG: &str = "https://hyprcat.example/rel#catalog";
pub const REL_HAS_PROVENANCE: &str = "https://hyprcat.example/rel#has_provenance";

pub fn standard_link_header(base_url: &str) -> String {
    format!(
        "<{base}/.well-known/hyprcat>; rel=\"service-desc\", \
         <{base}/catalog>; rel=\"{REL_CATALOG}\", \
         <{base}/operations/lrs/export>; rel=\"{REL_HAS_PROVENANCE}\"",
        base = base_url.trim_end_matches('/'),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_all_three_relations() {
        let header = standard_link_header("https://hyprcat.example");
        assert!(header.contains("service-desc"));
        assert!(header.contains(REL_CATALOG));
        assert!(header.contains(REL_HAS_PROVENANCE));
    }
}
