// [libs/infra/registrar-client/src/tld.rs]
/// Extrae el TLD (sin el punto) de un nombre de dominio ya normalizado.
pub fn extract_tld(domain: &str) -> Option<&str> {
    domain.rsplit_once('.').map(|(_, tld)| tld)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_tld() {
        assert_eq!(extract_tld("example.com"), Some("com"));
    }

    #[test]
    fn extracts_last_label_for_multi_dot() {
        assert_eq!(extract_tld("foo.bar.co.uk"), Some("uk"));
    }

    #[test]
    fn no_dot_yields_none() {
        assert_eq!(extract_tld("localhost"), None);
    }
}
